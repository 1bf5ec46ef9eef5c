/// Browser family as far as timing quirks are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserKind {
    Firefox,
    Chrome,
    Ie,
    Opera,
    Safari,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrowserInfo {
    pub kind: BrowserKind,
    /// Major version, when the user agent carries one.
    pub version: Option<u32>,
}

impl BrowserInfo {
    /// Best-effort user-agent sniffing. Order matters: Chrome and Opera both
    /// claim Safari, and Opera also claims Chrome.
    pub fn from_user_agent(ua: &str) -> Self {
        let probes: [(&str, BrowserKind); 6] = [
            ("Firefox/", BrowserKind::Firefox),
            ("OPR/", BrowserKind::Opera),
            ("Opera/", BrowserKind::Opera),
            ("Chrome/", BrowserKind::Chrome),
            ("MSIE ", BrowserKind::Ie),
            ("Version/", BrowserKind::Safari),
        ];

        for (marker, kind) in probes {
            if let Some(version) = version_after(ua, marker) {
                if kind == BrowserKind::Safari && !ua.contains("Safari/") {
                    continue;
                }
                return Self { kind, version: Some(version) };
            }
        }

        // IE 11 dropped the MSIE token.
        if ua.contains("Trident/") {
            return Self {
                kind: BrowserKind::Ie,
                version: version_after(ua, "rv:"),
            };
        }

        Self::default()
    }

    /// Firefox 7 and 8 shipped a broken `navigationStart`.
    pub fn has_unreliable_navigation_start(&self) -> bool {
        self.kind == BrowserKind::Firefox && matches!(self.version, Some(7) | Some(8))
    }
}

fn version_after(ua: &str, marker: &str) -> Option<u32> {
    let start = ua.find(marker)? + marker.len();
    let digits: String = ua[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
