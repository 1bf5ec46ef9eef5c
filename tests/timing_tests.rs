mod common;

use common::{page_host, timing, with_timing};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wat::host::{Host, PerformanceVendor, RawNavigation, RawPerformance, StaticHost};
use wat::timing::{BrowserInfo, BrowserKind, TimingNormalizer, TIMING_POINTS};

fn normalizer(host: StaticHost) -> TimingNormalizer {
    TimingNormalizer::new(Arc::new(host))
}

#[test]
fn test_missing_provider_yields_zeros_without_first_paint() {
    let n = normalizer(page_host());
    let snap = n.snapshot();

    assert_eq!(snap.navigation_start(), None);
    assert_eq!(snap.first_paint(), None);
    assert_eq!(snap.points().len(), TIMING_POINTS.len() - 1);
    assert!(snap.points().iter().all(|(_, v)| *v == 0));

    let record = snap.to_record();
    assert!(!record.contains("firstPaint"));
    assert!(!record.contains("navigationStart"));
    assert!(!record.contains("navigationType"));
    assert_eq!(record.get("loadEventEnd").and_then(|v| v.as_i64()), Some(0));
}

#[test]
fn test_points_copied_in_order_with_zero_for_absent() {
    let host = with_timing(
        page_host(),
        &[("navigationStart", 1000), ("fetchStart", 1005), ("loadEventEnd", 1900)],
    );
    let n = normalizer(host);
    let snap = n.snapshot();

    let names: Vec<&str> = snap.points().iter().map(|(name, _)| *name).collect();
    assert_eq!(names, TIMING_POINTS.to_vec());
    assert_eq!(snap.get("navigationStart"), Some(1000));
    assert_eq!(snap.get("fetchStart"), Some(1005));
    assert_eq!(snap.get("domComplete"), Some(0));
    assert_eq!(snap.get("loadEventEnd"), Some(1900));

    let record = snap.to_record();
    assert_eq!(record.get("navigationType").and_then(|v| v.as_i64()), Some(0));
    assert_eq!(record.get("redirectCount").and_then(|v| v.as_i64()), Some(0));
}

#[test]
fn test_vendor_probe_uses_first_present() {
    let perf = |start| RawPerformance {
        timing: Some(timing(&[("navigationStart", start)])),
        navigation: Some(RawNavigation {
            kind: Some(1),
            redirect_count: Some(2),
        }),
    };

    let only_webkit = page_host().with_performance(PerformanceVendor::Webkit, perf(30));
    assert_eq!(normalizer(only_webkit).snapshot().navigation_start(), Some(30));

    let ms_and_moz = page_host()
        .with_performance(PerformanceVendor::Moz, perf(40))
        .with_performance(PerformanceVendor::Ms, perf(20));
    let n = normalizer(ms_and_moz);
    assert_eq!(n.snapshot().navigation_start(), Some(20));
    assert_eq!(n.snapshot().navigation().redirect_count, Some(2));
}

#[test]
fn test_first_paint_prefers_vendor_api() {
    let mut host = with_timing(page_host(), &[("navigationStart", 1000), ("msFirstPaint", 1300)]);
    host.first_paint_seconds = Some(1.25);
    assert_eq!(normalizer(host).snapshot().first_paint(), Some(1250));
}

#[test]
fn test_first_paint_falls_back_to_timing_field() {
    let host = with_timing(page_host(), &[("navigationStart", 1000), ("msFirstPaint", 1300)]);
    let n = normalizer(host);
    let record = n.snapshot().to_record();

    assert_eq!(n.snapshot().first_paint(), Some(1300));
    assert_eq!(record.get("firstPaint").and_then(|v| v.as_i64()), Some(1300));
    assert!(!record.contains("msFirstPaint"));
}

#[test]
fn test_navigation_start_fallback_chain() {
    let unload = with_timing(page_host(), &[("unloadEventStart", 990), ("fetchStart", 995)]);
    assert_eq!(normalizer(unload).snapshot().navigation_start(), Some(990));

    let fetch = with_timing(page_host(), &[("fetchStart", 995)]);
    assert_eq!(normalizer(fetch).snapshot().navigation_start(), Some(995));

    let mut csi = page_host();
    csi.clock_skew_start = Some(980);
    csi.toolbar_start = Some(970);
    assert_eq!(normalizer(csi).snapshot().navigation_start(), Some(980));

    let mut toolbar = page_host();
    toolbar.toolbar_start = Some(970);
    assert_eq!(normalizer(toolbar).snapshot().navigation_start(), Some(970));
}

#[test]
fn test_unreliable_navigation_start_is_replaced() {
    let pairs = [("navigationStart", 5), ("unloadEventStart", 0), ("fetchStart", 1005)];

    let mut firefox8 = with_timing(page_host(), &pairs);
    firefox8.user_agent = Some("Mozilla/5.0 (Windows NT 6.1; rv:8.0) Gecko/20100101 Firefox/8.0".into());
    assert_eq!(normalizer(firefox8).snapshot().navigation_start(), Some(1005));

    let mut firefox9 = with_timing(page_host(), &pairs);
    firefox9.user_agent = Some("Mozilla/5.0 (Windows NT 6.1; rv:9.0) Gecko/20100101 Firefox/9.0".into());
    assert_eq!(normalizer(firefox9).snapshot().navigation_start(), Some(5));
}

struct CountingHost {
    probes: AtomicUsize,
}

impl Host for CountingHost {
    fn page_url(&self) -> String {
        "http://count.test/".into()
    }

    fn referrer(&self) -> String {
        String::new()
    }

    fn performance(&self, _vendor: PerformanceVendor) -> Option<RawPerformance> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Some(RawPerformance {
            timing: Some(timing(&[("navigationStart", 7)])),
            navigation: None,
        })
    }
}

#[test]
fn test_snapshot_computed_once() {
    let host = Arc::new(CountingHost {
        probes: AtomicUsize::new(0),
    });
    let n = TimingNormalizer::new(host.clone());
    assert_eq!(host.probes.load(Ordering::SeqCst), 0, "lazy until first access");

    let first = n.snapshot().clone();
    let second = n.snapshot().clone();
    assert_eq!(first, second);
    assert_eq!(host.probes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_browser_detection() {
    let ff = BrowserInfo::from_user_agent("Mozilla/5.0 (X11; Linux x86_64; rv:7.0.1) Gecko/20100101 Firefox/7.0.1");
    assert_eq!(ff.kind, BrowserKind::Firefox);
    assert_eq!(ff.version, Some(7));
    assert!(ff.has_unreliable_navigation_start());

    let chrome = BrowserInfo::from_user_agent(
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    );
    assert_eq!(chrome.kind, BrowserKind::Chrome);
    assert_eq!(chrome.version, Some(120));

    let opera = BrowserInfo::from_user_agent(
        "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 OPR/106.0.0.0",
    );
    assert_eq!(opera.kind, BrowserKind::Opera);

    let ie9 = BrowserInfo::from_user_agent("Mozilla/5.0 (compatible; MSIE 9.0; Windows NT 6.1; Trident/5.0)");
    assert_eq!((ie9.kind, ie9.version), (BrowserKind::Ie, Some(9)));

    let ie11 = BrowserInfo::from_user_agent("Mozilla/5.0 (Windows NT 6.3; Trident/7.0; rv:11.0) like Gecko");
    assert_eq!((ie11.kind, ie11.version), (BrowserKind::Ie, Some(11)));

    let safari = BrowserInfo::from_user_agent(
        "Mozilla/5.0 (Macintosh) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    );
    assert_eq!((safari.kind, safari.version), (BrowserKind::Safari, Some(17)));

    assert_eq!(BrowserInfo::from_user_agent("curl/8.0").kind, BrowserKind::Unknown);
}
