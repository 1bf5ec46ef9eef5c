//! Host-boundary collaborators.
//!
//! The core never reaches into an ambient page environment. Everything it
//! reads comes through [`Host`], and every notification it reacts to arrives
//! as a [`HostEvent`] on a channel owned by the embedder.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Raw navigation-timing fields keyed by their host names, in epoch
/// milliseconds. Vendor extras such as `msFirstPaint` live alongside the
/// standard points.
pub type RawTiming = BTreeMap<String, u64>;

/// Names under which hosts have exposed the performance object, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformanceVendor {
    Standard,
    Ms,
    Webkit,
    Moz,
}

impl PerformanceVendor {
    pub const PROBE_ORDER: [PerformanceVendor; 4] = [
        PerformanceVendor::Standard,
        PerformanceVendor::Ms,
        PerformanceVendor::Webkit,
        PerformanceVendor::Moz,
    ];

    pub fn global_name(&self) -> &'static str {
        match self {
            PerformanceVendor::Standard => "performance",
            PerformanceVendor::Ms => "msPerformance",
            PerformanceVendor::Webkit => "webkitPerformance",
            PerformanceVendor::Moz => "mozPerformance",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawNavigation {
    pub kind: Option<u32>,
    pub redirect_count: Option<u32>,
}

/// What one vendor's performance object exposes. Either half may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPerformance {
    pub timing: Option<RawTiming>,
    pub navigation: Option<RawNavigation>,
}

fn system_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Accessors the core consumes from its embedding environment.
///
/// Only the page accessors are mandatory. Every vendor probe defaults to
/// "not present", which the timing normalizer treats as a missing capability.
pub trait Host: Send + Sync {
    fn page_url(&self) -> String;

    fn referrer(&self) -> String;

    /// Wall clock in epoch milliseconds.
    fn now_millis(&self) -> u64 {
        system_millis()
    }

    fn user_agent(&self) -> Option<String> {
        None
    }

    fn performance(&self, _vendor: PerformanceVendor) -> Option<RawPerformance> {
        None
    }

    /// Vendor first-paint API (`chrome.loadTimes().firstPaintTime`), in seconds.
    fn first_paint_seconds(&self) -> Option<f64> {
        None
    }

    /// Client-side clock-skew probe (`chrome.csi().startE`).
    fn clock_skew_start(&self) -> Option<u64> {
        None
    }

    /// Toolbar start probe (`gtbExternal.startE()`).
    fn toolbar_start(&self) -> Option<u64> {
        None
    }
}

/// A fixed, data-driven host. Used by the demo binary and by embedders
/// that snapshot their environment up front.
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    pub page_url: String,
    pub referrer: String,
    pub clock_millis: Option<u64>,
    pub user_agent: Option<String>,
    pub performance: BTreeMap<&'static str, RawPerformance>,
    pub first_paint_seconds: Option<f64>,
    pub clock_skew_start: Option<u64>,
    pub toolbar_start: Option<u64>,
}

impl StaticHost {
    pub fn new(page_url: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            referrer: referrer.into(),
            ..Self::default()
        }
    }

    pub fn with_performance(mut self, vendor: PerformanceVendor, perf: RawPerformance) -> Self {
        self.performance.insert(vendor.global_name(), perf);
        self
    }

    pub fn with_clock(mut self, millis: u64) -> Self {
        self.clock_millis = Some(millis);
        self
    }
}

impl Host for StaticHost {
    fn page_url(&self) -> String {
        self.page_url.clone()
    }

    fn referrer(&self) -> String {
        self.referrer.clone()
    }

    fn now_millis(&self) -> u64 {
        self.clock_millis.unwrap_or_else(system_millis)
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    fn performance(&self, vendor: PerformanceVendor) -> Option<RawPerformance> {
        self.performance.get(vendor.global_name()).cloned()
    }

    fn first_paint_seconds(&self) -> Option<f64> {
        self.first_paint_seconds
    }

    fn clock_skew_start(&self) -> Option<u64> {
        self.clock_skew_start
    }

    fn toolbar_start(&self) -> Option<u64> {
        self.toolbar_start
    }
}

/// Notifications pushed by the embedding environment.
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// The page finished loading.
    Load,
    /// An uncaught script error surfaced.
    Error(RuntimeError),
}

/// Runtime error as delivered by the host. Hosts disagree on the shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Rich error event (`message`, `lineno`, `colno`).
    Event {
        message: String,
        lineno: Option<u32>,
        colno: Option<u32>,
    },
    /// Legacy global error state (`errorMessage`, `errorLine`, `errorCharacter`).
    GlobalState {
        error_message: Option<String>,
        error_line: Option<u32>,
        error_character: Option<u32>,
    },
}
