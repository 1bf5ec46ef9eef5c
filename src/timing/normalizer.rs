use std::sync::{Arc, OnceLock};
use tracing::debug;

use super::browser::BrowserInfo;
use crate::host::{Host, PerformanceVendor, RawPerformance, RawTiming};
use crate::record::TelemetryRecord;

/// Navigation-timing points in the order the browser records them.
pub const TIMING_POINTS: [&str; 20] = [
    "navigationStart",
    "unloadEventStart",
    "unloadEventEnd",
    "redirectStart",
    "redirectEnd",
    "fetchStart",
    "domainLookupStart",
    "domainLookupEnd",
    "connectStart",
    "connectEnd",
    "requestStart",
    "responseStart",
    "responseEnd",
    "domLoading",
    "domInteractive",
    "domContentLoadedEventStart",
    "domContentLoadedEventEnd",
    "domComplete",
    "loadEventStart",
    "loadEventEnd",
];

const NAVIGATION_START: &str = "navigationStart";
const MS_FIRST_PAINT: &str = "msFirstPaint";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationInfo {
    pub kind: Option<u32>,
    pub redirect_count: Option<u32>,
}

/// Canonical timing for the current page view.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingSnapshot {
    /// Canonical points in [`TIMING_POINTS`] order. `navigationStart` is
    /// absent when no source could supply it.
    points: Vec<(&'static str, u64)>,
    first_paint: Option<u64>,
    navigation: NavigationInfo,
}

impl TimingSnapshot {
    pub fn get(&self, name: &str) -> Option<u64> {
        self.points.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    pub fn points(&self) -> &[(&'static str, u64)] {
        &self.points
    }

    pub fn navigation_start(&self) -> Option<u64> {
        self.get(NAVIGATION_START)
    }

    pub fn first_paint(&self) -> Option<u64> {
        self.first_paint
    }

    pub fn navigation(&self) -> NavigationInfo {
        self.navigation
    }

    pub fn to_record(&self) -> TelemetryRecord {
        let mut record: TelemetryRecord = self.points.iter().map(|(n, v)| (*n, *v)).collect();
        record.insert_opt("firstPaint", self.first_paint);
        record.insert_opt("navigationType", self.navigation.kind);
        record.insert_opt("redirectCount", self.navigation.redirect_count);
        record
    }
}

/// Reconciles whatever timing the host exposes into one [`TimingSnapshot`].
///
/// The snapshot is computed on first access and then frozen.
pub struct TimingNormalizer {
    host: Arc<dyn Host>,
    snapshot: OnceLock<TimingSnapshot>,
}

impl TimingNormalizer {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host,
            snapshot: OnceLock::new(),
        }
    }

    pub fn snapshot(&self) -> &TimingSnapshot {
        self.snapshot.get_or_init(|| self.compute())
    }

    fn probe(&self) -> RawPerformance {
        for vendor in PerformanceVendor::PROBE_ORDER {
            if let Some(perf) = self.host.performance(vendor) {
                debug!("timing provider found on `{}`", vendor.global_name());
                return perf;
            }
        }
        debug!("no timing provider on host");
        RawPerformance::default()
    }

    fn compute(&self) -> TimingSnapshot {
        let perf = self.probe();
        let mut raw: RawTiming = perf.timing.unwrap_or_default();
        let field = |raw: &RawTiming, name: &str| raw.get(name).copied().unwrap_or(0);

        let mut points: Vec<(&'static str, u64)> = TIMING_POINTS
            .iter()
            .map(|name| (*name, field(&raw, *name)))
            .collect();

        // firstPaint: vendor API first, then the timing field it replaces.
        let first_paint = match self.host.first_paint_seconds() {
            Some(secs) if secs.is_finite() && secs >= 0.0 => Some((secs * 1000.0).round() as u64),
            _ => match raw.remove(MS_FIRST_PAINT) {
                Some(ms) if ms > 0 => Some(ms),
                _ => None,
            },
        };

        // navigationStart
        let browser = self
            .host
            .user_agent()
            .map(|ua| BrowserInfo::from_user_agent(&ua))
            .unwrap_or_default();
        let reported = field(&raw, NAVIGATION_START);
        let navigation_start = if reported > 0 && !browser.has_unreliable_navigation_start() {
            Some(reported)
        } else {
            [
                Some(field(&raw, "unloadEventStart")),
                Some(field(&raw, "fetchStart")),
                self.host.clock_skew_start(),
                self.host.toolbar_start(),
            ]
            .into_iter()
            .flatten()
            .find(|v| *v > 0)
        };

        match navigation_start {
            Some(v) => points[0].1 = v,
            None => {
                points.remove(0);
            }
        }

        let navigation = perf
            .navigation
            .map(|n| NavigationInfo {
                kind: n.kind,
                redirect_count: n.redirect_count,
            })
            .unwrap_or_default();

        TimingSnapshot {
            points,
            first_paint,
            navigation,
        }
    }
}
