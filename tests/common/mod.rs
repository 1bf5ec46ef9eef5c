#![allow(dead_code)]

use percent_encoding::percent_decode_str;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use wat::host::{PerformanceVendor, RawNavigation, RawPerformance, RawTiming, StaticHost};
use wat::transport::{Dispatch, DispatchFuture};

pub const NOW_MILLIS: u64 = 1_700_000_000_000;

/// Captures beacon URLs. A held dispatcher parks every fetch until released.
pub struct RecordingDispatcher {
    urls: Mutex<Vec<String>>,
    gate: Arc<Semaphore>,
}

impl RecordingDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            urls: Mutex::new(Vec::new()),
            gate: Arc::new(Semaphore::new(Semaphore::MAX_PERMITS)),
        })
    }

    pub fn held() -> Arc<Self> {
        Arc::new(Self {
            urls: Mutex::new(Vec::new()),
            gate: Arc::new(Semaphore::new(0)),
        })
    }

    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<BTreeMap<String, String>> {
        self.urls().iter().map(|u| query(u)).collect()
    }
}

impl Dispatch for RecordingDispatcher {
    fn fetch(&self, url: String) -> DispatchFuture {
        self.urls.lock().unwrap().push(url);
        let gate = self.gate.clone();
        Box::pin(async move {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
            Ok::<(), wat::WatError>(())
        })
    }
}

/// `key=value` pairs of a beacon URL, still encoded, in wire order.
pub fn raw_pairs(url: &str) -> Vec<(String, String)> {
    let (_, q) = url.split_once('?').expect("beacon url has a query");
    q.split('&')
        .map(|pair| {
            let (k, v) = pair.split_once('=').expect("pair has `=`");
            (k.to_string(), v.to_string())
        })
        .collect()
}

/// Decoded query of a beacon URL.
pub fn query(url: &str) -> BTreeMap<String, String> {
    raw_pairs(url)
        .into_iter()
        .map(|(k, v)| (k, percent_decode_str(&v).decode_utf8_lossy().into_owned()))
        .collect()
}

pub fn page_host() -> StaticHost {
    StaticHost::new("http://shop.test/cart", "http://search.test/?q=cart").with_clock(NOW_MILLIS)
}

pub fn timing(pairs: &[(&str, u64)]) -> RawTiming {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub fn with_timing(host: StaticHost, pairs: &[(&str, u64)]) -> StaticHost {
    host.with_performance(
        PerformanceVendor::Standard,
        RawPerformance {
            timing: Some(timing(pairs)),
            navigation: Some(RawNavigation {
                kind: Some(0),
                redirect_count: Some(0),
            }),
        },
    )
}
