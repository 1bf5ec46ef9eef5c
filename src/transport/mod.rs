//! Fire-and-forget beacon delivery.
//!
//! `send` never blocks and never fails from the caller's point of view. Each
//! dispatched beacon parks a handle in the retention slab; the spawned fetch
//! clears it on completion, whatever the outcome.

pub mod beacon;
pub mod dispatch;
pub mod retention;

pub use beacon::{encode_component, to_base36, BeaconRequest, FRESHNESS_PARAM};
pub use dispatch::{Dispatch, DispatchFuture, HttpDispatcher};
pub use retention::{HandleKey, InFlightHandle, RetentionSet};

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::error::WatError;
use crate::host::Host;
use crate::record::TelemetryRecord;

#[derive(Clone)]
pub struct BeaconTransport {
    dispatcher: Arc<dyn Dispatch>,
    host: Arc<dyn Host>,
    retained: Arc<Mutex<RetentionSet>>,
    idle: Arc<Notify>,
}

impl BeaconTransport {
    pub fn new(dispatcher: Arc<dyn Dispatch>, host: Arc<dyn Host>) -> Self {
        Self {
            dispatcher,
            host,
            retained: Arc::new(Mutex::new(RetentionSet::new())),
            idle: Arc::new(Notify::new()),
        }
    }

    /// Serializes `record` and dispatches it in the background.
    pub fn send(&self, endpoint: &str, record: TelemetryRecord) {
        let request = BeaconRequest::new(endpoint, &record, self.host.now_millis());

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(h) => h,
            Err(_) => {
                warn!("beacon dropped: {}", WatError::NoRuntime);
                return;
            }
        };

        let url = request.url();
        let key = self.lock().insert(InFlightHandle {
            request,
            dispatched_at: Instant::now(),
        });
        debug!("beacon {} dispatched: {}", key.index(), url);

        let fetch = self.dispatcher.fetch(url);
        let retained = self.retained.clone();
        let idle = self.idle.clone();

        runtime.spawn(async move {
            if let Err(e) = fetch.await {
                debug!("beacon {} completed with error: {}", key.index(), e);
            }
            let remaining = {
                let mut set = retained.lock().unwrap_or_else(|e| e.into_inner());
                set.release(key);
                set.len()
            };
            if remaining == 0 {
                idle.notify_waiters();
            }
        });
    }

    /// Number of beacons dispatched but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    /// Waits until every dispatched beacon has completed.
    pub async fn flush(&self) {
        loop {
            let notified = self.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, RetentionSet> {
        self.retained.lock().unwrap_or_else(|e| e.into_inner())
    }
}
