use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use super::registry::PluginRegistry;
use super::severity::SeverityChannel;
use crate::config::Settings;
use crate::record::{FieldValue, TelemetryRecord};
use crate::timing::TimingNormalizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Loading,
    Ready,
    Sent,
}

/// Drives the page view from load to the single page-view beacon.
///
/// `Loading -> Ready -> Sent`, each transition at most once.
#[derive(Debug)]
pub struct LifecycleController {
    phase: LifecyclePhase,
    load_subscribed: bool,
    settle_deadline: Option<Instant>,
    /// Ad-hoc fields added before ready.
    pending: TelemetryRecord,
}

impl LifecycleController {
    pub fn new() -> Self {
        Self {
            phase: LifecyclePhase::Loading,
            load_subscribed: true,
            settle_deadline: None,
            pending: TelemetryRecord::new(),
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn settle_deadline(&self) -> Option<Instant> {
        self.settle_deadline
    }

    /// Handles a load notification. The first one unsubscribes and arms the
    /// settle timer; any later one is ignored.
    pub fn observe_load(&mut self, settle_delay: Duration) -> bool {
        if !self.load_subscribed {
            debug!("repeated load notification ignored");
            return false;
        }
        self.load_subscribed = false;
        self.settle_deadline = Some(Instant::now() + settle_delay);
        info!("page loaded, settling for {:?}", settle_delay);
        true
    }

    pub fn add_data(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        if self.phase != LifecyclePhase::Loading {
            debug!("page-view record already sent, field dropped");
            return;
        }
        self.pending.insert(name, value);
    }

    pub fn add_record(&mut self, record: TelemetryRecord) {
        if self.phase != LifecyclePhase::Loading {
            debug!("page-view record already sent, {} fields dropped", record.len());
            return;
        }
        self.pending.merge(record);
    }

    /// Assembles the page-view record and emits it at `info`.
    ///
    /// Returns `false` without side effects once the record has been sent.
    pub fn ready(
        &mut self,
        settings: &Settings,
        timing: &TimingNormalizer,
        registry: &mut PluginRegistry,
        channel: &SeverityChannel,
    ) -> bool {
        if self.phase != LifecyclePhase::Loading {
            debug!("ready ignored in phase {:?}", self.phase);
            return false;
        }
        self.phase = LifecyclePhase::Ready;
        self.load_subscribed = false;
        self.settle_deadline = None;

        let mut record = TelemetryRecord::new()
            .with("pageUrl", settings.page_url.as_str())
            .with("referrer", settings.referrer.as_str());
        record.merge(timing.snapshot().to_record());
        record.merge(settings.data.clone());
        record.merge(std::mem::take(&mut self.pending));
        registry.contribute_into(&mut record);

        info!("page ready, sending {} fields", record.len());
        channel.info(record);
        self.phase = LifecyclePhase::Sent;
        true
    }
}

impl Default for LifecycleController {
    fn default() -> Self {
        Self::new()
    }
}
