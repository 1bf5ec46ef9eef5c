//! The telemetry context.
//!
//! One [`Wat`] per page view, built at start-up and driven by the host's
//! notifications. It owns the configuration, the plugin registry, the
//! lifecycle controller and the severity channel; nothing is looked up
//! globally.

pub mod lifecycle;
pub mod registry;
pub mod severity;

pub use lifecycle::{LifecycleController, LifecyclePhase};
pub use registry::{ContributeFn, InitFn, Plugin, PluginRegistry};
pub use severity::{Severity, SeverityChannel, LOG_TYPE_FIELD};

use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::warn;

use crate::config::Settings;
use crate::error::WatError;
use crate::host::{Host, HostEvent};
use crate::monitor::ErrorMonitor;
use crate::record::{FieldValue, TelemetryRecord};
use crate::timing::TimingNormalizer;
use crate::transport::{BeaconTransport, Dispatch, HttpDispatcher};

pub struct Wat {
    settings: Settings,
    registry: PluginRegistry,
    lifecycle: LifecycleController,
    timing: TimingNormalizer,
    channel: SeverityChannel,
    monitor: ErrorMonitor,
}

impl Wat {
    pub fn new(host: Arc<dyn Host>, dispatcher: Arc<dyn Dispatch>) -> Self {
        let settings = Settings::detect(host.as_ref());
        let transport = BeaconTransport::new(dispatcher, host.clone());
        let mut monitor = ErrorMonitor::new();
        monitor.subscribe();

        Self {
            channel: SeverityChannel::new(transport, settings.url.clone()),
            timing: TimingNormalizer::new(host),
            registry: PluginRegistry::new(),
            lifecycle: LifecycleController::new(),
            monitor,
            settings,
        }
    }

    /// Delivers over HTTP, resolving relative endpoints against the page URL.
    pub fn with_http(host: Arc<dyn Host>) -> Self {
        let dispatcher = HttpDispatcher::new().with_base(&host.page_url());
        Self::new(host, Arc::new(dispatcher))
    }

    /// Applies a configuration object. Keys naming a plugin with an
    /// initializer go to that plugin; everything else configures the core.
    pub fn init(&mut self, options: Value) {
        let options: Map<String, Value> = match options {
            Value::Object(map) => map,
            other => {
                warn!("init expects an object, got {}", other);
                return;
            }
        };

        for (name, value) in self.registry.dispatch_init(options) {
            if let Err(e) = self.settings.apply(&name, value) {
                warn!("option ignored: {}", e);
            }
        }
        self.channel.set_endpoint(self.settings.url.clone());
    }

    pub fn init_json(&mut self, json: &str) {
        match serde_json::from_str::<Value>(json).map_err(WatError::from) {
            Ok(options) => self.init(options),
            Err(e) => warn!("{}", e),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, plugin: Plugin) {
        self.registry.register(name, plugin);
    }

    /// Adds one field to the page-view record.
    pub fn add_data(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.lifecycle.add_data(name, value);
    }

    /// Adds every non-null entry of `map` to the page-view record.
    pub fn add_data_map(&mut self, map: &Map<String, Value>) {
        self.lifecycle.add_record(TelemetryRecord::from_json_map(map));
    }

    pub fn add_record(&mut self, record: TelemetryRecord) {
        self.lifecycle.add_record(record);
    }

    pub fn emit(&self, severity: Severity, record: TelemetryRecord) {
        self.channel.emit(severity, record);
    }

    pub fn debug(&self, record: TelemetryRecord) {
        self.channel.debug(record);
    }

    pub fn info(&self, record: TelemetryRecord) {
        self.channel.info(record);
    }

    pub fn warn(&self, record: TelemetryRecord) {
        self.channel.warn(record);
    }

    pub fn error(&self, record: TelemetryRecord) {
        self.channel.error(record);
    }

    /// Assembles and sends the page-view record. Only the first call does anything.
    pub fn ready(&mut self) -> bool {
        self.lifecycle.ready(
            &self.settings,
            &self.timing,
            &mut self.registry,
            &self.channel,
        )
    }

    pub fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Load => {
                self.lifecycle.observe_load(self.settings.settle_delay);
            }
            HostEvent::Error(error) => self.monitor.observe(&error, &self.channel),
        }
    }

    /// Consumes host notifications until the sender side closes.
    ///
    /// A settle delay still pending at that point is waited out so the
    /// page-view record is not lost.
    pub async fn run(&mut self, mut events: mpsc::Receiver<HostEvent>) {
        loop {
            let deadline = self.lifecycle.settle_deadline();
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.ready();
                }
            }
        }

        if let Some(deadline) = self.lifecycle.settle_deadline() {
            sleep_until(deadline).await;
            self.ready();
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.lifecycle.phase()
    }

    pub fn timing(&self) -> &TimingNormalizer {
        &self.timing
    }

    pub fn monitor(&self) -> &ErrorMonitor {
        &self.monitor
    }

    pub fn transport(&self) -> &BeaconTransport {
        self.channel.transport()
    }
}
