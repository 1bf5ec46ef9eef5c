use serde::{Deserialize, Serialize};

use crate::record::TelemetryRecord;
use crate::transport::BeaconTransport;

/// Field every emitted record is tagged with.
pub const LOG_TYPE_FIELD: &str = "logType";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::Debug, Severity::Info, Severity::Warn, Severity::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

/// Tags records with their level and hands each one to the transport.
/// One call, one beacon.
#[derive(Clone)]
pub struct SeverityChannel {
    transport: BeaconTransport,
    endpoint: String,
}

impl SeverityChannel {
    pub fn new(transport: BeaconTransport, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn transport(&self) -> &BeaconTransport {
        &self.transport
    }

    pub fn emit(&self, severity: Severity, mut record: TelemetryRecord) {
        record.insert(LOG_TYPE_FIELD, severity.as_str());
        self.transport.send(&self.endpoint, record);
    }

    pub fn debug(&self, record: TelemetryRecord) {
        self.emit(Severity::Debug, record)
    }

    pub fn info(&self, record: TelemetryRecord) {
        self.emit(Severity::Info, record)
    }

    pub fn warn(&self, record: TelemetryRecord) {
        self.emit(Severity::Warn, record)
    }

    pub fn error(&self, record: TelemetryRecord) {
        self.emit(Severity::Error, record)
    }
}
