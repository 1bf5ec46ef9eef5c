use tracing::{debug, info};

use crate::kernel::severity::SeverityChannel;
use crate::host::RuntimeError;
use crate::record::TelemetryRecord;

/// Turns uncaught script errors into `error` beacons, independent of the
/// page-view lifecycle.
#[derive(Debug, Default)]
pub struct ErrorMonitor {
    subscribed: bool,
    reported: u64,
}

impl ErrorMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if already subscribed.
    pub fn subscribe(&mut self) -> bool {
        if self.subscribed {
            return false;
        }
        self.subscribed = true;
        info!("error monitor subscribed");
        true
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn reported(&self) -> u64 {
        self.reported
    }

    pub fn normalize(error: &RuntimeError) -> TelemetryRecord {
        let (msg, line, col) = match error {
            RuntimeError::Event { message, lineno, colno } => (Some(message.clone()), *lineno, *colno),
            RuntimeError::GlobalState {
                error_message,
                error_line,
                error_character,
            } => (error_message.clone(), *error_line, *error_character),
        };

        TelemetryRecord::new()
            .with("from", "js")
            .with_opt("msg", msg)
            .with_opt("line", line)
            .with_opt("col", col)
    }

    pub fn observe(&mut self, error: &RuntimeError, channel: &SeverityChannel) {
        if !self.subscribed {
            debug!("runtime error seen before subscription, ignored");
            return;
        }
        self.reported += 1;
        channel.error(Self::normalize(error));
    }
}
