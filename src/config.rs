use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, WatError};
use crate::host::Host;
use crate::record::TelemetryRecord;

/// Pause between the load notification and assembling the page-view record.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Top-level configuration of the core.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Beacon endpoint. Empty until configured.
    pub url: String,
    pub page_url: String,
    pub referrer: String,
    /// Merged into the page-view record.
    pub data: TelemetryRecord,
    pub settle_delay: Duration,
    /// Keys nothing recognized. Kept, never validated.
    pub extras: Map<String, Value>,
}

impl Settings {
    /// Defaults with page fields detected from the host.
    pub fn detect(host: &dyn Host) -> Self {
        Self {
            url: String::new(),
            page_url: host.page_url(),
            referrer: host.referrer(),
            data: TelemetryRecord::new(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            extras: Map::new(),
        }
    }

    /// Applies one top-level option. A value of the wrong shape is rejected and
    /// leaves the previous setting in place.
    pub fn apply(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "url" => self.url = expect_string(name, value)?,
            "pageUrl" => self.page_url = expect_string(name, value)?,
            "referrer" => self.referrer = expect_string(name, value)?,
            "data" => match value {
                Value::Object(map) => self.data.merge(TelemetryRecord::from_json_map(&map)),
                _ => {
                    return Err(WatError::InvalidOption {
                        name: name.to_string(),
                        expected: "an object",
                    })
                }
            },
            "settleDelay" => match value.as_u64() {
                Some(ms) => self.settle_delay = Duration::from_millis(ms),
                None => {
                    return Err(WatError::InvalidOption {
                        name: name.to_string(),
                        expected: "a non-negative number of milliseconds",
                    })
                }
            },
            _ => {
                debug!("unrecognized option `{}` stored as-is", name);
                self.extras.insert(name.to_string(), value);
            }
        }
        Ok(())
    }
}

fn expect_string(name: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(WatError::InvalidOption {
            name: name.to_string(),
            expected: "a string",
        }),
    }
}
