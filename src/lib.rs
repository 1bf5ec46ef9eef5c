pub mod config;
pub mod error;
pub mod host;
pub mod kernel;
pub mod monitor;
pub mod record;
pub mod timing;
pub mod transport;

pub use error::WatError;
pub use host::{Host, HostEvent, RuntimeError, StaticHost};
pub use kernel::{LifecyclePhase, Plugin, Severity, Wat};
pub use record::{FieldValue, TelemetryRecord};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
