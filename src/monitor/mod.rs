pub mod errors;

pub use errors::ErrorMonitor;
