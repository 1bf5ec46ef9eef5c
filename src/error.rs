use thiserror::Error;

/// Failures inside the telemetry core.
///
/// None of these ever reach the embedder: every public entry point logs and
/// swallows them so the host page keeps running untouched.
#[derive(Debug, Error)]
pub enum WatError {
    #[error("option `{name}` expects {expected}")]
    InvalidOption { name: String, expected: &'static str },

    #[error("invalid configuration json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("beacon endpoint `{0}` is not an absolute url")]
    InvalidEndpoint(String),

    #[error("beacon fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no async runtime available to dispatch beacons")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, WatError>;
