use reqwest::{Client, Url};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, WatError};

pub type DispatchFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// Performs the out-of-band fetch for one beacon URL.
///
/// The transport treats `Ok` and `Err` the same way; the result only feeds
/// debug logging.
pub trait Dispatch: Send + Sync + 'static {
    fn fetch(&self, url: String) -> DispatchFuture;
}

/// GET over HTTP. The response body is never read.
#[derive(Clone)]
pub struct HttpDispatcher {
    client: Client,
    base: Option<Url>,
}

impl HttpDispatcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base: None,
        }
    }

    /// Bounds each fetch. Without this a stalled request stays in flight
    /// until the connection gives up.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        self
    }

    /// Resolves relative endpoints (`/beacon`) against `base`, the way a page
    /// resolves them against its own URL.
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = Url::parse(base).ok();
        self
    }

    fn resolve(&self, url: &str) -> Result<Url> {
        match Url::parse(url) {
            Ok(u) => Ok(u),
            Err(_) => self
                .base
                .as_ref()
                .and_then(|b| b.join(url).ok())
                .ok_or_else(|| WatError::InvalidEndpoint(url.to_string())),
        }
    }
}

impl Default for HttpDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatch for HttpDispatcher {
    fn fetch(&self, url: String) -> DispatchFuture {
        let client = self.client.clone();
        let resolved = self.resolve(&url);
        Box::pin(async move {
            let target = resolved?;
            let resp = client.get(target).send().await?;
            debug!("beacon answered {}", resp.status());
            Ok::<(), WatError>(())
        })
    }
}
