use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use wat::host::{HostEvent, RuntimeError, StaticHost};
use wat::{Plugin, TelemetryRecord, Wat};

/// Console harness: each stdin line is a host notification. `load` fires the
/// page load, anything else is reported as a runtime error. EOF ends the page.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("wat {} starting", wat::VERSION);

    // 2. Host + context
    let page_url = std::env::var("WAT_PAGE_URL").unwrap_or_else(|_| "http://localhost/".to_string());
    let referrer = std::env::var("WAT_REFERRER").unwrap_or_default();
    let mut host = StaticHost::new(page_url, referrer);
    host.user_agent = std::env::var("WAT_USER_AGENT").ok();

    let mut wat = Wat::with_http(Arc::new(host));
    wat.register(
        "env",
        Plugin::new().with_contribute(|| {
            Ok(TelemetryRecord::new().with_opt("lang", std::env::var("LANG").ok()))
        }),
    );

    if let Ok(config) = std::env::var("WAT_CONFIG") {
        wat.init_json(&config);
    }
    if let Ok(endpoint) = std::env::var("WAT_ENDPOINT") {
        wat.init(serde_json::json!({ "url": endpoint }));
    }

    // 3. Console -> host events
    let (tx, rx) = mpsc::channel(100);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let event = match line.trim() {
                "" => continue,
                "load" => HostEvent::Load,
                msg => HostEvent::Error(RuntimeError::Event {
                    message: msg.to_string(),
                    lineno: None,
                    colno: None,
                }),
            };
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    // 4. Drive the page, then wait for outstanding beacons
    wat.run(rx).await;
    if tokio::time::timeout(Duration::from_secs(5), wat.transport().flush()).await.is_err() {
        tracing::warn!("{} beacons still in flight", wat.transport().in_flight());
    }
    tracing::info!("page closed");

    Ok(())
}
