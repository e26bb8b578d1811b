//! Scout-Oxide snapshot entry point
//!
//! Small CLI exercising the whole stack end to end: probe the remote
//! endpoint, create or attach to a session, take one refreshed inspection
//! snapshot, print the merged result as JSON, and tear down what we created.
//!
//! Environment variables:
//! - `SCOUT_HOST` / `SCOUT_PORT` / `SCOUT_PATH` / `SCOUT_SCHEME`: remote endpoint
//! - `SCOUT_SESSION_ID`: attach to a running session instead of creating one
//! - `SCOUT_CAPS`: JSON capability payload for session creation
//! - `SCOUT_APP_MODE`: `native` (default) or `hybrid`
//! - `RUST_LOG`: log filtering

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use scout_oxide::inspector::{AppMode, RunRequest};
use scout_oxide::session::{attach_to_session, start_session};
use scout_oxide::transport::{ConnectOptions, HttpTransport, Transport};
use scout_oxide::{Config, Inspector};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing - respect RUST_LOG environment variable
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    info!("Scout-Oxide v{}", scout_oxide::VERSION);

    // Load configuration, optionally from a TOML file given as first arg
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)?,
        None => Config::from_env()?,
    };
    info!(
        "Remote endpoint: {}://{}:{}{}",
        config.scheme, config.host, config.port, config.path
    );

    let options = ConnectOptions::from_config(&config);

    // Probe the endpoint before touching sessions
    let probe = HttpTransport::new(options.clone())?;
    probe
        .status()
        .await
        .context("remote endpoint did not answer the status probe")?;
    info!("Endpoint is up");

    // Attach when a session id is configured, create otherwise
    let attach_id = config.attach_session_id.clone();
    let created = attach_id.is_none();
    let session = match attach_id {
        Some(id) => attach_to_session(options, &id).await?,
        None => {
            let caps: serde_json::Value = match std::env::var("SCOUT_CAPS") {
                Ok(raw) => serde_json::from_str(&raw).context("SCOUT_CAPS is not valid JSON")?,
                Err(_) => serde_json::json!({ "platformName": "Android" }),
            };
            start_session(options, caps).await?
        }
    };
    info!("Session {} ready", session.id());

    let app_mode = match std::env::var("SCOUT_APP_MODE").as_deref() {
        Ok("hybrid") => AppMode::Hybrid,
        _ => AppMode::Native,
    };

    let inspector = Inspector::new(Arc::clone(&session))
        .with_settle_delay(Duration::from_millis(config.settle_delay_ms));

    // One refresh-only run: no method, no search, full snapshot
    let request = RunRequest {
        app_mode,
        ..RunRequest::default()
    };
    let result = inspector.run(request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    // Tear down only what we created; attached sessions keep running
    if created {
        let teardown = inspector.run(RunRequest::method("deleteSession")).await;
        if let Err(err) = teardown {
            warn!("Teardown failed: {}", err);
        } else {
            info!("Session deleted");
        }
    }

    Ok(())
}
