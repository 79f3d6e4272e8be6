use anyhow::Result;
use incident_timeline::api::{AppState, RestApi};
use incident_timeline::config;
use incident_timeline::messaging::{EventBus, EventMessage, EventType};
use incident_timeline::store::IncidentStore;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

async fn run_app() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = config::load_config(config_path.as_deref())?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.api.log_level))
        .init();
    info!("Starting incident timeline server");
    info!("Configuration loaded");

    // Every bus event is mirrored to the log
    let event_bus = EventBus::new();
    event_bus.subscribe_all(Arc::new(|event: EventMessage| -> Result<()> {
        info!("Event {}: {}", event.routing_key(), event.payload);
        Ok(())
    }));

    let store = IncidentStore::initialize(&config.store).await?;

    if let Err(e) = event_bus.publish(
        EventType::SystemStartup,
        None,
        serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }),
    ) {
        warn!("Failed to publish system startup event: {}", e);
    }

    let state = AppState::new(store, event_bus.clone(), config.timeline.clone());
    let http_server = RestApi::new(&config.api, state)?;

    tokio::select! {
        result = http_server.run() => {
            if let Err(e) = result {
                error!("API server stopped: {}", e);
                return Err(e);
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutting down...");
        }
    }

    if let Err(e) = event_bus.publish(
        EventType::SystemShutdown,
        None,
        serde_json::json!({"reason": "Normal shutdown"}),
    ) {
        error!("Failed to publish shutdown event: {}", e);
    }

    Ok(())
}

fn main() {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_app()) {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}
