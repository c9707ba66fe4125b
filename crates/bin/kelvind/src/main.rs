//! # kelvind — kelvin daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize `tracing` from the configured filter
//! - Construct the virtual bulbs and the fixed sun times (adapters)
//! - Construct one `LightService` per light and the `Dispatcher`, injecting
//!   adapters via port traits
//! - Spawn the dispatcher loop and the event logger
//! - Build the axum router and serve it
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use kelvin_adapter_http_axum::state::AppState;
use kelvin_adapter_virtual::FixedSunTimes;
use kelvin_app::event_bus::InProcessEventBus;
use kelvin_app::event_logger;
use kelvin_app::services::{Dispatcher, LightService};
use kelvin_app::status_board::StatusBoard;
use kelvin_domain::light::Light;
use kelvin_domain::time;

use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(256));
    tokio::spawn(event_logger::run(event_bus.subscribe()));

    // Lights
    let lights = config
        .lights
        .iter()
        .map(|light| {
            LightService::new(
                Light::new(light.id, light.name.clone()),
                Arc::new(light.bulb()),
                Arc::clone(&event_bus),
            )
        })
        .collect();

    // Dispatcher
    let board = StatusBoard::new();
    let sun_times = FixedSunTimes::new(config.sun.sun_times()?);
    let mut dispatcher =
        Dispatcher::new(lights, config.schedules.clone(), sun_times, board.clone());
    dispatcher.start(time::now()).await?;

    let (stop_tx, mut stop_rx) = watch::channel(());
    let period = config.poll_interval();
    let dispatcher_task = tokio::spawn(async move {
        dispatcher
            .run(period, async move {
                let _ = stop_rx.changed().await;
            })
            .await;
    });

    // HTTP
    let app = kelvin_adapter_http_axum::router::build(AppState::new(board, event_bus));
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "kelvind listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drop(stop_tx);
    dispatcher_task.await?;
    tracing::info!("kelvind shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received shutdown signal"),
        Err(err) => tracing::error!(error = %err, "failed to listen for shutdown signal"),
    }
}
