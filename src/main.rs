// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

mod api;
mod config;
mod error;
mod models;
mod state;
mod storage;

use std::{env, net::SocketAddr};

use tracing_subscriber::EnvFilter;

use api::router;
use config::{DATA_DIR_ENV, DEFAULT_LOG_FILTER, HOST_ENV, LOG_FORMAT_ENV, PORT_ENV};
use state::AppState;
use storage::{paths::DATA_ROOT, RelayStorage, StoragePaths};

#[tokio::main]
async fn main() {
    init_tracing();

    // Initialize relay storage (panics if the data root is unusable -
    // the service cannot run without it)
    let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DATA_ROOT.to_string());
    let mut relay = RelayStorage::new(StoragePaths::new(&data_dir));
    relay
        .initialize()
        .expect("Failed to initialize relay storage");

    let state = AppState::new(relay);
    let app = router(state);

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!(%addr, data_dir, "Relay server listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if env::var(LOG_FORMAT_ENV).as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
