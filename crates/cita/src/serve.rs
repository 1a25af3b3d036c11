// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cita serve` command implementation.
//!
//! Opens SQLite storage, builds the scheduling service and the route table,
//! and serves HTTP until SIGINT/SIGTERM. Storage is checkpointed on the way
//! out.

use std::sync::Arc;

use tracing::{info, warn};

use cita_config::CitaConfig;
use cita_core::{CitaError, StorageAdapter};
use cita_gateway::{GatewayState, HealthState, build_router, start_server};
use cita_scheduling::SchedulingService;
use cita_storage::SqliteStorage;

use crate::shutdown;

/// Runs the `cita serve` command.
pub async fn run_serve(config: CitaConfig) -> Result<(), CitaError> {
    init_tracing(&config.server.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %config.storage.database_path,
        "starting cita serve"
    );

    let storage = Arc::new(SqliteStorage::open(config.storage.clone()).await?);
    let scheduling = Arc::new(SchedulingService::from_config(
        storage.clone(),
        &config.scheduling,
    ));

    let state = GatewayState {
        scheduling,
        options: storage.clone(),
        health: HealthState {
            start_time: std::time::Instant::now(),
            storage: storage.clone(),
        },
    };
    let router = build_router(state, config.server.cors_permissive);

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&config.server, router, cancel).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage checkpoint on shutdown failed");
    }
    info!("cita serve shutdown complete");
    served
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `cita*` crates log at `log_level` and
/// everything else at `warn`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "cita={log_level},cita_core={log_level},cita_storage={log_level},\
             cita_scheduling={log_level},cita_gateway={log_level},\
             tower_http={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
