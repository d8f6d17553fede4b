// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The central dispatcher.
//!
//! Accepts TCP connections and tells car sessions (long-lived, opened
//! with `CAR name lowest highest`) apart from call sessions (one-shot,
//! opened with `CALL src dst`) by their first frame. Car sessions feed
//! the registry; call sessions select the nearest idle car, reply to
//! the caller, and relay the pickup floor to the car.

pub mod call;
pub mod config;
pub mod registry;
pub mod session;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ControllerConfig;
use crate::registry::Registry;

/// Run the controller until SIGINT.
pub async fn run(config: ControllerConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    let registry = Arc::new(Registry::new());
    let shutdown = CancellationToken::new();

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    info!("controller listening on {addr}");
    serve(listener, registry, shutdown).await
}

/// Accept connections until `shutdown` fires, one task per connection.
pub async fn serve(
    listener: TcpListener,
    registry: Arc<Registry>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                debug!(%peer, "connection accepted");
                tokio::spawn(session::handle_connection(
                    registry.clone(),
                    stream,
                    shutdown.child_token(),
                ));
            }
        }
    }
    info!("controller shutting down");
    Ok(())
}
