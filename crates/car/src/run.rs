// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Car process orchestration: create the shared record, start the
//! workers, link up with the controller if it is reachable, and tear
//! the record down on SIGINT.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use lift_shm::SharedCar;

use crate::buttons::ButtonWorker;
use crate::config::CarConfig;
use crate::link;
use crate::motion::MotionWorker;

/// Run the car until SIGINT.
pub async fn run(config: CarConfig) -> anyhow::Result<()> {
    let lowest = config.lowest()?;
    let highest = config.highest()?;

    let shared = Arc::new(SharedCar::create(&config.name, lowest)?);
    info!(
        car = %config.name,
        object = %lift_shm::object_name(&config.name),
        range = %format!("{lowest}..{highest}"),
        "shared record created"
    );

    let shutdown = CancellationToken::new();

    // A worker only returns when the record's mutex is broken, which is
    // unrecoverable for the whole process.
    {
        let worker = MotionWorker::new(shared.clone(), lowest, highest, config.delay());
        std::thread::spawn(move || {
            if let Err(e) = worker.run() {
                error!(err = %e, "motion worker stopped");
                std::process::exit(1);
            }
        });
    }
    {
        let worker = ButtonWorker::new(shared.clone());
        std::thread::spawn(move || {
            if let Err(e) = worker.run() {
                error!(err = %e, "button worker stopped");
                std::process::exit(1);
            }
        });
    }

    let controller = format!("{}:{}", config.controller_host, config.controller_port);
    match link::connect_and_register(
        &config.controller_host,
        config.controller_port,
        &config.name,
        lowest,
        highest,
    )
    .await
    {
        Ok(stream) => {
            info!(%controller, "registered with controller");
            link::spawn(shared.clone(), stream, shutdown.child_token());
        }
        // Non-fatal: the safety monitor and internal tool still work.
        Err(e) => warn!(%controller, err = %e, "controller unreachable; running locally"),
    }

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    shutdown.cancel();
    if let Err(e) = shared.unlink() {
        warn!(err = %e, "failed to unlink shared record");
    }
    Ok(())
}
