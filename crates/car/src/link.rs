// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The car's controller link.
//!
//! Three workers share one registered TCP connection: a reader applying
//! `FLOOR` assignments to the record, a publisher thread that waits on
//! the record's condvar and snapshots `STATUS` under the lock, and a
//! socket writer draining the publisher's channel. Snapshots cross a
//! channel so no worker ever holds the record lock across a TCP send.
//! Any link failure is logged and the car keeps running locally.

use std::io;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lift_proto::{frame, Floor, Message};
use lift_shm::SharedCar;

/// Connect to the controller and send this car's registration.
pub async fn connect_and_register(
    host: &str,
    port: u16,
    name: &str,
    lowest: Floor,
    highest: Floor,
) -> io::Result<TcpStream> {
    let mut stream = TcpStream::connect((host, port)).await?;
    let register = Message::Register { name: name.to_owned(), lowest, highest };
    frame::write_frame(&mut stream, &register.to_string()).await?;
    Ok(stream)
}

/// Spawn the link workers for a registered connection.
pub fn spawn(shared: Arc<SharedCar>, stream: TcpStream, shutdown: CancellationToken) {
    let (mut reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    {
        let shared = shared.clone();
        std::thread::spawn(move || publish_status(&shared, &tx));
    }

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    message = rx.recv() => match message {
                        Some(message) => {
                            if let Err(e) = frame::write_frame(&mut writer, &message.to_string()).await {
                                warn!(err = %e, "status send failed; running locally");
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        });
    }

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = frame::read_frame(&mut reader) => match received {
                    Ok(Some(payload)) => apply_command(&shared, &payload).await,
                    Ok(None) => {
                        info!("controller closed the connection; running locally");
                        break;
                    }
                    Err(e) => {
                        warn!(err = %e, "controller read failed; running locally");
                        break;
                    }
                },
            }
        }
    });
}

/// Handle one framed payload from the controller.
async fn apply_command(shared: &Arc<SharedCar>, payload: &str) {
    match Message::parse(payload) {
        Ok(Message::Floor(floor)) => {
            debug!(%floor, "destination assigned");
            let shared = shared.clone();
            let applied = tokio::task::spawn_blocking(move || -> io::Result<()> {
                let mut guard = shared.lock()?;
                guard.set_destination_floor(floor);
                guard.notify_all();
                Ok(())
            })
            .await;
            match applied {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(err = %e, "record update failed"),
                Err(e) => warn!(err = %e, "record update task failed"),
            }
        }
        Ok(other) => warn!(message = %other, "unexpected controller message"),
        Err(e) => warn!(err = %e, "unparseable controller message"),
    }
}

/// Publish a `STATUS` snapshot on every record wake-up.
///
/// Deliberately unfiltered: the controller consumes repeated snapshots
/// as arrival echoes when it drains a car's pending stops.
fn publish_status(shared: &SharedCar, tx: &mpsc::UnboundedSender<Message>) {
    loop {
        let snapshot = {
            let mut guard = match shared.lock() {
                Ok(guard) => guard,
                Err(_) => return,
            };
            if guard.wait().is_err() {
                return;
            }
            match (guard.status(), guard.current_floor(), guard.destination_floor()) {
                (Some(status), Some(current), Some(destination)) => {
                    Some(Message::Status { status, current, destination })
                }
                // Corrupt record: nothing to report; the safety monitor
                // owns this case.
                _ => None,
            }
        };
        if let Some(message) = snapshot {
            if tx.send(message).is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
