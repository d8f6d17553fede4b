// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-connection session handling.
//!
//! The first frame on a connection discriminates it: `CAR …` starts a
//! long-lived car session, `CALL …` a one-shot call session, anything
//! else is dropped. Parse errors inside an established car session are
//! logged and the session continues; outbound frames to a car go
//! through its entry's channel so no lock is held across a send.

use std::sync::Arc;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lift_proto::{frame, DoorStatus, Floor, Message};

use crate::registry::{CarEntry, Registry};

/// Serve one accepted connection to completion.
pub async fn handle_connection(
    registry: Arc<Registry>,
    stream: TcpStream,
    shutdown: CancellationToken,
) {
    let (mut reader, writer) = stream.into_split();

    let first = match frame::read_frame(&mut reader).await {
        Ok(Some(payload)) => payload,
        Ok(None) => return,
        Err(e) => {
            debug!(err = %e, "dropping connection before first frame");
            return;
        }
    };

    match Message::parse(&first) {
        Ok(Message::Register { name, lowest, highest }) => {
            car_session(registry, reader, writer, name, lowest, highest, shutdown).await;
        }
        Ok(Message::Call { source, destination }) => {
            call_session(&registry, writer, source, destination).await;
        }
        Ok(other) => warn!(message = %other, "unexpected opening frame; dropping connection"),
        Err(e) => warn!(err = %e, "unparseable opening frame; dropping connection"),
    }
}

/// Long-lived session with one car: register it, relay queued `FLOOR`
/// assignments out, and fold incoming `STATUS` reports into the
/// registry. The entry is removed when the connection ends.
async fn car_session(
    registry: Arc<Registry>,
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
    name: String,
    lowest: Floor,
    highest: Floor,
    shutdown: CancellationToken,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let entry = CarEntry::new(name, lowest, highest, tx);
    registry.insert(entry.clone());
    info!(car = %entry.name, range = %format!("{lowest}..{highest}"), "car registered");

    let writer_task = tokio::spawn({
        let name = entry.name.clone();
        async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = frame::write_frame(&mut writer, &message.to_string()).await {
                    debug!(car = %name, err = %e, "car write failed");
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = frame::read_frame(&mut reader) => match received {
                Ok(Some(payload)) => handle_report(&entry, &payload),
                Ok(None) => break,
                Err(e) => {
                    warn!(car = %entry.name, err = %e, "car read failed");
                    break;
                }
            },
        }
    }

    registry.remove_entry(&entry);
    writer_task.abort();
    info!(car = %entry.name, "car disconnected");
}

/// Fold one frame from a car into its registry entry.
fn handle_report(entry: &CarEntry, payload: &str) {
    match Message::parse(payload) {
        Ok(Message::Status { status, current, destination }) => {
            let mut state = entry.state.lock();
            state.status = status;
            state.current = current;
            state.destination = destination;
            // A car parked at its destination takes the next queued stop.
            if status == DoorStatus::Closed && current == destination {
                if let Some(next) = state.pending.pop_front() {
                    state.destination = next;
                    let _ = entry.outbound.send(Message::Floor(next));
                }
            }
        }
        Ok(other) => warn!(car = %entry.name, message = %other, "unexpected car message"),
        Err(e) => warn!(car = %entry.name, err = %e, "unparseable car message"),
    }
}

/// One-shot call session: select a car, answer the caller, and queue
/// the trip. The car is sent the pickup floor now; the drop-off floor
/// waits in the pending queue until the car reports arrival.
async fn call_session(
    registry: &Registry,
    mut writer: OwnedWriteHalf,
    source: Floor,
    destination: Floor,
) {
    if source == destination {
        let _ = frame::write_frame(&mut writer, &Message::Unavailable.to_string()).await;
        return;
    }

    match registry.select(source, destination) {
        Some(entry) => {
            let reply = Message::Dispatched { name: entry.name.clone() };
            if frame::write_frame(&mut writer, &reply.to_string()).await.is_err() {
                // Caller gone before the verdict; leave the car alone.
                return;
            }
            {
                let mut state = entry.state.lock();
                state.destination = source;
                state.pending.push_back(destination);
            }
            let _ = entry.outbound.send(Message::Floor(source));
            info!(car = %entry.name, %source, %destination, "call dispatched");
        }
        None => {
            info!(%source, %destination, "no car available");
            let _ = frame::write_frame(&mut writer, &Message::Unavailable.to_string()).await;
        }
    }
}
