// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The message grammar spoken between cars, the controller, and call
//! clients. Payloads are single-line ASCII, space-separated, carried
//! inside the length-framed transport of [`crate::frame`].

use std::fmt;

use crate::floor::Floor;
use crate::status::DoorStatus;

/// A parsed wire message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// `CAR <name> <lowest> <highest>` — a car registering with the
    /// controller on a fresh connection.
    Register { name: String, lowest: Floor, highest: Floor },
    /// `STATUS <status> <current> <destination>` — a car reporting state.
    Status { status: DoorStatus, current: Floor, destination: Floor },
    /// `FLOOR <floor>` — the controller assigning a destination.
    Floor(Floor),
    /// `CALL <source> <destination>` — a hall call from a call pad.
    Call { source: Floor, destination: Floor },
    /// `CAR <name>` — the controller's reply to a serviceable call.
    Dispatched { name: String },
    /// `UNAVAILABLE` — the controller's reply when no car qualifies.
    Unavailable,
}

/// Error produced when a payload does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMessageError(String);

impl fmt::Display for ParseMessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid message {:?}", self.0)
    }
}

impl std::error::Error for ParseMessageError {}

impl Message {
    /// Parse a frame payload.
    ///
    /// `CAR` is the one overloaded verb: three arguments register a car,
    /// one argument is a dispatch reply.
    pub fn parse(payload: &str) -> Result<Self, ParseMessageError> {
        let err = || ParseMessageError(payload.to_owned());
        let tokens: Vec<&str> = payload.split(' ').collect();

        let message = match tokens.as_slice() {
            ["CAR", name, lowest, highest] => Message::Register {
                name: (*name).to_owned(),
                lowest: lowest.parse().map_err(|_| err())?,
                highest: highest.parse().map_err(|_| err())?,
            },
            ["CAR", name] if !name.is_empty() => {
                Message::Dispatched { name: (*name).to_owned() }
            }
            ["STATUS", status, current, destination] => Message::Status {
                status: DoorStatus::parse(status).ok_or_else(err)?,
                current: current.parse().map_err(|_| err())?,
                destination: destination.parse().map_err(|_| err())?,
            },
            ["FLOOR", floor] => Message::Floor(floor.parse().map_err(|_| err())?),
            ["CALL", source, destination] => Message::Call {
                source: source.parse().map_err(|_| err())?,
                destination: destination.parse().map_err(|_| err())?,
            },
            ["UNAVAILABLE"] => Message::Unavailable,
            _ => return Err(err()),
        };
        Ok(message)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Register { name, lowest, highest } => {
                write!(f, "CAR {name} {lowest} {highest}")
            }
            Message::Status { status, current, destination } => {
                write!(f, "STATUS {status} {current} {destination}")
            }
            Message::Floor(floor) => write!(f, "FLOOR {floor}"),
            Message::Call { source, destination } => write!(f, "CALL {source} {destination}"),
            Message::Dispatched { name } => write!(f, "CAR {name}"),
            Message::Unavailable => f.write_str("UNAVAILABLE"),
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
