// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot service operations against a car's shared record.
//!
//! Every operation is a single mutation applied under the record lock
//! followed by a condvar broadcast. `up`/`down` are guarded: they only
//! take effect in individual service mode with the car stationary and
//! the doors closed.

use std::fmt;

use lift_proto::DoorStatus;
use lift_shm::{RecordGuard, SharedCar};

/// A service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Open,
    Close,
    Stop,
    ServiceOn,
    ServiceOff,
    Up,
    Down,
    Block,
    Clear,
}

impl Op {
    pub fn parse(name: &str) -> Option<Op> {
        match name {
            "open" => Some(Op::Open),
            "close" => Some(Op::Close),
            "stop" => Some(Op::Stop),
            "service_on" => Some(Op::ServiceOn),
            "service_off" => Some(Op::ServiceOff),
            "up" => Some(Op::Up),
            "down" => Some(Op::Down),
            "block" => Some(Op::Block),
            "clear" => Some(Op::Clear),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Open => "open",
            Op::Close => "close",
            Op::Stop => "stop",
            Op::ServiceOn => "service_on",
            Op::ServiceOff => "service_off",
            Op::Up => "up",
            Op::Down => "down",
            Op::Block => "block",
            Op::Clear => "clear",
        }
    }
}

/// Why a guarded operation was refused. The record is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotServiceMode(Op),
    Moving(Op),
    DoorsOpen(Op),
    OutOfRange,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotServiceMode(op) => {
                write!(f, "Operation \"{}\" only allowed in service mode.", op.as_str())
            }
            Rejection::Moving(op) => {
                write!(f, "Operation \"{}\" not allowed while elevator is moving.", op.as_str())
            }
            Rejection::DoorsOpen(op) => {
                write!(f, "Operation \"{}\" not allowed while doors are open.", op.as_str())
            }
            Rejection::OutOfRange => f.write_str("Floor value out of range"),
        }
    }
}

/// Apply one operation to a locked record. On `Err` nothing was written.
pub fn apply(guard: &mut RecordGuard<'_>, op: Op) -> Result<(), Rejection> {
    match op {
        Op::Open => guard.set_open_button(1),
        Op::Close => guard.set_close_button(1),
        Op::Stop => guard.set_emergency_stop(1),
        Op::ServiceOn => {
            // Doubles as the external emergency reset.
            guard.set_individual_service_mode(1);
            guard.set_emergency_mode(0);
        }
        Op::ServiceOff => guard.set_individual_service_mode(0),
        Op::Block => guard.set_door_obstruction(1),
        Op::Clear => guard.set_door_obstruction(0),
        Op::Up | Op::Down => {
            if guard.individual_service_mode() != 1 {
                return Err(Rejection::NotServiceMode(op));
            }
            match guard.status() {
                Some(DoorStatus::Between) => return Err(Rejection::Moving(op)),
                Some(DoorStatus::Closed) => {}
                _ => return Err(Rejection::DoorsOpen(op)),
            }
            let current = guard.current_floor().ok_or(Rejection::OutOfRange)?;
            let next = match op {
                Op::Up => current.up(),
                _ => current.down(),
            };
            match next {
                Some(next) => guard.set_destination_floor(next),
                None => return Err(Rejection::OutOfRange),
            }
        }
    }
    Ok(())
}

/// Attach, apply, wake the car loop, exit. Returns a process exit code.
pub fn run(car_name: &str, op: Op) -> i32 {
    let shared = match SharedCar::attach(car_name) {
        Ok(shared) => shared,
        Err(_) => {
            println!("Unable to access car {car_name}.");
            return 1;
        }
    };
    let mut guard = match shared.lock() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: record lock failed: {e}");
            return 1;
        }
    };
    let outcome = apply(&mut guard, op);
    // The car loop is woken even when the operation was refused.
    guard.notify_all();
    drop(guard);

    match outcome {
        Ok(()) => 0,
        Err(rejection) => {
            eprintln!("{rejection}");
            1
        }
    }
}

#[cfg(test)]
#[path = "internal_tests.rs"]
mod tests;
