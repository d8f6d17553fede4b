// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The independent safety monitor.
//!
//! Attaches to one car's record and enforces its invariants without
//! trusting the car process. On every wake-up the rules are evaluated
//! in a fixed order and the first match wins: an obstruction while the
//! doors close reverses them; an emergency stop or tripped overload
//! sensor forces emergency mode; any data-consistency violation forces
//! emergency mode. Verdicts go to stdout and are flushed immediately.

use std::io::{self, Write};

use lift_proto::DoorStatus;
use lift_shm::{RecordGuard, SharedCar};

/// A condition the monitor acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyEvent {
    Obstruction,
    EmergencyStop,
    Overload,
    DataError,
}

impl SafetyEvent {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Obstruction => "Obstruction detected. Opening doors.",
            Self::EmergencyStop => "The emergency stop button has been pressed!",
            Self::Overload => "The overload sensor has been tripped!",
            Self::DataError => "Data consistency error!",
        }
    }
}

/// Evaluate one wake-up. The first matching rule mutates the record and
/// is returned for reporting; `None` means the record is healthy.
pub fn evaluate(guard: &mut RecordGuard<'_>) -> Option<SafetyEvent> {
    if guard.door_obstruction() == 1 && guard.status() == Some(DoorStatus::Closing) {
        guard.set_status(DoorStatus::Opening);
        return Some(SafetyEvent::Obstruction);
    }
    if guard.emergency_stop() == 1 && guard.emergency_mode() == 0 {
        guard.set_emergency_mode(1);
        return Some(SafetyEvent::EmergencyStop);
    }
    if guard.overload() == 1 && guard.emergency_mode() == 0 {
        guard.set_emergency_mode(1);
        return Some(SafetyEvent::Overload);
    }
    if guard.emergency_mode() != 1 && !consistent(guard) {
        guard.set_emergency_mode(1);
        return Some(SafetyEvent::DataError);
    }
    None
}

/// The record-level data-consistency invariants: valid labels in both
/// floor fields, a valid status, every flag in {0, 1}, and the
/// obstruction sensor raised only while the doors are in motion.
fn consistent(guard: &RecordGuard<'_>) -> bool {
    let flags = [
        guard.open_button(),
        guard.close_button(),
        guard.door_obstruction(),
        guard.overload(),
        guard.emergency_stop(),
        guard.individual_service_mode(),
        guard.emergency_mode(),
    ];
    if flags.iter().any(|&flag| flag > 1) {
        return false;
    }
    let Some(status) = guard.status() else {
        return false;
    };
    if guard.current_floor().is_none() || guard.destination_floor().is_none() {
        return false;
    }
    if guard.door_obstruction() == 1
        && !matches!(status, DoorStatus::Opening | DoorStatus::Closing)
    {
        return false;
    }
    true
}

/// Attach to a car and enforce its invariants until killed. Returns a
/// process exit code (only on failure to attach or a broken mutex).
pub fn run(car_name: &str) -> i32 {
    let shared = match SharedCar::attach(car_name) {
        Ok(shared) => shared,
        Err(_) => {
            println!("Unable to access car {car_name}.");
            let _ = io::stdout().flush();
            return 1;
        }
    };
    monitor(&shared)
}

fn monitor(shared: &SharedCar) -> i32 {
    loop {
        let event = {
            let mut guard = match shared.lock() {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("error: record lock failed: {e}");
                    return 1;
                }
            };
            if let Err(e) = guard.wait() {
                eprintln!("error: record wait failed: {e}");
                return 1;
            }
            let event = evaluate(&mut guard);
            if event.is_some() {
                guard.notify_all();
            }
            event
        };
        if let Some(event) = event {
            println!("{}", event.message());
            let _ = io::stdout().flush();
        }
    }
}

#[cfg(test)]
#[path = "safety_tests.rs"]
mod tests;
