// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};

use lift_proto::Floor;
use lift_shm::SharedCar;

static NAMES: AtomicUsize = AtomicUsize::new(0);

fn floor(label: &str) -> Floor {
    label.parse().expect("valid label")
}

fn record() -> SharedCar {
    let name = format!("st{}n{}", std::process::id(), NAMES.fetch_add(1, Ordering::Relaxed));
    let shared = SharedCar::create(&name, floor("1")).expect("create");
    let _ = shared.unlink();
    shared
}

#[test]
fn healthy_record_raises_nothing() {
    let shared = record();
    let mut guard = shared.lock().expect("lock");
    assert_eq!(evaluate(&mut guard), None);
    assert_eq!(guard.emergency_mode(), 0);
}

#[test]
fn obstruction_while_closing_reverses_the_doors() {
    let shared = record();
    let mut guard = shared.lock().expect("lock");
    guard.set_status(DoorStatus::Closing);
    guard.set_door_obstruction(1);

    assert_eq!(evaluate(&mut guard), Some(SafetyEvent::Obstruction));
    assert_eq!(guard.status(), Some(DoorStatus::Opening));
    assert_eq!(guard.emergency_mode(), 0);
}

#[test]
fn obstruction_while_parked_is_a_data_error() {
    let shared = record();
    let mut guard = shared.lock().expect("lock");
    guard.set_door_obstruction(1);

    assert_eq!(evaluate(&mut guard), Some(SafetyEvent::DataError));
    assert_eq!(guard.emergency_mode(), 1);
}

#[test]
fn obstruction_while_opening_is_healthy() {
    let shared = record();
    let mut guard = shared.lock().expect("lock");
    guard.set_status(DoorStatus::Opening);
    guard.set_door_obstruction(1);

    assert_eq!(evaluate(&mut guard), None);
}

#[test]
fn emergency_stop_forces_emergency_mode_once() {
    let shared = record();
    let mut guard = shared.lock().expect("lock");
    guard.set_emergency_stop(1);

    assert_eq!(evaluate(&mut guard), Some(SafetyEvent::EmergencyStop));
    assert_eq!(guard.emergency_mode(), 1);

    // Already in emergency mode: nothing further to report.
    assert_eq!(evaluate(&mut guard), None);
}

#[test]
fn overload_forces_emergency_mode() {
    let shared = record();
    let mut guard = shared.lock().expect("lock");
    guard.set_overload(1);

    assert_eq!(evaluate(&mut guard), Some(SafetyEvent::Overload));
    assert_eq!(guard.emergency_mode(), 1);
}

#[test]
fn obstruction_outranks_emergency_stop() {
    let shared = record();
    let mut guard = shared.lock().expect("lock");
    guard.set_status(DoorStatus::Closing);
    guard.set_door_obstruction(1);
    guard.set_emergency_stop(1);

    assert_eq!(evaluate(&mut guard), Some(SafetyEvent::Obstruction));
    assert_eq!(guard.emergency_mode(), 0);

    // With the doors reversed, the next wake-up reports the stop.
    assert_eq!(evaluate(&mut guard), Some(SafetyEvent::EmergencyStop));
    assert_eq!(guard.emergency_mode(), 1);
}

#[test]
fn flag_outside_zero_or_one_is_a_data_error() {
    let shared = record();
    let mut guard = shared.lock().expect("lock");
    guard.set_overload(2);

    assert_eq!(evaluate(&mut guard), Some(SafetyEvent::DataError));
    assert_eq!(guard.emergency_mode(), 1);
}

#[test]
fn corrupt_emergency_mode_is_a_data_error() {
    let shared = record();
    let mut guard = shared.lock().expect("lock");
    guard.set_emergency_mode(3);

    assert_eq!(evaluate(&mut guard), Some(SafetyEvent::DataError));
    assert_eq!(guard.emergency_mode(), 1);
}

#[test]
fn emergency_mode_suppresses_data_checks() {
    let shared = record();
    let mut guard = shared.lock().expect("lock");
    guard.set_emergency_mode(1);
    guard.set_overload(2);

    assert_eq!(evaluate(&mut guard), None);
}

#[test]
fn verdict_wording_matches_the_operator_contract() {
    assert_eq!(SafetyEvent::Obstruction.message(), "Obstruction detected. Opening doors.");
    assert_eq!(
        SafetyEvent::EmergencyStop.message(),
        "The emergency stop button has been pressed!"
    );
    assert_eq!(SafetyEvent::Overload.message(), "The overload sensor has been tripped!");
    assert_eq!(SafetyEvent::DataError.message(), "Data consistency error!");
}
