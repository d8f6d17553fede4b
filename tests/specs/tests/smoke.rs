// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real binaries and check the
//! passenger-visible wording.

use std::time::Duration;

use serial_test::serial;

use lift_specs::{call_until, free_port, unique_car_name, wait_listening, Proc};

const TIMEOUT: Duration = Duration::from_secs(20);

#[test]
#[serial]
fn call_without_cars_is_refused() -> anyhow::Result<()> {
    let port = free_port()?;
    let _controller = Proc::controller(port)?;
    wait_listening(port, TIMEOUT)?;

    call_until(port, "2", "5", "Sorry, no car is available to take this request.", TIMEOUT)
}

#[test]
#[serial]
fn registered_car_takes_a_call() -> anyhow::Result<()> {
    let port = free_port()?;
    let _controller = Proc::controller(port)?;
    wait_listening(port, TIMEOUT)?;

    let name = unique_car_name("A");
    let _car = Proc::car(&name, "1", "10", 10, port)?;

    call_until(port, "3", "7", &format!("Car {name} is arriving."), TIMEOUT)
}

#[test]
#[serial]
fn only_a_car_covering_both_floors_is_dispatched() -> anyhow::Result<()> {
    let port = free_port()?;
    let _controller = Proc::controller(port)?;
    wait_listening(port, TIMEOUT)?;

    let narrow = unique_car_name("N");
    let wide = unique_car_name("W");
    let _narrow = Proc::car(&narrow, "1", "5", 10, port)?;
    let _wide = Proc::car(&wide, "1", "10", 10, port)?;

    call_until(port, "1", "8", &format!("Car {wide} is arriving."), TIMEOUT)
}
