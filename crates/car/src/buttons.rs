// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-car button handler.
//!
//! Open re-runs the door cycle from `Opening` when pressed with the
//! doors `Open` (restarting the open window), `Closing`, or `Closed`;
//! close cuts an `Open` short by jumping to `Closing`. Both flags are
//! consumed after handling whether or not they changed anything.

use std::io;
use std::sync::Arc;

use lift_proto::DoorStatus;
use lift_shm::SharedCar;

pub struct ButtonWorker {
    shared: Arc<SharedCar>,
}

impl ButtonWorker {
    pub fn new(shared: Arc<SharedCar>) -> Self {
        Self { shared }
    }

    /// React to button flags until the record's mutex fails.
    pub fn run(&self) -> io::Result<()> {
        loop {
            let mut guard = self.shared.lock()?;
            if guard.open_button() != 1 && guard.close_button() != 1 {
                guard.wait()?;
            }

            let mut touched = false;
            if guard.open_button() == 1 {
                if matches!(
                    guard.status(),
                    Some(DoorStatus::Open | DoorStatus::Closing | DoorStatus::Closed)
                ) {
                    guard.set_status(DoorStatus::Opening);
                }
                guard.set_open_button(0);
                touched = true;
            }
            if guard.close_button() == 1 {
                if guard.status() == Some(DoorStatus::Open) {
                    guard.set_status(DoorStatus::Closing);
                }
                guard.set_close_button(0);
                touched = true;
            }
            if touched {
                guard.notify_all();
            }
        }
    }
}

#[cfg(test)]
#[path = "buttons_tests.rs"]
mod tests;
