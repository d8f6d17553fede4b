// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The door/motion state machine.
//!
//! One worker thread drives the car: one-floor movement steps while the
//! destination differs from the current floor, and a resumable door
//! cycle `Closed → Opening → Open → Closing → Closed` while parked.
//! Every sleep happens with the record lock released, so buttons, the
//! internal tool, and the safety monitor can interpose between any two
//! transitions; the cycle continues from whatever status it finds next.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use lift_proto::{DoorStatus, Floor};
use lift_shm::{RecordGuard, SharedCar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Up,
    Down,
}

/// The motion worker for one car.
pub struct MotionWorker {
    shared: Arc<SharedCar>,
    lowest: Floor,
    highest: Floor,
    delay: Duration,
}

impl MotionWorker {
    pub fn new(shared: Arc<SharedCar>, lowest: Floor, highest: Floor, delay: Duration) -> Self {
        Self { shared, lowest, highest, delay }
    }

    /// Drive the state machine until the record's mutex fails.
    pub fn run(&self) -> io::Result<()> {
        // Set while a wake-up (arrival, hall call, button) still owes the
        // passengers a door cycle; cleared when the cycle reaches Closed.
        let mut cycle_pending = false;

        loop {
            let mut guard = self.shared.lock()?;

            if guard.emergency_mode() == 1 {
                cycle_pending = false;
                guard.wait()?;
                continue;
            }

            let (current, destination) =
                match (guard.current_floor(), guard.destination_floor()) {
                    (Some(current), Some(destination)) => (current, destination),
                    // Corrupt labels are the safety monitor's call.
                    _ => {
                        guard.wait()?;
                        continue;
                    }
                };
            let status = match guard.status() {
                Some(status) => status,
                None => {
                    guard.wait()?;
                    continue;
                }
            };

            if guard.individual_service_mode() == 1 {
                // Manual mode: no automatic door cycling. The internal
                // tool requests moves by placing the destination one
                // floor away; the step itself happens here.
                if status == DoorStatus::Between {
                    guard.set_status(DoorStatus::Closed);
                    guard.notify_all();
                } else if status == DoorStatus::Closed && current != destination {
                    match self.step_direction(current, destination) {
                        Some(step) => self.move_one(guard, current, step)?,
                        None => guard.wait()?,
                    }
                } else {
                    guard.wait()?;
                }
                continue;
            }

            if current == destination && status == DoorStatus::Closed && !cycle_pending {
                guard.wait()?;
                cycle_pending = true;
                continue;
            }

            if current != destination && status == DoorStatus::Closed {
                match self.step_direction(current, destination) {
                    Some(step) => {
                        self.move_one(guard, current, step)?;
                        cycle_pending = true;
                    }
                    // Destination outside this car's range: stay parked.
                    None => guard.wait()?,
                }
                continue;
            }

            // Advance the door cycle one transition.
            let next = match status {
                DoorStatus::Closed => DoorStatus::Opening,
                DoorStatus::Opening => DoorStatus::Open,
                DoorStatus::Open => DoorStatus::Closing,
                DoorStatus::Closing => DoorStatus::Closed,
                // Settle a car halted between floors (emergency reset).
                DoorStatus::Between => DoorStatus::Closed,
            };
            if next == DoorStatus::Closed {
                cycle_pending = false;
            }
            guard.set_status(next);
            guard.notify_all();
            drop(guard);
            std::thread::sleep(self.delay);
        }
    }

    fn step_direction(&self, current: Floor, destination: Floor) -> Option<Step> {
        if destination > current && current < self.highest {
            Some(Step::Up)
        } else if destination < current && current > self.lowest {
            Some(Step::Down)
        } else {
            None
        }
    }

    /// One floor of travel: `Between` for `delay`, then the new floor
    /// with doors `Closed`. The floor does not change if emergency mode
    /// was raised during the sleep.
    fn move_one(&self, mut guard: RecordGuard<'_>, from: Floor, step: Step) -> io::Result<()> {
        guard.set_status(DoorStatus::Between);
        guard.notify_all();
        drop(guard);
        std::thread::sleep(self.delay);

        let mut guard = self.shared.lock()?;
        if guard.emergency_mode() == 1 {
            return Ok(());
        }
        let next = match step {
            Step::Up => from.up(),
            Step::Down => from.down(),
        };
        if let Some(next) = next {
            guard.set_current_floor(next);
        }
        guard.set_status(DoorStatus::Closed);
        guard.notify_all();
        Ok(())
    }
}

#[cfg(test)]
#[path = "motion_tests.rs"]
mod tests;
