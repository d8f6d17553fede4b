// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The controller's in-memory car registry.
//!
//! Registration order matters: the selection scan iterates it, so ties
//! on distance go to the earliest-registered car. One registry lock
//! covers insertion, removal, and the scan; each entry's own lock
//! covers its mutable state. Lock order is always registry → entry.

use std::collections::VecDeque;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use lift_proto::{DoorStatus, Floor, Message};

/// Registration facts and live state for one connected car.
pub struct CarEntry {
    pub name: String,
    pub lowest: Floor,
    pub highest: Floor,
    pub state: Mutex<CarState>,
    /// Outbound frames for this car's writer task.
    pub outbound: mpsc::UnboundedSender<Message>,
}

/// Last-reported state plus the queued stops for one car.
pub struct CarState {
    pub current: Floor,
    pub destination: Floor,
    pub status: DoorStatus,
    pub pending: VecDeque<Floor>,
}

impl CarEntry {
    /// Fresh entry at registration: parked at its lowest floor with the
    /// doors closed, nothing queued.
    pub fn new(
        name: String,
        lowest: Floor,
        highest: Floor,
        outbound: mpsc::UnboundedSender<Message>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            lowest,
            highest,
            state: Mutex::new(CarState {
                current: lowest,
                destination: lowest,
                status: DoorStatus::Closed,
                pending: VecDeque::new(),
            }),
            outbound,
        })
    }

    pub fn covers(&self, floor: Floor) -> bool {
        self.lowest <= floor && floor <= self.highest
    }
}

/// Keyed car registry with a single lock for insert/remove/scan.
pub struct Registry {
    cars: Mutex<IndexMap<String, Arc<CarEntry>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self { cars: Mutex::new(IndexMap::new()) }
    }

    /// Insert or replace by name. A re-registering car keeps its
    /// original position in the scan order.
    pub fn insert(&self, entry: Arc<CarEntry>) {
        self.cars.lock().insert(entry.name.clone(), entry);
    }

    /// Remove on disconnect, preserving the order of the rest.
    pub fn remove(&self, name: &str) {
        self.cars.lock().shift_remove(name);
    }

    /// Remove a specific entry. A session that was replaced by a
    /// re-registration under the same name must not evict its successor.
    pub fn remove_entry(&self, entry: &Arc<CarEntry>) {
        let mut cars = self.cars.lock();
        if cars.get(&entry.name).is_some_and(|current| Arc::ptr_eq(current, entry)) {
            cars.shift_remove(&entry.name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<CarEntry>> {
        self.cars.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.cars.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.lock().is_empty()
    }

    /// Pick the car for a hall call: doors last reported `Closed`, range
    /// covering both floors, nearest to the pickup floor, ties to the
    /// earliest registration. Entry locks are held one at a time under
    /// the registry lock.
    pub fn select(&self, source: Floor, destination: Floor) -> Option<Arc<CarEntry>> {
        let cars = self.cars.lock();
        let mut best: Option<(u16, &Arc<CarEntry>)> = None;
        for entry in cars.values() {
            if !entry.covers(source) || !entry.covers(destination) {
                continue;
            }
            let distance = {
                let state = entry.state.lock();
                if state.status != DoorStatus::Closed {
                    continue;
                }
                source.distance(state.current)
            };
            if best.map_or(true, |(nearest, _)| distance < nearest) {
                best = Some((distance, entry));
            }
        }
        best.map(|(_, entry)| entry.clone())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
