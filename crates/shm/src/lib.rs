// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The inter-process car record.
//!
//! Each elevator car owns one POSIX shared-memory object named
//! `/car<name>` holding a single fixed-layout record: a process-shared
//! mutex and condition variable followed by the car's live state. The
//! car process creates and unlinks the object; the safety monitor and
//! the internal-op tool attach to it and participate equally in locking.

pub mod record;

pub use record::{object_name, RecordGuard, SharedCar};
