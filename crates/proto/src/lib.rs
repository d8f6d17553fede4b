// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol and domain vocabulary shared by every elevator process:
//! floor labels, door status, the message grammar, and the framed codec.

pub mod floor;
pub mod frame;
pub mod message;
pub mod status;

pub use floor::Floor;
pub use message::Message;
pub use status::DoorStatus;
