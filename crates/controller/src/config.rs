// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

/// Central dispatcher for hall calls.
#[derive(Debug, Parser)]
#[command(name = "controller", version, about)]
pub struct ControllerConfig {
    /// Host address to bind to.
    #[arg(long, default_value = "0.0.0.0", env = "LIFT_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 3000, env = "LIFT_PORT")]
    pub port: u16,
}
