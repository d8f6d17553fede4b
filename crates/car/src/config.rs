// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;

use lift_proto::Floor;

/// One elevator car: owns the shared record and serves the controller.
#[derive(Debug, Parser)]
#[command(name = "car", version, about)]
pub struct CarConfig {
    /// Car name (ASCII alphanumeric; names the shared-memory object).
    pub name: String,

    /// Lowest floor this car serves.
    pub lowest: String,

    /// Highest floor this car serves.
    pub highest: String,

    /// Milliseconds between door and motion transitions.
    pub delay_ms: u64,

    /// Controller address.
    #[arg(long, default_value = "127.0.0.1", env = "LIFT_CONTROLLER_HOST")]
    pub controller_host: String,

    /// Controller port.
    #[arg(long, default_value_t = 3000, env = "LIFT_CONTROLLER_PORT")]
    pub controller_port: u16,
}

impl CarConfig {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.is_empty() || !self.name.chars().all(|c| c.is_ascii_alphanumeric()) {
            anyhow::bail!("car name must be non-empty ASCII alphanumeric");
        }
        let lowest = self.lowest()?;
        let highest = self.highest()?;
        if lowest > highest {
            anyhow::bail!("lowest floor {lowest} is above highest floor {highest}");
        }
        if self.delay_ms == 0 {
            anyhow::bail!("delay must be a positive number of milliseconds");
        }
        Ok(())
    }

    pub fn lowest(&self) -> anyhow::Result<Floor> {
        Ok(self.lowest.parse()?)
    }

    pub fn highest(&self) -> anyhow::Result<Floor> {
        Ok(self.highest.parse()?)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
