// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use lift_car::safety;

/// Independent safety monitor for one car's shared record.
#[derive(Debug, Parser)]
#[command(name = "safety", version, about)]
struct Cli {
    /// Car to monitor.
    car_name: String,
}

fn main() {
    let cli = Cli::parse();
    std::process::exit(safety::run(&cli.car_name));
}
