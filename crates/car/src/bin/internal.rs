// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use lift_car::internal::{self, Op};

/// Simulate a button press or service action inside one car.
#[derive(Debug, Parser)]
#[command(name = "internal", version, about)]
struct Cli {
    /// Car to operate on.
    car_name: String,

    /// One of: open, close, stop, service_on, service_off, up, down,
    /// block, clear.
    operation: String,
}

fn main() {
    let cli = Cli::parse();
    let Some(op) = Op::parse(&cli.operation) else {
        eprintln!("Invalid operation: \"{}\"", cli.operation);
        std::process::exit(2);
    };
    std::process::exit(internal::run(&cli.car_name, op));
}
