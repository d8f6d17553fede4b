// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use lift_controller::call::{self, CallArgs};

#[tokio::main]
async fn main() {
    let args = CallArgs::parse();
    std::process::exit(call::run(&args).await);
}
