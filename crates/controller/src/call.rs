// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `call` — one-shot hall-call client.
//!
//! Validates the two floors locally (equal floors never reach the
//! controller), sends a single framed `CALL`, and prints the verdict.

use clap::Parser;
use tokio::net::TcpStream;

use lift_proto::{frame, Floor, Message};

/// Request an elevator between two floors.
#[derive(Debug, Parser)]
#[command(name = "call", version, about)]
pub struct CallArgs {
    /// Floor the passenger is calling from.
    pub source: String,

    /// Floor the passenger wants to reach.
    pub destination: String,

    /// Controller address.
    #[arg(long, default_value = "127.0.0.1", env = "LIFT_CONTROLLER_HOST")]
    pub controller_host: String,

    /// Controller port.
    #[arg(long, default_value_t = 3000, env = "LIFT_CONTROLLER_PORT")]
    pub controller_port: u16,
}

/// Run the call client. Returns a process exit code.
pub async fn run(args: &CallArgs) -> i32 {
    let source: Floor = match args.source.parse() {
        Ok(floor) => floor,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    let destination: Floor = match args.destination.parse() {
        Ok(floor) => floor,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    if source == destination {
        eprintln!("error: source and destination floors cannot be the same");
        return 2;
    }

    let mut stream =
        match TcpStream::connect((args.controller_host.as_str(), args.controller_port)).await {
            Ok(stream) => stream,
            Err(_) => {
                eprintln!("Unable to connect to elevator system.");
                return 1;
            }
        };

    let request = Message::Call { source, destination };
    if frame::write_frame(&mut stream, &request.to_string()).await.is_err() {
        eprintln!("Unable to connect to elevator system.");
        return 1;
    }

    match frame::read_frame(&mut stream).await {
        Ok(Some(payload)) => match Message::parse(&payload) {
            Ok(Message::Dispatched { name }) => {
                println!("Car {name} is arriving.");
                0
            }
            Ok(Message::Unavailable) => {
                println!("Sorry, no car is available to take this request.");
                0
            }
            _ => {
                eprintln!("error: unexpected reply from controller");
                1
            }
        },
        _ => {
            eprintln!("Error receiving response from elevator system.");
            1
        }
    }
}

#[cfg(test)]
#[path = "call_tests.rs"]
mod tests;
