// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn args(source: &str, destination: &str, port: u16) -> CallArgs {
    CallArgs {
        source: source.to_owned(),
        destination: destination.to_owned(),
        controller_host: "127.0.0.1".to_owned(),
        controller_port: port,
    }
}

#[tokio::test]
async fn invalid_floor_is_an_argument_error() {
    assert_eq!(run(&args("lobby", "5", 3000)).await, 2);
    assert_eq!(run(&args("2", "B0", 3000)).await, 2);
}

#[tokio::test]
async fn equal_floors_are_rejected_before_connecting() {
    // Port 1 is never connectable; reaching the network would fail with
    // exit code 1, so 2 proves the local check fired first.
    assert_eq!(run(&args("4", "4", 1)).await, 2);
}

#[tokio::test]
async fn unreachable_controller_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    assert_eq!(run(&args("2", "5", port)).await, 1);
}
