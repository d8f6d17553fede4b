// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use proptest::prelude::*;

#[test]
fn encode_prefixes_big_endian_length() {
    let frame = encode("CALL 3 7").expect("encodes");
    assert_eq!(&frame[..4], &[0, 0, 0, 8]);
    assert_eq!(&frame[4..], b"CALL 3 7");
}

#[test]
fn decode_roundtrips_encode() {
    let frame = encode("STATUS Closed 1 1").expect("encodes");
    let (payload, consumed) = decode(&frame).expect("decodes").expect("whole frame");
    assert_eq!(payload, "STATUS Closed 1 1");
    assert_eq!(consumed, frame.len());
}

#[test]
fn decode_waits_for_a_whole_frame() {
    let frame = encode("FLOOR 9").expect("encodes");
    assert_eq!(decode(&frame[..3]).expect("no error"), None);
    assert_eq!(decode(&frame[..frame.len() - 1]).expect("no error"), None);
}

#[test]
fn decode_rejects_oversized_length() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(MAX_FRAME as u32 + 1).to_be_bytes());
    assert!(decode(&bytes).is_err());
}

#[test]
fn encode_rejects_non_ascii() {
    assert!(encode("héllo").is_err());
}

#[tokio::test]
async fn read_frame_reassembles_partial_writes() {
    let (mut client, mut server) = tokio::io::duplex(8);

    let writer = tokio::spawn(async move {
        write_frame(&mut client, "CAR A 1 10").await.expect("write");
    });

    let payload = read_frame(&mut server).await.expect("read").expect("frame");
    assert_eq!(payload, "CAR A 1 10");
    writer.await.expect("writer task");
}

#[tokio::test]
async fn read_frame_returns_none_on_clean_eof() {
    let (client, mut server) = tokio::io::duplex(8);
    drop(client);
    assert_eq!(read_frame(&mut server).await.expect("read"), None);
}

#[tokio::test]
async fn read_frame_errors_on_truncated_frame() {
    let (mut client, mut server) = tokio::io::duplex(64);
    let frame = encode("CALL 3 7").expect("encodes");
    tokio::io::AsyncWriteExt::write_all(&mut client, &frame[..6]).await.expect("write");
    drop(client);
    assert!(read_frame(&mut server).await.is_err());
}

proptest! {
    /// Encoding then decoding a framed message yields the original bytes.
    #[test]
    fn framed_roundtrip(payload in "[ -~]{0,1024}") {
        let frame = encode(&payload).expect("encodes");
        let (decoded, consumed) = decode(&frame).expect("decodes").expect("whole frame");
        prop_assert_eq!(decoded, payload);
        prop_assert_eq!(consumed, frame.len());
    }
}
