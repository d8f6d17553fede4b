// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-framed transport: every TCP message is a 32-bit big-endian
//! byte count followed by that many bytes of ASCII payload, with no
//! trailing newline. Partial reads are re-looped until the frame is
//! whole.

use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a frame payload. Anything larger is a protocol error.
pub const MAX_FRAME: usize = 1024;

fn invalid(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_owned())
}

/// Encode a payload into its on-wire form.
pub fn encode(payload: &str) -> io::Result<Bytes> {
    if payload.len() > MAX_FRAME {
        return Err(invalid("frame payload too large"));
    }
    if !payload.is_ascii() {
        return Err(invalid("frame payload is not ASCII"));
    }
    let mut buf = BytesMut::with_capacity(4 + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload.as_bytes());
    Ok(buf.freeze())
}

/// Decode one frame from the front of `bytes`.
///
/// Returns `None` when the buffer does not yet hold a whole frame,
/// otherwise the payload and the number of bytes consumed.
pub fn decode(bytes: &[u8]) -> io::Result<Option<(String, usize)>> {
    let Some(header) = bytes.first_chunk::<4>() else {
        return Ok(None);
    };
    let len = u32::from_be_bytes(*header) as usize;
    if len > MAX_FRAME {
        return Err(invalid("frame length exceeds maximum"));
    }
    let Some(payload) = bytes.get(4..4 + len) else {
        return Ok(None);
    };
    if !payload.is_ascii() {
        return Err(invalid("frame payload is not ASCII"));
    }
    let payload =
        String::from_utf8(payload.to_vec()).map_err(|_| invalid("frame payload is not ASCII"))?;
    Ok(Some((payload, 4 + len)))
}

/// Write one framed payload.
pub async fn write_frame<W>(writer: &mut W, payload: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode(payload)?;
    writer.write_all(&frame).await?;
    writer.flush().await
}

/// Read one framed payload.
///
/// Returns `Ok(None)` on a clean end of stream (EOF before any header
/// byte); EOF in the middle of a frame is an error.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "EOF inside frame header"));
        }
        filled += n;
    }

    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME {
        return Err(invalid("frame length exceeds maximum"));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    if !payload.is_ascii() {
        return Err(invalid("frame payload is not ASCII"));
    }
    let payload =
        String::from_utf8(payload).map_err(|_| invalid("frame payload is not ASCII"))?;
    Ok(Some(payload))
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
