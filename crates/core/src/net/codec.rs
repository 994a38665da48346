//! ASCII-decimal length-prefixed framing: `HEADER_SIZE` bytes of right-aligned
//! decimal frame length, followed by `CLASS_ID_SIZE` bytes of right-aligned
//! decimal class tag, followed by the opaque payload body.
//!
//! A malformed numeric field parses to `0` rather than erroring — the
//! dispatch switch then drops the message and the transport continues, which
//! keeps the stream resynchronized after any one complete frame.

use std::io::{self, Read};

use crate::config::{CLASS_ID_SIZE, HEADER_SIZE};

fn parse_ascii_field(bytes: &[u8]) -> usize {
    std::str::from_utf8(bytes).ok().and_then(|s| s.trim().parse().ok()).unwrap_or_else(|| {
        log::trace!("malformed ascii-decimal field, treating as 0: {bytes:?}");
        0
    })
}

/// Pulls one complete frame body out of an accumulation buffer fed by a
/// non-blocking socket, if one is fully present yet. Leaves any trailing
/// partial frame in `buf` for the next call.
pub fn try_extract_frame(buf: &mut Vec<u8>) -> Option<Vec<u8>> {
    if buf.len() < HEADER_SIZE {
        return None;
    }
    let body_len = parse_ascii_field(&buf[..HEADER_SIZE]);
    let total = HEADER_SIZE + body_len;
    if buf.len() < total {
        return None;
    }
    let body = buf[HEADER_SIZE..total].to_vec();
    buf.drain(..total);
    Some(body)
}

/// Builds a complete frame (header + class id + payload) ready to write.
pub fn frame(class_id: u8, payload: &[u8]) -> Vec<u8> {
    let body_len = CLASS_ID_SIZE + payload.len();
    let mut out = Vec::with_capacity(HEADER_SIZE + body_len);
    out.extend_from_slice(format!("{body_len:>HEADER_SIZE$}").as_bytes());
    out.extend_from_slice(format!("{class_id:>CLASS_ID_SIZE$}").as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Splits a frame body into its leading class id and the remaining payload.
/// A body shorter than `CLASS_ID_SIZE` parses to class id `0`, which the
/// dispatch switch treats as unknown and drops.
pub fn split_class_id(body: &[u8]) -> (u8, &[u8]) {
    if body.len() < CLASS_ID_SIZE {
        return (0, &[]);
    }
    let class_id = parse_ascii_field(&body[..CLASS_ID_SIZE]) as u8;
    (class_id, &body[CLASS_ID_SIZE..])
}

/// Reads one frame's body (class id + payload, header already stripped) from
/// a blocking reader. Two-phase: read the header, parse its length, read
/// exactly that many more bytes. Returns `Ok(None)` on a clean EOF that lands
/// exactly on a frame boundary; an EOF in the middle of a frame is an error.
pub fn take_frame(reader: &mut impl Read) -> io::Result<Option<Vec<u8>>> {
    let mut header = [0u8; HEADER_SIZE];
    if !read_exact_or_eof(reader, &mut header)? {
        return Ok(None);
    }

    let body_len = parse_ascii_field(&header);
    let mut body = vec![0u8; body_len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Like `Read::read_exact`, but distinguishes "EOF before any byte was read"
/// (returns `Ok(false)`) from a genuine short read mid-buffer (an error).
fn read_exact_or_eof(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed mid-frame",
                ));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}
