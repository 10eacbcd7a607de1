//! Length-delimited record framing
//!
//! Each frame is an unsigned LEB128 length followed by that many bytes of
//! JSON. Frames can be concatenated in one stream.

use std::io::{ErrorKind, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::RecordError;

/// Largest payload accepted when reading (16 MiB)
pub const MAX_FRAME_LEN: u64 = 16 * 1024 * 1024;

/// Serialize `record` and write it as one frame
pub fn write_delimited<W: Write, T: Serialize>(
    writer: &mut W,
    record: &T,
) -> Result<(), RecordError> {
    let payload = serde_json::to_vec(record)?;
    let mut len = payload.len() as u64;
    let mut prefix = Vec::with_capacity(10);
    loop {
        let byte = (len & 0x7f) as u8;
        len >>= 7;
        if len == 0 {
            prefix.push(byte);
            break;
        }
        prefix.push(byte | 0x80);
    }
    writer.write_all(&prefix)?;
    writer.write_all(&payload)?;
    Ok(())
}

/// Read the next frame; `Ok(None)` on a clean end of stream
pub fn read_delimited<R: Read, T: DeserializeOwned>(
    reader: &mut R,
) -> Result<Option<T>, RecordError> {
    let Some(len) = read_length(reader)? else {
        return Ok(None);
    };
    if len > MAX_FRAME_LEN {
        return Err(RecordError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    Ok(Some(serde_json::from_slice(&payload)?))
}

fn read_length<R: Read>(reader: &mut R) -> Result<Option<u64>, RecordError> {
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut byte = [0u8; 1];
    loop {
        match reader.read_exact(&mut byte) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return if shift == 0 {
                    Ok(None)
                } else {
                    Err(RecordError::TruncatedLength)
                };
            }
            Err(e) => return Err(e.into()),
        }
        if shift >= 64 {
            return Err(RecordError::FrameTooLarge {
                len: u64::MAX,
                max: MAX_FRAME_LEN,
            });
        }
        value |= u64::from(byte[0] & 0x7f) << shift;
        if byte[0] & 0x80 == 0 {
            return Ok(Some(value));
        }
        shift += 7;
    }
}
