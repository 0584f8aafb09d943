//! Schema-registry wire framing.
//!
//! A framed message is:
//! - 1 magic byte (`0x00`)
//! - 4-byte big-endian schema id
//! - the Avro-encoded body

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FrameError;

/// Leading byte of every framed message.
pub const MAGIC_BYTE: u8 = 0x00;

/// Magic byte plus schema id.
pub const HEADER_LEN: usize = 5;

/// Split a framed message into its schema id and body.
///
/// The body is borrowed from `data`; nothing is copied.
///
/// # Errors
/// - `FrameError::TooShort` if fewer than 5 bytes are supplied
/// - `FrameError::BadMagicByte` if the first byte is not `0x00`
///
/// # Example
/// ```
/// use avroframe::frame::read_frame;
///
/// let (id, body) = read_frame(&[0, 0, 0, 1, 0, 2, 4]).unwrap();
/// assert_eq!(id, 256);
/// assert_eq!(body, &[2, 4]);
/// ```
pub fn read_frame(data: &[u8]) -> Result<(u32, &[u8]), FrameError> {
    let schema_id = read_header(data)?;
    Ok((schema_id, &data[HEADER_LEN..]))
}

/// Owned variant of [`read_frame`]; the body shares `data`'s allocation.
pub fn read_frame_bytes(data: Bytes) -> Result<(u32, Bytes), FrameError> {
    let schema_id = read_header(&data)?;
    Ok((schema_id, data.slice(HEADER_LEN..)))
}

/// Read and validate the 5-byte header, returning the schema id.
pub fn read_header(data: &[u8]) -> Result<u32, FrameError> {
    if data.len() < HEADER_LEN {
        return Err(FrameError::TooShort(data.len()));
    }
    if data[0] != MAGIC_BYTE {
        return Err(FrameError::BadMagicByte(data[0]));
    }
    Ok(u32::from_be_bytes([data[1], data[2], data[3], data[4]]))
}

/// Prefix `body` with the magic byte and big-endian `schema_id`.
pub fn write_frame(schema_id: u32, body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + body.len());
    buf.put_u8(MAGIC_BYTE);
    buf.put_u32(schema_id);
    buf.put_slice(body);
    buf.freeze()
}
