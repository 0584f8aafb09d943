//! Shared varint encoding and decoding utilities.
//!
//! Avro integers are variable-length:
//! - Each byte has 7 bits of data and 1 continuation bit (MSB)
//! - The continuation bit indicates if more bytes follow
//! - Bytes are in little-endian order
//!
//! Signed values are zigzag mapped first so small magnitudes stay short:
//! - 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, 2 -> 4, ...
//! - Encoding formula: (n << 1) ^ (n >> 63)
//! - Decoding formula: (n >> 1) ^ -(n & 1)
//!
//! Decoders take `&mut &[u8]` and only advance it when a full value was read.

use crate::error::DecodeError;

/// Longest valid encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

// ============================================================================
// Decoding Functions
// ============================================================================

/// Decode an unsigned variable-length integer.
///
/// Returns the value and the number of bytes consumed.
///
/// # Errors
/// - `DecodeError::TruncatedInput` if the input ends before a byte with a
///   clear continuation bit
/// - `DecodeError::InvalidVarint` if the varint exceeds 10 bytes
#[inline]
pub fn decode_varint(data: &mut &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    for (i, &byte) in data.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return Err(DecodeError::InvalidVarint);
        }

        result |= ((byte & 0x7F) as u64) << shift;

        if byte & 0x80 == 0 {
            *data = &data[i + 1..];
            return Ok((result, i + 1));
        }

        shift += 7;
    }

    Err(DecodeError::TruncatedInput)
}

/// Decode a signed, zigzag-encoded variable-length integer.
///
/// Returns the value and the number of bytes consumed.
#[inline]
pub fn decode_zigzag(data: &mut &[u8]) -> Result<(i64, usize), DecodeError> {
    let (unsigned, consumed) = decode_varint(data)?;
    Ok((zigzag_decode(unsigned), consumed))
}

/// Undo the zigzag mapping.
#[inline]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}

/// Skip over a varint without decoding its value.
#[inline]
pub fn skip_varint(data: &mut &[u8]) -> Result<(), DecodeError> {
    decode_varint(data).map(|_| ())
}

// ============================================================================
// Encoding Functions
// ============================================================================

/// Encode an unsigned integer as a variable-length integer.
#[inline]
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut result = Vec::with_capacity(MAX_VARINT_LEN);
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        result.push(byte);
        if value == 0 {
            break;
        }
    }
    result
}

/// Encode a signed integer as a zigzag-encoded variable-length integer.
#[inline]
pub fn encode_zigzag(value: i64) -> Vec<u8> {
    let zigzag = ((value << 1) ^ (value >> 63)) as u64;
    encode_varint(zigzag)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // decode_varint tests
    // ========================================================================

    #[test]
    fn test_decode_varint_single_byte() {
        let data: &[u8] = &[0x00];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor).unwrap(), (0, 1));
        assert!(cursor.is_empty());

        let data: &[u8] = &[0x7F];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor).unwrap(), (127, 1));
    }

    #[test]
    fn test_decode_varint_multi_byte() {
        let data: &[u8] = &[0x80, 0x01];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor).unwrap(), (128, 2));
        assert!(cursor.is_empty());

        let data: &[u8] = &[0xAC, 0x02, 0xFF];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor).unwrap(), (300, 2));
        assert_eq!(cursor, &[0xFF]);

        let data: &[u8] = &[0x80, 0x80, 0x01];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor).unwrap(), (16384, 3));
    }

    #[test]
    fn test_decode_varint_truncated_leaves_input() {
        let data: &[u8] = &[];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor), Err(DecodeError::TruncatedInput));

        let data: &[u8] = &[0x80, 0x80];
        let mut cursor = data;
        assert_eq!(decode_varint(&mut cursor), Err(DecodeError::TruncatedInput));
        assert_eq!(cursor.len(), 2);
    }

    #[test]
    fn test_decode_varint_overlong() {
        let data = [0x80u8; 11];
        let mut cursor = &data[..];
        assert_eq!(decode_varint(&mut cursor), Err(DecodeError::InvalidVarint));
    }

    // ========================================================================
    // decode_zigzag tests
    // ========================================================================

    #[test]
    fn test_decode_zigzag_signs() {
        for (bytes, expected) in [
            (&[0x00][..], 0i64),
            (&[0x01][..], -1),
            (&[0x02][..], 1),
            (&[0x03][..], -2),
            (&[0x04][..], 2),
        ] {
            let mut cursor = bytes;
            assert_eq!(decode_zigzag(&mut cursor).unwrap(), (expected, 1));
        }
    }

    #[test]
    fn test_decode_zigzag_extremes() {
        for value in [i64::MAX, i64::MIN] {
            let encoded = encode_zigzag(value);
            assert_eq!(encoded.len(), MAX_VARINT_LEN);
            let mut cursor = &encoded[..];
            assert_eq!(decode_zigzag(&mut cursor).unwrap(), (value, MAX_VARINT_LEN));
        }
    }

    #[test]
    fn test_skip_varint() {
        let data: &[u8] = &[0x80, 0x80, 0x01, 0xFF];
        let mut cursor = data;
        skip_varint(&mut cursor).unwrap();
        assert_eq!(cursor, &[0xFF]);
    }

    // ========================================================================
    // encode tests
    // ========================================================================

    #[test]
    fn test_encode_varint() {
        assert_eq!(encode_varint(0), vec![0x00]);
        assert_eq!(encode_varint(127), vec![0x7F]);
        assert_eq!(encode_varint(128), vec![0x80, 0x01]);
        assert_eq!(encode_varint(300), vec![0xAC, 0x02]);
    }

    #[test]
    fn test_encode_zigzag() {
        assert_eq!(encode_zigzag(0), vec![0x00]);
        assert_eq!(encode_zigzag(-1), vec![0x01]);
        assert_eq!(encode_zigzag(1), vec![0x02]);
        assert_eq!(encode_zigzag(64), vec![0x80, 0x01]);
        assert_eq!(encode_zigzag(-8193), vec![0x81, 0x80, 0x01]);
    }
}
