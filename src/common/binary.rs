//! Bounds-checked binary data parsing.
//!
//! The CFB and BIFF8 layers need little-endian reads; the PNG chunk walk and JPEG
//! APP-segment length need big-endian reads. Every read here is checked against the
//! slice length before the bytes are interpreted, so a short or truncated buffer
//! produces an error instead of a panic or an out-of-bounds read.

use zerocopy::{BE, FromBytes, LE, U16, U32};

/// Binary parsing error type.
#[derive(Debug, Clone)]
pub enum BinaryError {
    /// Not enough data remained to read the requested type.
    InsufficientData { expected: usize, available: usize },
    /// The bytes could not be interpreted as the requested type.
    ParseError(String),
}

impl std::fmt::Display for BinaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryError::InsufficientData {
                expected,
                available,
            } => write!(
                f,
                "insufficient data: expected {}, got {}",
                expected, available
            ),
            BinaryError::ParseError(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for BinaryError {}

/// Result type for binary operations.
pub type BinaryResult<T> = Result<T, BinaryError>;

/// Read a little-endian `u16` from `data` at `offset`.
///
/// # Examples
///
/// ```
/// use xls2img::common::binary::read_u16_le;
/// let data = [0x34, 0x12, 0x78, 0x56];
/// assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_le(&data, 2).unwrap(), 0x5678);
/// ```
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> BinaryResult<u16> {
    if offset + 2 > data.len() {
        return Err(BinaryError::InsufficientData {
            expected: offset + 2,
            available: data.len(),
        });
    }
    U16::<LE>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("failed to read u16".to_string()))
}

/// Read a little-endian `u32` from `data` at `offset`.
///
/// # Examples
///
/// ```
/// use xls2img::common::binary::read_u32_le;
/// let data = [0x78, 0x56, 0x34, 0x12];
/// assert_eq!(read_u32_le(&data, 0).unwrap(), 0x12345678);
/// ```
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> BinaryResult<u32> {
    if offset + 4 > data.len() {
        return Err(BinaryError::InsufficientData {
            expected: offset + 4,
            available: data.len(),
        });
    }
    U32::<LE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("failed to read u32".to_string()))
}

/// Read a big-endian `u16` from `data` at `offset`.
///
/// Used for JPEG APP-segment lengths, which (unlike the rest of the BIFF/CFB
/// layers) are big-endian.
///
/// # Examples
///
/// ```
/// use xls2img::common::binary::read_u16_be;
/// let data = [0x12, 0x34];
/// assert_eq!(read_u16_be(&data, 0).unwrap(), 0x1234);
/// ```
#[inline]
pub fn read_u16_be(data: &[u8], offset: usize) -> BinaryResult<u16> {
    if offset + 2 > data.len() {
        return Err(BinaryError::InsufficientData {
            expected: offset + 2,
            available: data.len(),
        });
    }
    U16::<BE>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("failed to read u16 (BE)".to_string()))
}

/// Read a big-endian `u32` from `data` at `offset`.
///
/// Used for PNG chunk lengths, which are big-endian per the PNG specification.
///
/// # Examples
///
/// ```
/// use xls2img::common::binary::read_u32_be;
/// let data = [0x12, 0x34, 0x56, 0x78];
/// assert_eq!(read_u32_be(&data, 0).unwrap(), 0x12345678);
/// ```
#[inline]
pub fn read_u32_be(data: &[u8], offset: usize) -> BinaryResult<u32> {
    if offset + 4 > data.len() {
        return Err(BinaryError::InsufficientData {
            expected: offset + 4,
            available: data.len(),
        });
    }
    U32::<BE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .map_err(|_| BinaryError::ParseError("failed to read u32 (BE)".to_string()))
}

/// Decode a UTF-16LE byte slice to a `String`, stopping at the first null code unit.
///
/// Used for CFB directory entry names, which are stored as null-padded UTF-16LE.
///
/// # Examples
///
/// ```
/// use xls2img::common::binary::decode_utf16le;
/// let data = [0x57, 0x00, 0x00, 0x00]; // "W\0"
/// assert_eq!(decode_utf16le(&data), "W");
/// ```
pub fn decode_utf16le(data: &[u8]) -> String {
    let mut units = Vec::with_capacity(data.len() / 2);
    for chunk in data.chunks_exact(2) {
        let unit = U16::<LE>::read_from_bytes(chunk).map(|v| v.get()).unwrap_or(0);
        if unit == 0 {
            break;
        }
        units.push(unit);
    }
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u16_le() {
        let data = [0x34, 0x12, 0x78, 0x56];
        assert!(read_u16_le(&data, 0).is_ok_and(|v| v == 0x1234));
        assert!(read_u16_le(&data, 2).is_ok_and(|v| v == 0x5678));
        assert!(read_u16_le(&data, 3).is_err());
    }

    #[test]
    fn test_read_u32_le() {
        let data = [0x78, 0x56, 0x34, 0x12];
        assert!(read_u32_le(&data, 0).is_ok_and(|v| v == 0x12345678));
        assert!(read_u32_le(&data, 1).is_err());
    }

    #[test]
    fn test_read_u16_be() {
        let data = [0x00, 0x10];
        assert!(read_u16_be(&data, 0).is_ok_and(|v| v == 0x0010));
    }

    #[test]
    fn test_read_u32_be() {
        let data = [0x00, 0x00, 0x00, 0x0D];
        assert!(read_u32_be(&data, 0).is_ok_and(|v| v == 13));
    }

    #[test]
    fn test_decode_utf16le_stops_at_nul() {
        let data = [0x57, 0x00, 0x6F, 0x00, 0x72, 0x00, 0x00, 0x00, 0xAA, 0xAA];
        assert_eq!(decode_utf16le(&data), "Wor");
    }

    #[test]
    fn test_decode_utf16le_empty() {
        assert_eq!(decode_utf16le(&[]), "");
    }
}
