//! CFB header validation and sector address arithmetic.
//!
//! Component A of the extraction pipeline: validate the 8-byte magic signature,
//! derive the sector size from the major version field, and translate `(sector,
//! offset)` pairs into absolute offsets within the input buffer.

use crate::common::binary::{read_u16_le, read_u32_le};
use crate::consts::*;
use crate::error::{Error, Result};

/// Parsed fields of the fixed CFB header (offset 0 of the input buffer).
#[derive(Debug, Clone, Copy)]
pub struct CfbHeader {
    pub sector_size: usize,
    pub mini_stream_cutoff: u32,
    pub first_dir_sector: u32,
    pub first_minifat_sector: u32,
    pub num_minifat_sectors: u32,
    pub first_difat_sector: u32,
    pub num_difat_sectors: u32,
    /// The 109 DIFAT entries stored inline in the header.
    pub header_difat: [u32; HEADER_DIFAT_ENTRIES],
}

impl CfbHeader {
    /// Parse and validate the header occupying the first sector of `buffer`.
    ///
    /// `buffer.len()` must already have been checked to be at least
    /// `3 * sector_size` by the caller (the minimum sector size, 512, is used for
    /// that check since the sector size itself is not known until the major
    /// version field has been read).
    pub fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < SECTOR_SIZE_V3 {
            return Err(Error::InvalidArgument(
                "buffer too small to hold a CFB header".to_string(),
            ));
        }

        if buffer[0..8] != MAGIC {
            return Err(Error::WrongFormat);
        }

        let major_version = read_u16_le(buffer, 0x1A)
            .map_err(|e| Error::FileCorrupted(e.to_string()))?;
        let byte_order = read_u16_le(buffer, 0x1C).map_err(|e| Error::FileCorrupted(e.to_string()))?;
        if byte_order != 0xFFFE {
            return Err(Error::FileCorrupted("invalid byte order marker".to_string()));
        }

        let sector_size = match major_version {
            3 => SECTOR_SIZE_V3,
            _ => SECTOR_SIZE_V4,
        };

        if buffer.len() < 3 * sector_size {
            return Err(Error::FileCorrupted(
                "buffer shorter than three sectors".to_string(),
            ));
        }

        let first_dir_sector =
            read_u32_le(buffer, 0x30).map_err(|e| Error::FileCorrupted(e.to_string()))?;
        let mini_stream_cutoff =
            read_u32_le(buffer, 0x38).map_err(|e| Error::FileCorrupted(e.to_string()))?;
        let first_minifat_sector =
            read_u32_le(buffer, 0x3C).map_err(|e| Error::FileCorrupted(e.to_string()))?;
        let num_minifat_sectors =
            read_u32_le(buffer, 0x40).map_err(|e| Error::FileCorrupted(e.to_string()))?;
        let first_difat_sector =
            read_u32_le(buffer, 0x44).map_err(|e| Error::FileCorrupted(e.to_string()))?;
        let num_difat_sectors =
            read_u32_le(buffer, 0x48).map_err(|e| Error::FileCorrupted(e.to_string()))?;

        let mut header_difat = [FREESECT; HEADER_DIFAT_ENTRIES];
        for (i, slot) in header_difat.iter_mut().enumerate() {
            let offset = 0x4C + i * 4;
            *slot = read_u32_le(buffer, offset).unwrap_or(FREESECT);
        }

        Ok(CfbHeader {
            sector_size,
            mini_stream_cutoff,
            first_dir_sector,
            first_minifat_sector,
            num_minifat_sectors,
            first_difat_sector,
            num_difat_sectors,
            header_difat,
        })
    }
}

/// Translate a sector id to its absolute byte offset within the buffer, or `None`
/// if the sector id is reserved/invalid or the sector would read past the end of
/// the buffer.
///
/// `addr(s) = sectorSize * (s + 1)`, the header occupying sector -1 conceptually.
#[inline]
pub fn sector_offset(sector: u32, sector_size: usize, buffer_len: usize) -> Option<usize> {
    if sector >= MAXREGSECT {
        return None;
    }
    let offset = (sector as u64 + 1) * sector_size as u64;
    let end = offset + sector_size as u64;
    if end > buffer_len as u64 {
        return None;
    }
    Some(offset as usize)
}

/// Borrow the bytes of one sector from `buffer`, or `None` if out of range.
#[inline]
pub fn sector_bytes(buffer: &[u8], sector: u32, sector_size: usize) -> Option<&[u8]> {
    let offset = sector_offset(sector, sector_size, buffer.len())?;
    Some(&buffer[offset..offset + sector_size])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_header(major_version: u16, sector_size: usize) -> Vec<u8> {
        let mut buf = vec![0u8; 3 * sector_size];
        buf[0..8].copy_from_slice(&MAGIC);
        buf[0x1A..0x1C].copy_from_slice(&major_version.to_le_bytes());
        buf[0x1C..0x1E].copy_from_slice(&0xFFFEu16.to_le_bytes());
        let shift: u16 = if sector_size == 512 { 9 } else { 12 };
        buf[0x1E..0x20].copy_from_slice(&shift.to_le_bytes());
        buf
    }

    #[test]
    fn rejects_short_buffer() {
        assert!(matches!(
            CfbHeader::parse(&[0u8; 10]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = minimal_header(3, 512);
        buf[0] ^= 0xFF;
        assert!(matches!(CfbHeader::parse(&buf), Err(Error::WrongFormat)));
    }

    #[test]
    fn accepts_version_3_and_4() {
        let buf3 = minimal_header(3, 512);
        let hdr3 = CfbHeader::parse(&buf3).unwrap();
        assert_eq!(hdr3.sector_size, 512);

        let buf4 = minimal_header(4, 4096);
        let hdr4 = CfbHeader::parse(&buf4).unwrap();
        assert_eq!(hdr4.sector_size, 4096);
    }

    #[test]
    fn sector_offset_rejects_reserved_and_oob() {
        assert_eq!(sector_offset(MAXREGSECT, 512, 1 << 20), None);
        assert_eq!(sector_offset(0, 512, 600), None);
        assert_eq!(sector_offset(0, 512, 1536), Some(512));
    }
}
