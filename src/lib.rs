//! `xls2img` — extract embedded PNG/JPEG images from legacy BIFF8 Excel
//! workbooks stored in an OLE2/Compound File Binary container.
//!
//! The crate is a pure in-memory library: give it a byte buffer holding a CFB
//! file, get back the list of images embedded in its `MsoDrawingGroup` blob.
//! There is no file I/O, no CLI, and no decoding of image content — images are
//! located and delimited by their own file-format framing (PNG chunk walk,
//! JPEG end-of-image back-scan) and handed back as opaque owned byte buffers.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), xls2img::Error> {
//! let buffer = std::fs::read("workbook.xls").unwrap();
//! let reader = xls2img::CfbReader::open(&buffer)?;
//! let workbook = reader.workbook()?;
//! let images = xls2img::extract_images(&workbook)?;
//! for image in &images {
//!     println!("{:?}: {} bytes", image.format, image.size());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Pipeline
//!
//! | Stage | Module | Responsibility |
//! |-------|--------|-----------------|
//! | A/B/C | [`cfb`] | Validate the CFB header, walk the FAT/Mini-FAT, materialize the `Workbook` stream |
//! | D | [`biff`] | Iterate BIFF8 records, reassemble the `MsoDrawingGroup`/`Continue` chain |
//! | E | [`images`] | Carve PNG/JPEG payloads out of the reassembled blob |
//! | F | this module, [`error`] | Public API and error mapping |

pub mod biff;
pub mod cfb;
pub mod common;
pub mod consts;
pub mod error;
pub mod images;

pub use cfb::CfbReader;
pub use error::{Error, Result};
pub use images::{Image, ImageFormat};

/// Extract every PNG/JPEG payload embedded in a `Workbook` stream's
/// `MsoDrawingGroup` drawing container (§6 operation 5).
///
/// `workbook` is the byte buffer returned by [`CfbReader::workbook`]. Runs
/// components D and E: reassembles every `MsoDrawingGroup` chain found in the
/// record stream, then scans each reassembled blob for image signatures.
///
/// Returns [`Error::NoImages`] if the scan completes without emitting any
/// images — including the (valid) case where the workbook has no
/// `MsoDrawingGroup` record at all.
pub fn extract_images(workbook: &[u8]) -> Result<Vec<Image>> {
    if workbook.is_empty() {
        return Err(Error::InvalidArgument("empty workbook buffer".to_string()));
    }

    let mut images = Vec::new();
    for blob in biff::drawing_group_blobs(workbook) {
        images.extend(images::scan_images(&blob));
    }

    if images.is_empty() {
        Err(Error::NoImages)
    } else {
        Ok(images)
    }
}

/// Convenience wrapper combining §6 operations 1, 3, and 5: open a CFB buffer,
/// materialize its `Workbook` stream, and extract every embedded image.
///
/// Most callers only need this entry point; [`CfbReader`] and
/// [`extract_images`] remain available separately for callers that want the
/// raw workbook bytes (e.g. to run their own BIFF8 analysis alongside image
/// extraction).
pub fn extract_images_from_cfb(buffer: &[u8]) -> Result<Vec<Image>> {
    let reader = CfbReader::open(buffer)?;
    let workbook = reader.workbook()?;
    extract_images(&workbook)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn biff_record(record_type: u16, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&record_type.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn png_chunk(chunk_type: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(chunk_type);
        out.extend_from_slice(payload);
        out.extend_from_slice(&0u32.to_be_bytes());
        out
    }

    fn sample_png() -> Vec<u8> {
        let mut out = consts::PNG_SIGNATURE.to_vec();
        out.extend(png_chunk(b"IHDR", &[0u8; 13]));
        out.extend(png_chunk(b"IEND", &[]));
        out
    }

    #[test]
    fn extract_images_rejects_empty_workbook() {
        assert!(matches!(
            extract_images(&[]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn extract_images_reports_no_images_without_drawing_group() {
        let workbook = biff_record(consts::BIFF_EOF, &[]);
        assert!(matches!(extract_images(&workbook), Err(Error::NoImages)));
    }

    #[test]
    fn extract_images_finds_png_inside_drawing_group() {
        let mut drawing = vec![0u8; 8];
        drawing.extend(sample_png());

        let mut workbook = biff_record(consts::BIFF_MSO_DRAWING_GROUP, &drawing);
        workbook.extend(biff_record(consts::BIFF_EOF, &[]));

        let images = extract_images(&workbook).expect("should find an image");
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].format, ImageFormat::Png);
    }
}
