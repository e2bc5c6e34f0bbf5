//! Image signature scanning and delimiting: component E of the extraction
//! pipeline.

mod scan;

pub use scan::scan_images;

/// Raster format of an extracted image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// One extracted image, with an owned copy of its bytes.
///
/// Mirrors the ownership shape of the original `XLS2IMG_IMAGE`: the caller owns
/// `data` once an [`Image`] is returned from [`crate::extract_images`].
#[derive(Debug, Clone)]
pub struct Image {
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

impl Image {
    /// Byte length of the payload, mirroring the original `XLS2IMG_IMAGE::size`
    /// field (`data.len()` here, since ownership already makes the length
    /// self-describing).
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
