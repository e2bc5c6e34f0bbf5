//! Constants shared across the CFB, BIFF8, and image-carving stages.

/// Magic bytes at the start of every compound file.
pub const MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Sector size for major version 3 containers.
pub const SECTOR_SIZE_V3: usize = 512;
/// Sector size for major version 4 containers.
pub const SECTOR_SIZE_V4: usize = 4096;
/// Mini-sector size, fixed regardless of container version.
pub const MINI_SECTOR_SIZE: usize = 64;
/// Size of one packed directory entry.
pub const DIRENTRY_SIZE: usize = 128;
/// Number of DIFAT entries stored inline in the header.
pub const HEADER_DIFAT_ENTRIES: usize = 109;

// Sector chain sentinels (AAF / [MS-CFB] specification).
/// Maximum regular sector id; anything at or above this is reserved/invalid.
pub const MAXREGSECT: u32 = 0xFFFFFFFA;
/// Marks a DIFAT sector in the FAT.
pub const DIFSECT: u32 = 0xFFFFFFFC;
/// Marks a FAT sector in the FAT.
pub const FATSECT: u32 = 0xFFFFFFFD;
/// End of a sector chain.
pub const ENDOFCHAIN: u32 = 0xFFFFFFFE;
/// Unallocated sector.
pub const FREESECT: u32 = 0xFFFFFFFF;

/// No child/sibling directory entry.
pub const NOSTREAM: u32 = 0xFFFFFFFF;

/// Directory entry is an unused slot.
pub const STGTY_EMPTY: u8 = 0;
/// Directory entry is a storage (folder-like) object.
pub const STGTY_STORAGE: u8 = 1;
/// Directory entry is a stream.
pub const STGTY_STREAM: u8 = 2;
/// Directory entry is the root storage.
pub const STGTY_ROOT: u8 = 5;

/// BIFF8 record type carrying Office Art drawing-group data.
pub const BIFF_MSO_DRAWING_GROUP: u16 = 0x00EB;
/// BIFF8 record type that extends an oversized preceding record.
pub const BIFF_CONTINUE: u16 = 0x003C;
/// BIFF8 end-of-substream marker.
pub const BIFF_EOF: u16 = 0x000A;

/// Initial capacity of the emitted image list, before it is shrunk to fit.
pub const IMAGE_LIST_INITIAL_CAPACITY: usize = 16;

/// PNG signature (first 8 bytes of every PNG file).
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// Chunk type that terminates a PNG stream.
pub const PNG_IEND: [u8; 4] = *b"IEND";
/// JPEG start-of-image marker.
pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
/// JPEG end-of-image marker.
pub const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];
/// JPEG APP0 marker (carries the JFIF identifier).
pub const JPEG_APP0: u8 = 0xE0;
/// JPEG APP1 marker (carries the Exif identifier).
pub const JPEG_APP1: u8 = 0xE1;
