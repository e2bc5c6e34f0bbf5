//! FAT/Mini-FAT chain walking, directory-tree traversal, and stream
//! materialization: components B and C of the extraction pipeline, combined into
//! a single reader the way the teacher combines them into one `OleFile`.

use super::header::{sector_bytes, CfbHeader};
use crate::common::binary::{decode_utf16le, read_u32_le};
use crate::consts::*;
use crate::error::{Error, Result};
use fixedbitset::FixedBitSet;
use smallvec::SmallVec;
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// On-disk layout of a 128-byte directory entry, read directly via `zerocopy`
/// rather than host-layout struct access, so parsing is independent of host
/// alignment/packing (SPEC_FULL.md §9, "Replacing packed structs").
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    name: [u8; 64],
    name_len: U16<LE>,
    entry_type: u8,
    node_color: u8,
    sid_left: U32<LE>,
    sid_right: U32<LE>,
    sid_child: U32<LE>,
    clsid: [u8; 16],
    state_bits: U32<LE>,
    creation_time: U64<LE>,
    modified_time: U64<LE>,
    start_sector: U32<LE>,
    stream_size: U64<LE>,
}

/// One parsed 128-byte directory entry.
#[derive(Debug, Clone)]
struct DirectoryEntry {
    name: String,
    entry_type: u8,
    sid_left: u32,
    sid_right: u32,
    sid_child: u32,
    start_sector: u32,
    size: u64,
}

/// A reader over a single in-memory CFB container, borrowing the input buffer
/// for its entire lifetime.
///
/// `open` does all the work of §4.A/§4.B/§4.C up front (header validation, FAT and
/// Mini-FAT loading, directory-tree parsing); afterwards the reader holds no heap
/// state beyond the derived tables, and `workbook` is the only other operation
/// most callers need.
#[derive(Debug)]
pub struct CfbReader<'a> {
    buffer: &'a [u8],
    header: CfbHeader,
    fat: Vec<u32>,
    minifat: Vec<u32>,
    dir_entries: Vec<Option<DirectoryEntry>>,
    root_sid: u32,
    ministream: Vec<u8>,
}

impl<'a> CfbReader<'a> {
    /// Open and fully parse a CFB container out of `buffer`.
    ///
    /// Per §6 operation 1, `buffer.len()` must be at least three sector sizes;
    /// that check happens inside [`CfbHeader::parse`] once the sector size is
    /// known from the major version field.
    pub fn open(buffer: &'a [u8]) -> Result<Self> {
        if buffer.is_empty() {
            return Err(Error::InvalidArgument("empty buffer".to_string()));
        }

        let header = CfbHeader::parse(buffer)?;

        let mut reader = CfbReader {
            buffer,
            header,
            fat: Vec::new(),
            minifat: Vec::new(),
            dir_entries: Vec::new(),
            root_sid: 0,
            ministream: Vec::new(),
        };

        reader.load_fat()?;
        reader.load_directory()?;
        if reader.header.num_minifat_sectors > 0 {
            reader.load_minifat()?;
        }

        Ok(reader)
    }

    /// Resolve the N-th FAT sector id (component B's "resolve FAT sector N").
    fn resolve_fat_sector(&self, n: usize) -> Option<u32> {
        if n < HEADER_DIFAT_ENTRIES {
            let s = self.header.header_difat[n];
            return if s == FREESECT || s == ENDOFCHAIN {
                None
            } else {
                Some(s)
            };
        }

        let mut remaining = n - HEADER_DIFAT_ENTRIES;
        let entries_per_difat = self.header.sector_size / 4 - 1;
        let mut difat_sector = self.header.first_difat_sector;

        for _ in 0..self.header.num_difat_sectors {
            if remaining < entries_per_difat {
                let sector_data = sector_bytes(self.buffer, difat_sector, self.header.sector_size)?;
                let offset = remaining * 4;
                let s = read_u32_le(sector_data, offset).ok()?;
                return if s == FREESECT || s == ENDOFCHAIN {
                    None
                } else {
                    Some(s)
                };
            }
            remaining -= entries_per_difat;

            let sector_data = sector_bytes(self.buffer, difat_sector, self.header.sector_size)?;
            let next_offset = entries_per_difat * 4;
            difat_sector = read_u32_le(sector_data, next_offset).ok()?;
            if difat_sector == ENDOFCHAIN || difat_sector == FREESECT {
                return None;
            }
        }

        None
    }

    /// Load the full FAT by walking every FAT sector (inline DIFAT prefix, then
    /// the DIFAT sector chain).
    fn load_fat(&mut self) -> Result<()> {
        let mut n = 0usize;

        loop {
            let Some(fat_sector) = self.resolve_fat_sector(n) else {
                break;
            };
            let Some(sector_data) = sector_bytes(self.buffer, fat_sector, self.header.sector_size)
            else {
                break;
            };

            for chunk in sector_data.chunks_exact(4) {
                let entry = read_u32_le(chunk, 0).unwrap_or(FREESECT);
                self.fat.push(entry);
            }
            n += 1;
        }

        Ok(())
    }

    /// Walk a regular sector chain starting at `start`, returning its bytes with
    /// no length truncation applied. Stops silently (best-effort, per §7) on a
    /// sentinel, an out-of-range index, or a failed address lookup.
    fn read_chain(&self, start: u32) -> Vec<u8> {
        let mut data = Vec::new();
        let mut sector = start;
        let mut visited = FixedBitSet::with_capacity(self.fat.len().max(1));

        while sector < MAXREGSECT {
            let idx = sector as usize;
            if idx >= self.fat.len() || visited.contains(idx) {
                break;
            }
            visited.insert(idx);

            let Some(bytes) = sector_bytes(self.buffer, sector, self.header.sector_size) else {
                break;
            };
            data.extend_from_slice(bytes);

            sector = self.fat[idx];
        }

        data
    }

    /// Load the Mini-FAT table (it is itself stored as a regular stream).
    fn load_minifat(&mut self) -> Result<()> {
        let minifat_data = self.read_chain(self.header.first_minifat_sector);
        self.minifat = minifat_data
            .chunks_exact(4)
            .map(|c| read_u32_le(c, 0).unwrap_or(FREESECT))
            .collect();

        // The mini-stream is the root entry's data, itself chained through the
        // regular FAT.
        if let Some(root) = self.dir_entries.get(self.root_sid as usize).and_then(|e| e.as_ref()) {
            self.ministream = self.read_chain(root.start_sector);
        }

        Ok(())
    }

    /// Walk a mini-sector chain starting at `start`, truncated to `size` bytes.
    fn read_mini_chain(&self, start: u32, size: u64) -> Vec<u8> {
        let mut data = Vec::with_capacity(size as usize);
        let mut sector = start;
        let mut visited = FixedBitSet::with_capacity(self.minifat.len().max(1));

        while sector < MAXREGSECT {
            let idx = sector as usize;
            if idx >= self.minifat.len() || visited.contains(idx) {
                break;
            }
            visited.insert(idx);

            let offset = idx * MINI_SECTOR_SIZE;
            if offset + MINI_SECTOR_SIZE > self.ministream.len() {
                break;
            }
            data.extend_from_slice(&self.ministream[offset..offset + MINI_SECTOR_SIZE]);

            sector = self.minifat[idx];
        }

        data.truncate(size as usize);
        data
    }

    /// Parse every directory entry out of the directory stream and locate the
    /// root entry's storage id (always the entry at index 0).
    fn load_directory(&mut self) -> Result<()> {
        let dir_data = self.read_chain(self.header.first_dir_sector);
        let count = dir_data.len() / DIRENTRY_SIZE;
        self.dir_entries = vec![None; count];

        for sid in 0..count {
            let offset = sid * DIRENTRY_SIZE;
            let raw = &dir_data[offset..offset + DIRENTRY_SIZE];
            if let Some(entry) = parse_directory_entry(raw) {
                self.dir_entries[sid] = Some(entry);
            }
        }

        self.root_sid = 0;
        Ok(())
    }

    /// Locate the `Workbook`/`WORKBOOK` stream entry by a full iterative DFS over
    /// the directory's red-black tree, starting at the root's child.
    ///
    /// Per SPEC_FULL.md §4.C / §9 this implements the full-DFS option the
    /// original's stack-free left-then-right shortcut only approximates; costs
    /// nothing extra since the format guarantees at most one matching stream.
    fn find_workbook_sid(&self) -> Option<u32> {
        let root = self.dir_entries.get(self.root_sid as usize)?.as_ref()?;
        let mut stack: SmallVec<[u32; 32]> = SmallVec::new();
        stack.push(root.sid_child);
        let mut visited = FixedBitSet::with_capacity(self.dir_entries.len().max(1));

        while let Some(sid) = stack.pop() {
            if sid == NOSTREAM {
                continue;
            }
            let idx = sid as usize;
            if idx >= self.dir_entries.len() || visited.contains(idx) {
                continue;
            }
            visited.insert(idx);

            let Some(entry) = self.dir_entries[idx].as_ref() else {
                continue;
            };

            if entry.entry_type == STGTY_STREAM
                && (entry.name == "Workbook" || entry.name == "WORKBOOK")
            {
                return Some(sid);
            }

            if entry.sid_right != NOSTREAM {
                stack.push(entry.sid_right);
            }
            if entry.sid_left != NOSTREAM {
                stack.push(entry.sid_left);
            }
            if entry.sid_child != NOSTREAM {
                stack.push(entry.sid_child);
            }
        }

        None
    }

    /// Materialize the `Workbook` stream's contents into an owned buffer
    /// (§6 operation 3).
    pub fn workbook(&self) -> Result<Vec<u8>> {
        let sid = self.find_workbook_sid().ok_or(Error::NoWorkbook)?;
        let entry = self.dir_entries[sid as usize]
            .as_ref()
            .ok_or(Error::NoWorkbook)?;

        let mut data = if (entry.size as u32) < self.header.mini_stream_cutoff {
            self.read_mini_chain(entry.start_sector, entry.size)
        } else {
            self.read_chain(entry.start_sector)
        };
        data.truncate(entry.size as usize);
        Ok(data)
    }
}

/// Parse one 128-byte directory entry. Returns `None` for an empty/unused slot.
fn parse_directory_entry(raw: &[u8]) -> Option<DirectoryEntry> {
    let entry = RawDirectoryEntry::read_from_bytes(raw).ok()?;
    if entry.entry_type == STGTY_EMPTY {
        return None;
    }

    let name_len = entry.name_len.get() as usize;
    let name_bytes = &entry.name[0..name_len.saturating_sub(2).min(64)];
    let name = decode_utf16le(name_bytes);

    Some(DirectoryEntry {
        name,
        entry_type: entry.entry_type,
        sid_left: entry.sid_left.get(),
        sid_right: entry.sid_right.get(),
        sid_child: entry.sid_child.get(),
        start_sector: entry.start_sector.get(),
        size: entry.stream_size.get(),
    })
}
