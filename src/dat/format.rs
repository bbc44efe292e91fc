//! Legacy container trailer parsing
//!
//! The container carries no header. Everything the reader needs is found by
//! scanning backward from the end of the file:
//!
//! ```text
//! ┌───────────────┬────────────────┬─────┬──────┬────────┬─────────┬─────────────┐
//! │ trie nodes    │ record region  │ 000 │ info │ FFFFFF │ edition │ [segment]   │
//! │ seg * 2w bytes│ (variable)     │     │      │        │ 1 byte  │ 3 bytes LE  │
//! └───────────────┴────────────────┴─────┴──────┴────────┴─────────┴─────────────┘
//! ```
//!
//! Containers written before September 2002 have no structure marker and are
//! read with the fixed country layout.

use super::types::{
    Edition, RecordShape, COUNTRY_BEGIN, DATABASE_INFO_MAX_SIZE, INFO_DELIMITER,
    SEGMENT_RECORD_LENGTH, STATE_BEGIN_REV0, STATE_BEGIN_REV1, STRUCTURE_INFO_MAX_SIZE,
    STRUCTURE_MARKER,
};
use crate::error::{GeoIpError, Result};
use crate::file_reader::ByteReader;
use serde::Serialize;

/// Layout information computed once per open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatabaseMetadata {
    /// Database edition
    pub edition: Edition,
    /// Boundary between the trie region and the record region
    ///
    /// Every supported edition has exactly one segment.
    pub segment_start: u32,
    /// Bytes per trie pointer slot (3 or 4)
    pub node_record_width: u8,
    /// Size of the container in bytes
    pub source_size: u64,
    /// Offset of the structure marker, `None` for pre-marker containers
    pub marker_offset: Option<u64>,
}

impl DatabaseMetadata {
    /// Bytes occupied by one trie node
    pub fn node_bytes(&self) -> usize {
        2 * self.node_record_width as usize
    }

    /// Byte length of the trie region as declared by the segment start
    pub fn trie_len(&self) -> u64 {
        self.segment_start as u64 * self.node_bytes() as u64
    }

    /// Byte offset of the record addressed by a terminal pointer
    pub fn record_offset(&self, terminal: u32) -> u64 {
        terminal as u64 + (self.node_bytes() as u64 - 1) * self.segment_start as u64
    }

    /// Parse container metadata by scanning the trailer
    ///
    /// `country_count` is the size of the country table in use; it bounds the
    /// terminal values accepted when falling back to the pre-marker layout.
    pub fn scan<R: ByteReader + ?Sized>(reader: &mut R, country_count: usize) -> Result<Self> {
        let source_size = reader.size()?;
        let marker_offset = find_structure_marker(reader, source_size)?;

        let metadata = match marker_offset {
            Some(marker) => {
                let mut edition_byte = [0u8; 1];
                reader
                    .read_exact_at(marker + 3, &mut edition_byte)
                    .map_err(|e| GeoIpError::from_read(e, "edition byte"))?;
                let edition = Edition::from_raw(edition_byte[0]).ok_or_else(|| {
                    GeoIpError::corrupt(format!("unknown edition code {}", edition_byte[0]))
                })?;

                let segment_start = match edition.shape() {
                    RecordShape::Region if edition == Edition::RegionRev0 => STATE_BEGIN_REV0,
                    RecordShape::Region => STATE_BEGIN_REV1,
                    RecordShape::Country | RecordShape::Id | RecordShape::Speed => COUNTRY_BEGIN,
                    RecordShape::City | RecordShape::Label => {
                        let mut buf = [0u8; SEGMENT_RECORD_LENGTH];
                        reader
                            .read_exact_at(marker + 4, &mut buf)
                            .map_err(|e| GeoIpError::from_read(e, "segment start"))?;
                        read_pointer(&buf)
                    }
                };

                DatabaseMetadata {
                    edition,
                    segment_start,
                    node_record_width: edition.node_record_width(),
                    source_size,
                    marker_offset,
                }
            }
            None => DatabaseMetadata {
                edition: Edition::Country,
                segment_start: COUNTRY_BEGIN,
                node_record_width: Edition::Country.node_record_width(),
                source_size,
                marker_offset,
            },
        };

        metadata.check_root(reader, country_count)?;
        Ok(metadata)
    }

    /// Verify the root node is readable and consistent with the layout
    fn check_root<R: ByteReader + ?Sized>(&self, reader: &mut R, country_count: usize) -> Result<()> {
        if self.segment_start == 0 {
            return Err(GeoIpError::corrupt("segment start is zero"));
        }

        let node_bytes = self.node_bytes();
        if self.source_size < node_bytes as u64 {
            return Err(GeoIpError::corrupt(format!(
                "{} byte container cannot hold a {} byte root node",
                self.source_size, node_bytes
            )));
        }

        let mut buf = [0u8; 2 * super::types::MAX_RECORD_LENGTH];
        reader
            .read_exact_at(0, &mut buf[..node_bytes])
            .map_err(|e| GeoIpError::from_read(e, "root node"))?;
        let width = self.node_record_width as usize;

        for slot in [&buf[..width], &buf[width..node_bytes]] {
            let pointer = read_pointer(slot);
            if pointer < self.segment_start {
                let end = (pointer as u64 + 1) * node_bytes as u64;
                if end > self.source_size {
                    return Err(GeoIpError::corrupt(format!(
                        "root points at node {} beyond end of {} byte container",
                        pointer, self.source_size
                    )));
                }
            } else if self.marker_offset.is_none()
                && (pointer - self.segment_start) as usize >= country_count
            {
                return Err(GeoIpError::corrupt(format!(
                    "no structure marker and root value {} is not a country index",
                    pointer
                )));
            }
        }

        Ok(())
    }
}

/// Reconstruct a little-endian pointer from a slot of 2 to 4 bytes
#[inline]
pub fn read_pointer(slot: &[u8]) -> u32 {
    slot.iter()
        .enumerate()
        .fold(0u32, |acc, (j, &b)| acc | ((b as u32) << (j * 8)))
}

/// Locate the structure marker within the bounded trailer window
///
/// Candidate slots start three bytes before end of file and step back one
/// byte per miss.
pub fn find_structure_marker<R: ByteReader + ?Sized>(
    reader: &mut R,
    size: u64,
) -> Result<Option<u64>> {
    let Some(mut pos) = size.checked_sub(3) else {
        return Ok(None);
    };

    let mut delim = [0u8; 3];
    for _ in 0..STRUCTURE_INFO_MAX_SIZE {
        reader
            .read_exact_at(pos, &mut delim)
            .map_err(|e| GeoIpError::from_read(e, "structure marker"))?;
        if delim == STRUCTURE_MARKER {
            return Ok(Some(pos));
        }
        if pos == 0 {
            break;
        }
        pos -= 1;
    }

    Ok(None)
}

/// Read the info string stored ahead of the structure marker
///
/// Returns an empty string when no delimiter is found within the bounded
/// window; that is not an error.
pub fn read_info_string<R: ByteReader + ?Sized>(reader: &mut R) -> Result<String> {
    let size = reader.size()?;
    let start = match find_structure_marker(reader, size)? {
        Some(marker) => marker.checked_sub(3),
        None => size.checked_sub(3),
    };
    let Some(mut pos) = start else {
        return Ok(String::new());
    };

    let mut delim = [0u8; 3];
    for len in 0..DATABASE_INFO_MAX_SIZE {
        reader
            .read_exact_at(pos, &mut delim)
            .map_err(|e| GeoIpError::from_read(e, "info delimiter"))?;
        if delim == INFO_DELIMITER {
            let mut info = vec![0u8; len];
            reader
                .read_exact_at(pos + 3, &mut info)
                .map_err(|e| GeoIpError::from_read(e, "info string"))?;
            return Ok(latin1(&info));
        }
        if pos == 0 {
            break;
        }
        pos -= 1;
    }

    Ok(String::new())
}

/// Decode ISO-8859-1 bytes
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
