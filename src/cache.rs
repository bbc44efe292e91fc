//! Cache strategies
//!
//! Three ways of holding an open container, trading memory for I/O:
//!
//! - **Disk**: every node and record read goes to the file
//! - **Memory**: the whole container is loaded once
//! - **Index**: the trie region is loaded, records are read from the file
//!
//! All three answer the same queries with identical results.

use crate::dat::format::{read_info_string, DatabaseMetadata};
use crate::dat::tree::{decode_node, NodeSource};
use crate::error::{GeoIpError, Result};
use crate::file_reader::ByteReader;
use serde::Serialize;
use std::borrow::Cow;
use std::fs::File;
use std::io::Cursor;

/// Which cache strategy to use when opening a database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Read nodes and records from the file on every lookup
    #[default]
    Disk,
    /// Load the entire container into memory
    Memory,
    /// Load the trie region only
    Index,
}

impl std::fmt::Display for CacheMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CacheMode::Disk => "disk",
            CacheMode::Memory => "memory",
            CacheMode::Index => "index",
        })
    }
}

/// Backing storage for an open container
enum Storage {
    Disk(File),
    Memory(Vec<u8>),
    Index { file: File, index: Vec<u8> },
}

/// An open container behind one of the cache strategies
///
/// Disk reads move the file cursor, so a strategy is used through `&mut`
/// under the owning database's lock.
pub struct CacheStrategy {
    storage: Storage,
    width: usize,
    size: u64,
}

impl CacheStrategy {
    /// Read everything from `file` on demand
    pub fn disk(file: File, metadata: &DatabaseMetadata) -> Self {
        Self {
            storage: Storage::Disk(file),
            width: metadata.node_record_width as usize,
            size: metadata.source_size,
        }
    }

    /// Serve everything from an in-memory copy of the container
    pub fn memory(buffer: Vec<u8>, metadata: &DatabaseMetadata) -> Self {
        Self {
            size: buffer.len() as u64,
            storage: Storage::Memory(buffer),
            width: metadata.node_record_width as usize,
        }
    }

    /// Preload the trie region from `file`; records stay on disk
    ///
    /// The preload covers the first `segment_start * 2w` bytes, clamped to
    /// the file size.
    pub fn index(mut file: File, metadata: &DatabaseMetadata) -> Result<Self> {
        let len = metadata.trie_len().min(metadata.source_size) as usize;
        let mut index = vec![0u8; len];
        file.read_exact_at(0, &mut index)
            .map_err(|e| GeoIpError::from_read(e, "trie index"))?;
        log::debug!("Loaded {} byte trie index", len);

        Ok(Self {
            storage: Storage::Index { file, index },
            width: metadata.node_record_width as usize,
            size: metadata.source_size,
        })
    }

    /// The strategy in use
    pub fn mode(&self) -> CacheMode {
        match self.storage {
            Storage::Disk(_) => CacheMode::Disk,
            Storage::Memory(_) => CacheMode::Memory,
            Storage::Index { .. } => CacheMode::Index,
        }
    }

    /// Bytes held in memory by this strategy
    pub fn resident_bytes(&self) -> usize {
        match &self.storage {
            Storage::Disk(_) => 0,
            Storage::Memory(buf) => buf.len(),
            Storage::Index { index, .. } => index.len(),
        }
    }

    /// Read up to `max_len` bytes of the record region starting at `offset`
    ///
    /// The window is clamped at end of data; callers detect truncated records
    /// while decoding.
    pub fn read_window(&mut self, offset: u64, max_len: usize) -> Result<Cow<'_, [u8]>> {
        if offset >= self.size {
            return Err(GeoIpError::corrupt(format!(
                "record offset {} beyond end of {} byte container",
                offset, self.size
            )));
        }

        match &mut self.storage {
            Storage::Memory(buf) => {
                let start = offset as usize;
                let end = buf.len().min(start.saturating_add(max_len));
                Ok(Cow::Borrowed(&buf[start..end]))
            }
            Storage::Disk(file) | Storage::Index { file, .. } => {
                let mut window = vec![0u8; max_len];
                let n = file.read_at(offset, &mut window)?;
                window.truncate(n);
                Ok(Cow::Owned(window))
            }
        }
    }

    /// Read the info string through whichever backing store is held
    pub fn info_string(&mut self) -> Result<String> {
        match &mut self.storage {
            Storage::Memory(buf) => read_info_string(&mut Cursor::new(buf.as_slice())),
            Storage::Disk(file) | Storage::Index { file, .. } => read_info_string(file),
        }
    }
}

impl NodeSource for CacheStrategy {
    fn read_node(&mut self, offset: u32) -> Result<(u32, u32)> {
        let node_bytes = 2 * self.width;
        let start = offset as u64 * node_bytes as u64;

        let slice = match &mut self.storage {
            Storage::Memory(buf) => buf.as_slice(),
            Storage::Index { index, .. } => index.as_slice(),
            Storage::Disk(file) => {
                let mut node = [0u8; 8];
                file.read_exact_at(start, &mut node[..node_bytes])
                    .map_err(|e| GeoIpError::from_read(e, &format!("node {}", offset)))?;
                return Ok(decode_node(&node, self.width));
            }
        };

        let node = usize::try_from(start)
            .ok()
            .and_then(|s| slice.get(s..s + node_bytes))
            .ok_or_else(|| {
                GeoIpError::corrupt(format!(
                    "node {} outside {} byte trie data",
                    offset,
                    slice.len()
                ))
            })?;
        Ok(decode_node(node, self.width))
    }
}
