//! Random-access byte reading over database backing stores
//!
//! Every component that touches raw container bytes goes through
//! [`ByteReader`], which is implemented for anything that is `Read + Seek`:
//! an open [`File`] in the disk-backed cache modes, or an in-memory
//! [`Cursor`](std::io::Cursor) when the scanner runs over a loaded buffer.
//!
//! [`load_container`] reads a whole container into memory for the
//! full-memory cache mode, with automatic gzip decompression based on the
//! file extension.
//!
//! # Example
//!
//! ```rust
//! use geodat::file_reader::ByteReader;
//! use std::io::Cursor;
//!
//! let mut reader = Cursor::new(vec![1u8, 2, 3, 4, 5]);
//! let mut buf = [0u8; 2];
//! reader.read_exact_at(3, &mut buf)?;
//! assert_eq!(buf, [4, 5]);
//! assert_eq!(reader.size()?, 5);
//! # Ok::<(), std::io::Error>(())
//! ```

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Positioned reads over a backing resource
///
/// Reads move the underlying cursor, so a shared reader must be used under
/// the owner's lock.
pub trait ByteReader {
    /// Total size of the resource in bytes
    fn size(&mut self) -> io::Result<u64>;

    /// Read up to `buf.len()` bytes starting at `offset`, returning the count
    ///
    /// Only returns fewer bytes than requested at end of resource.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Fill `buf` completely from `offset`, failing with `UnexpectedEof` on a short read
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let n = self.read_at(offset, buf)?;
        if n < buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("wanted {} bytes at offset {}, got {}", buf.len(), offset, n),
            ));
        }
        Ok(())
    }
}

impl<R: Read + Seek> ByteReader for R {
    fn size(&mut self) -> io::Result<u64> {
        self.seek(SeekFrom::End(0))
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

/// Check whether a path names a gzip-compressed container
///
/// Files ending in `.gz` (case-insensitive) are treated as compressed.
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Read an entire container into memory
///
/// Gzip containers are decompressed on the fly. The file handle is dropped
/// before returning.
///
/// # Errors
///
/// Returns an error if:
/// - The file doesn't exist
/// - Permission denied
/// - Invalid gzip data (for .gz files)
pub fn load_container<P: AsRef<Path>>(path: P) -> io::Result<Vec<u8>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut data = Vec::new();

    if is_gzip_path(path) {
        GzDecoder::new(file).read_to_end(&mut data)?;
    } else {
        let len = file.metadata()?.len() as usize;
        data.reserve_exact(len);
        file.read_to_end(&mut data)?;
    }

    Ok(data)
}
