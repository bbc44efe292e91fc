//! Trie descent
//!
//! Implements the bitwise descent that turns an address into a terminal
//! pointer. Each node holds two pointers (left for a 0 bit, right for a 1
//! bit) that are either:
//! - below the segment start: the index of the next node
//! - at or above the segment start: a terminal value ending the descent
//!
//! Bits are consumed most-significant-byte first and most-significant-bit
//! first within each byte. A well-formed trie always terminates within the
//! address width; running out of bits is a corrupt container.

use super::format::{read_pointer, DatabaseMetadata};
use super::types::AddressFamily;
use crate::error::{GeoIpError, Result};

/// Anything that can produce the two pointers of a trie node
pub trait NodeSource {
    /// Read the `(left, right)` pointers of the node at `offset`
    fn read_node(&mut self, offset: u32) -> Result<(u32, u32)>;
}

/// Split a raw node into its two little-endian pointers
#[inline]
pub fn decode_node(node: &[u8], width: usize) -> (u32, u32) {
    (
        read_pointer(&node[..width]),
        read_pointer(&node[width..2 * width]),
    )
}

/// Result of a completed descent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descent {
    /// Terminal pointer value (at or above the segment start)
    pub terminal: u32,
    /// Number of address bits consumed to reach it
    pub netmask: u8,
}

/// Descend the trie for a normalized address key
///
/// `key` holds the address bytes from byte 0: four bytes for IPv4, sixteen
/// for IPv6 (see [`AddressFamily::normalize`]).
pub fn search<S: NodeSource + ?Sized>(
    source: &mut S,
    metadata: &DatabaseMetadata,
    key: &[u8; 16],
    family: AddressFamily,
) -> Result<Descent> {
    let bit_width = family.bit_width() as u32;
    let mut offset = 0u32;

    for depth in (0..bit_width).rev() {
        let (left, right) = source.read_node(offset)?;

        let consumed = bit_width - 1 - depth;
        let mask = 1u8 << ((consumed & 7) ^ 7);
        let chosen = if key[(consumed >> 3) as usize] & mask != 0 {
            right
        } else {
            left
        };

        if chosen >= metadata.segment_start {
            let descent = Descent {
                terminal: chosen,
                netmask: (bit_width - depth) as u8,
            };
            log::trace!(
                "descent ended at depth {} with terminal {}",
                descent.netmask,
                descent.terminal
            );
            return Ok(descent);
        }
        offset = chosen;
    }

    Err(GeoIpError::corrupt(format!(
        "trie did not terminate within {} bits (last node {})",
        bit_width, offset
    )))
}
