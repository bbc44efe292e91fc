//! Legacy binary-trie container reader
//!
//! The container is a flat sequence of trie nodes followed by a record
//! region and a trailer. This module holds the layout knowledge; caching and
//! locking live in `crate::cache` and `crate::database`.
//!
//! ## Architecture
//!
//! - **types**: editions, segment constants, address families
//! - **format**: trailer scanning and metadata extraction
//! - **tree**: bitwise trie descent

pub mod format;
pub mod tree;
pub mod types;

// Re-export key types
pub use format::{read_info_string, DatabaseMetadata};
pub use tree::{search, Descent, NodeSource};
pub use types::{AddressFamily, Edition, RecordShape};
