//! Open options
//!
//! Builder for how a database is opened: cache strategy, freshness checking
//! and the country table used for decoding.

use crate::cache::CacheMode;
use crate::country::CountryTable;

/// Options controlling how a database is opened
///
/// # Example
///
/// ```
/// use geodat::{CacheMode, OpenOptions};
///
/// let opts = OpenOptions::new()
///     .cache(CacheMode::Index)
///     .check_freshness(true);
/// assert_eq!(opts.cache_mode(), CacheMode::Index);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenOptions {
    cache: CacheMode,
    check_freshness: bool,
    countries: CountryTable,
}

impl OpenOptions {
    /// No caching bits set
    pub const STANDARD: u32 = 0;
    /// Load the whole container into memory
    pub const MEMORY_CACHE: u32 = 1;
    /// Reload when the file's modification time changes
    pub const CHECK_CACHE: u32 = 2;
    /// Load the trie region into memory
    pub const INDEX_CACHE: u32 = 4;

    /// Disk cache, no freshness check, built-in country table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a legacy bit-flag word
    ///
    /// Memory caching wins when both cache bits are set.
    pub fn from_flags(flags: u32) -> Self {
        let memory = flags & Self::MEMORY_CACHE != 0;
        let index = flags & Self::INDEX_CACHE != 0;
        if memory && index {
            log::warn!("Both memory and index caching requested, using memory cache");
        }

        let cache = if memory {
            CacheMode::Memory
        } else if index {
            CacheMode::Index
        } else {
            CacheMode::Disk
        };

        Self {
            cache,
            check_freshness: flags & Self::CHECK_CACHE != 0,
            countries: CountryTable::BUILTIN,
        }
    }

    /// Select the cache strategy
    pub fn cache(mut self, mode: CacheMode) -> Self {
        self.cache = mode;
        self
    }

    /// Enable or disable modification-time checks before each operation
    pub fn check_freshness(mut self, enabled: bool) -> Self {
        self.check_freshness = enabled;
        self
    }

    /// Decode with a custom country table
    pub fn country_table(mut self, table: CountryTable) -> Self {
        self.countries = table;
        self
    }

    /// Selected cache strategy
    pub fn cache_mode(&self) -> CacheMode {
        self.cache
    }

    /// Whether freshness checks are enabled
    pub fn checks_freshness(&self) -> bool {
        self.check_freshness
    }

    /// Country table used for decoding
    pub fn countries(&self) -> &CountryTable {
        &self.countries
    }
}
