//! geodat - Lookup engine for legacy binary-trie GeoIP databases
//!
//! Reads the `.dat` containers used by the first generation of GeoIP
//! databases (country, region, city, organization, ISP, domain, AS number,
//! proxy and netspeed editions, IPv4 and IPv6) and answers address lookups
//! against them.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use geodat::{CacheMode, GeoIpDatabase, OpenOptions, Record};
//!
//! let db = GeoIpDatabase::open("GeoLiteCity.dat", OpenOptions::new().cache(CacheMode::Index))?;
//!
//! if let Some(Record::Location(loc)) = db.lookup("8.8.8.8".parse()?)? {
//!     println!("{:?}, {} ({}, {})", loc.city, loc.country.name, loc.latitude, loc.longitude);
//! }
//! println!("prefix length: {:?}", db.last_netmask());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Container layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  1. Trie nodes (2 pointers each)     │
//! │  2. Record region (strings, coords)  │
//! │  3. Info string (000 ... )           │
//! │  4. Structure marker (FFFFFF)        │
//! │  5. Edition byte [+ segment start]   │
//! └──────────────────────────────────────┘
//! ```
//!
//! Nothing is stored at the front of the file; the trailer is found by
//! scanning backward from the end.
//!
//! # Cache strategies
//!
//! - [`CacheMode::Disk`]: every read goes to the file
//! - [`CacheMode::Index`]: trie nodes in memory, records from the file
//! - [`CacheMode::Memory`]: the whole container in memory
//!
//! All three return identical results. With
//! [`OpenOptions::check_freshness`] the file's modification time is checked
//! before every operation and the database reloads itself when the file is
//! replaced.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Cache strategies over an open container
pub mod cache;
/// Built-in country catalogue
pub mod country;
/// Container layout: editions, trailer scanning, trie descent
pub mod dat;
/// Lookup facade
pub mod database;
/// Error types
pub mod error;
pub mod file_reader;
/// Container info string
pub mod info;
pub mod options;
/// Record types and decoding
pub mod record;

// Re-exports for Rust consumers

/// Main database handle
pub use crate::database::{GeoIpDatabase, Lookup};

pub use crate::cache::CacheMode;
pub use crate::country::{Country, CountryTable};
pub use crate::dat::{AddressFamily, DatabaseMetadata, Edition};
pub use crate::error::{GeoIpError, Result};
pub use crate::info::ContainerInfo;
pub use crate::options::OpenOptions;
pub use crate::record::{Location, NetSpeed, Record, Region};

// Version information
/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
