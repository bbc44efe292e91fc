/// Error types for the geodat library
use crate::dat::Edition;
use std::fmt;
use std::io;

/// Result type alias for geodat operations
pub type Result<T> = std::result::Result<T, GeoIpError>;

/// Main error type for database operations
///
/// Per-lookup "no data" outcomes are never errors; they come back as
/// `Ok(None)` or as the unknown country. Everything here is fatal for the
/// call that raised it.
#[derive(Debug)]
pub enum GeoIpError {
    /// Underlying read, seek or stat failure
    Io(io::Error),

    /// Malformed trailer, unterminated trie descent or truncated record
    CorruptContainer(String),

    /// Lookup attempted on a closed database
    NotOpen,

    /// Injected country tables are not index-aligned
    CountryTableMismatch {
        /// Number of country codes supplied
        codes: usize,
        /// Number of country names supplied
        names: usize,
    },

    /// Typed accessor used against an edition that does not carry that record
    UnsupportedEdition {
        /// Edition of the open database
        edition: Edition,
        /// Accessor that was called
        operation: &'static str,
    },
}

impl GeoIpError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        GeoIpError::CorruptContainer(msg.into())
    }

    /// Map a read error, treating a short read as a truncated container
    pub(crate) fn from_read(err: io::Error, what: &str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            GeoIpError::CorruptContainer(format!("unexpected end of file reading {}", what))
        } else {
            GeoIpError::Io(err)
        }
    }

    /// True for the errors that indicate a damaged file rather than misuse
    pub fn is_corrupt(&self) -> bool {
        matches!(self, GeoIpError::CorruptContainer(_))
    }
}

impl fmt::Display for GeoIpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoIpError::Io(e) => write!(f, "I/O error: {}", e),
            GeoIpError::CorruptContainer(msg) => write!(f, "Corrupt database: {}", msg),
            GeoIpError::NotOpen => write!(f, "Database has been closed"),
            GeoIpError::CountryTableMismatch { codes, names } => write!(
                f,
                "Country table mismatch: {} codes but {} names",
                codes, names
            ),
            GeoIpError::UnsupportedEdition { edition, operation } => write!(
                f,
                "Unsupported operation: {} is not available for {}",
                operation, edition
            ),
        }
    }
}

impl std::error::Error for GeoIpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeoIpError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for GeoIpError {
    fn from(err: io::Error) -> Self {
        GeoIpError::Io(err)
    }
}
