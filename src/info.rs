//! Container info string
//!
//! The free-form text stored ahead of the structure marker, conventionally
//! `GEO-NNN[FREE] YYYYMMDD Build N Copyright ...`.

use crate::dat::types::Edition;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Parsed view over a container info string
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ContainerInfo {
    raw: String,
}

impl ContainerInfo {
    /// Wrap a raw info string; empty when the container has none
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The raw text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the container carried no info string
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Edition named by the `GEO-NNN` prefix
    ///
    /// Strings too short to carry a code read as the country edition.
    /// Returns `None` for codes that are present but unrecognised.
    pub fn edition(&self) -> Option<Edition> {
        let Some(digits) = self.raw.get(4..7) else {
            return Some(Edition::Country);
        };
        let code: u32 = digits.parse().ok()?;
        let code = u8::try_from(code).ok()?;
        Edition::from_raw(code)
    }

    /// Free builds are marked `FREE`; anything else is a premium build
    pub fn is_premium(&self) -> bool {
        !self.raw.contains("FREE")
    }

    /// Build date: the first `YYYYMMDD` that follows whitespace
    pub fn date(&self) -> Option<NaiveDate> {
        let bytes = self.raw.as_bytes();
        bytes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_ascii_whitespace())
            .filter_map(|(i, _)| self.raw.get(i + 1..i + 9))
            .find_map(|candidate| NaiveDate::parse_from_str(candidate, "%Y%m%d").ok())
    }
}

impl fmt::Display for ContainerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
