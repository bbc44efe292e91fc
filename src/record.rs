//! Record decoding
//!
//! Turns a terminal pointer into a typed record according to the edition:
//!
//! - country-shaped editions index the country table directly
//! - region editions encode country and region in the pointer value
//! - city and label editions point into the variable-length record region
//!
//! Strings in the record region are NUL-terminated ISO-8859-1. An immediate
//! NUL means the field is absent, which is kept distinct from an empty string.

use crate::cache::CacheStrategy;
use crate::country::{Country, CountryTable};
use crate::dat::format::latin1;
use crate::dat::types::{
    Edition, RecordShape, FULL_RECORD_LENGTH, MAX_ORG_RECORD_LENGTH,
};
use crate::dat::DatabaseMetadata;
use crate::error::{GeoIpError, Result};
use serde::Serialize;

const UNITED_STATES: Country = Country {
    code: "US",
    name: "United States",
};

const CANADA: Country = Country {
    code: "CA",
    name: "Canada",
};

/// First US state value in revision 1 region databases
const US_OFFSET: u32 = 1;

/// First Canadian province value in revision 1 region databases
const CANADA_OFFSET: u32 = 677;

/// First non-North-American value in revision 1 region databases
const WORLD_OFFSET: u32 = 1353;

/// Values reserved per country beyond `WORLD_OFFSET`
const FIPS_RANGE: u32 = 360;

/// First US state value in revision 0 region databases
const REV0_US_OFFSET: u32 = 1000;

/// Twice the equatorial earth radius in kilometres
const EARTH_DIAMETER_KM: f64 = 2.0 * 6378.2;

/// Country and optional region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    /// Country the region belongs to
    pub country: Country,
    /// Two-letter region code, absent outside the US and Canada
    pub region: Option<String>,
}

/// City-level location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    /// Country
    pub country: Country,
    /// Region code
    pub region: Option<String>,
    /// City name
    pub city: Option<String>,
    /// Postal code
    pub postal_code: Option<String>,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Metro (DMA) code, US records of revision 1 editions only
    pub metro_code: Option<u32>,
    /// Telephone area code, US records of revision 1 editions only
    pub area_code: Option<u32>,
}

impl Location {
    /// Great-circle distance to another location in kilometres
    pub fn distance_km(&self, other: &Location) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = lat2 - lat1;
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        EARTH_DIAMETER_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// Connection speed class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NetSpeed {
    /// Unknown or unmapped
    Unknown,
    /// Dial-up
    Dialup,
    /// Cable or DSL
    CableDsl,
    /// Corporate link
    Corporate,
}

impl NetSpeed {
    /// Map a stored id; unrecognised ids are `Unknown`
    pub fn from_id(id: u32) -> Self {
        match id {
            1 => NetSpeed::Dialup,
            2 => NetSpeed::CableDsl,
            3 => NetSpeed::Corporate,
            _ => NetSpeed::Unknown,
        }
    }
}

/// A decoded lookup result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Record {
    /// Country editions
    Country(Country),
    /// Region editions
    Region(Region),
    /// City editions
    Location(Location),
    /// Organization, ISP, domain, AS-number and netspeed label editions
    Organization(String),
    /// Connection speed edition
    NetSpeed(NetSpeed),
    /// Proxy edition id
    Id(u32),
}

impl Record {
    /// The country carried by this record, if any
    pub fn country(&self) -> Option<Country> {
        match self {
            Record::Country(c) => Some(*c),
            Record::Region(r) => Some(r.country),
            Record::Location(l) => Some(l.country),
            _ => None,
        }
    }

    /// The sentinel returned for addresses that cannot be parsed
    pub fn unknown_for(edition: Edition) -> Option<Record> {
        match edition.shape() {
            RecordShape::Country => Some(Record::Country(Country::UNKNOWN)),
            RecordShape::Id => Some(Record::Id(0)),
            RecordShape::Speed => Some(Record::NetSpeed(NetSpeed::Unknown)),
            RecordShape::Region | RecordShape::City | RecordShape::Label => None,
        }
    }
}

/// Decodes terminal pointers for one open database generation
pub struct RecordDecoder<'a> {
    metadata: &'a DatabaseMetadata,
    countries: &'a CountryTable,
}

impl<'a> RecordDecoder<'a> {
    /// Create a decoder for the given layout and country table
    pub fn new(metadata: &'a DatabaseMetadata, countries: &'a CountryTable) -> Self {
        Self {
            metadata,
            countries,
        }
    }

    /// Decode the record a descent ended on
    ///
    /// Returns `Ok(None)` when the database holds no data for the address.
    /// Country-shaped editions never return `None`: the reserved boundary
    /// decodes to [`Country::UNKNOWN`].
    pub fn decode(&self, terminal: u32, cache: &mut CacheStrategy) -> Result<Option<Record>> {
        let seg = self.metadata.segment_start;
        let id = terminal.checked_sub(seg).ok_or_else(|| {
            GeoIpError::corrupt(format!("terminal {} below segment start {}", terminal, seg))
        })?;

        let record = match self.metadata.edition.shape() {
            RecordShape::Country => Some(Record::Country(self.country(id)?)),
            RecordShape::Id => Some(Record::Id(id)),
            RecordShape::Speed => Some(Record::NetSpeed(NetSpeed::from_id(id))),
            RecordShape::Region => self.region(id)?.map(Record::Region),
            RecordShape::City if id == 0 => None,
            RecordShape::City => {
                let offset = self.metadata.record_offset(terminal);
                let window = cache.read_window(offset, FULL_RECORD_LENGTH)?;
                Some(Record::Location(self.location(&window)?))
            }
            RecordShape::Label if id == 0 => None,
            RecordShape::Label => {
                let offset = self.metadata.record_offset(terminal);
                let window = cache.read_window(offset, MAX_ORG_RECORD_LENGTH)?;
                label(&window).map(Record::Organization)
            }
        };

        Ok(record)
    }

    fn country(&self, index: u32) -> Result<Country> {
        self.countries.get(index as usize).ok_or_else(|| {
            GeoIpError::corrupt(format!(
                "country index {} outside table of {}",
                index,
                self.countries.len()
            ))
        })
    }

    fn region(&self, value: u32) -> Result<Option<Region>> {
        let region = if self.metadata.edition == Edition::RegionRev0 {
            if value >= REV0_US_OFFSET {
                Region {
                    country: UNITED_STATES,
                    region: Some(region_code(value - REV0_US_OFFSET)?),
                }
            } else {
                Region {
                    country: self.country(value)?,
                    region: None,
                }
            }
        } else if value < US_OFFSET {
            return Ok(None);
        } else if value < CANADA_OFFSET {
            Region {
                country: UNITED_STATES,
                region: Some(region_code(value - US_OFFSET)?),
            }
        } else if value < WORLD_OFFSET {
            Region {
                country: CANADA,
                region: Some(region_code(value - CANADA_OFFSET)?),
            }
        } else {
            Region {
                country: self.country((value - WORLD_OFFSET) / FIPS_RANGE)?,
                region: None,
            }
        };
        Ok(Some(region))
    }

    fn location(&self, window: &[u8]) -> Result<Location> {
        let mut cursor = RecordCursor::new(window);

        let country = self.country(cursor.byte()? as u32)?;
        let region = cursor.string()?;
        let city = cursor.string()?;
        let postal_code = cursor.string()?;
        let latitude = angle(cursor.u24("latitude")?);
        let longitude = angle(cursor.u24("longitude")?);

        let (metro_code, area_code) =
            if self.metadata.edition.has_metro_codes() && country.code == UNITED_STATES.code {
                let combo = cursor.u24("metro/area code")?;
                (Some(combo / 1000), Some(combo % 1000))
            } else {
                (None, None)
            };

        Ok(Location {
            country,
            region,
            city,
            postal_code,
            latitude,
            longitude,
            metro_code,
            area_code,
        })
    }
}

/// Decode a label record; missing terminator or empty label is absent
fn label(window: &[u8]) -> Option<String> {
    match memchr::memchr(0, window) {
        Some(0) | None => None,
        Some(end) => Some(latin1(&window[..end])),
    }
}

fn angle(raw: u32) -> f64 {
    raw as f64 / 10000.0 - 180.0
}

/// Two uppercase letters encoding `value` in base 26
fn region_code(value: u32) -> Result<String> {
    let (hi, lo) = (value / 26, value % 26);
    if hi >= 26 {
        return Err(GeoIpError::corrupt(format!("region value {} out of range", value)));
    }
    Ok([(b'A' + hi as u8) as char, (b'A' + lo as u8) as char]
        .iter()
        .collect())
}

/// Sequential reader over a record window
struct RecordCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RecordCursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn byte(&mut self) -> Result<u8> {
        let b = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| GeoIpError::corrupt("empty record"))?;
        self.pos += 1;
        Ok(b)
    }

    fn string(&mut self) -> Result<Option<String>> {
        let rest = &self.buf[self.pos..];
        let end = memchr::memchr(0, rest)
            .ok_or_else(|| GeoIpError::corrupt("unterminated string in record"))?;
        self.pos += end + 1;
        Ok((end > 0).then(|| latin1(&rest[..end])))
    }

    fn u24(&mut self, what: &str) -> Result<u32> {
        let bytes = self.buf.get(self.pos..self.pos + 3).ok_or_else(|| {
            GeoIpError::corrupt(format!("unexpected end of record reading {}", what))
        })?;
        self.pos += 3;
        Ok(crate::dat::format::read_pointer(bytes))
    }
}
