//! Legacy container type definitions
//!
//! Editions, segment constants and address families shared by the scanner,
//! the trie search and the record decoder.

use serde::Serialize;
use std::fmt;
use std::net::IpAddr;

/// Structure marker preceding the edition byte in the trailer
pub const STRUCTURE_MARKER: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Delimiter preceding the info string
pub const INFO_DELIMITER: [u8; 3] = [0x00, 0x00, 0x00];

/// Number of trailer slots scanned for the structure marker
pub const STRUCTURE_INFO_MAX_SIZE: usize = 20;

/// Number of slots scanned for the info string delimiter
pub const DATABASE_INFO_MAX_SIZE: usize = 100;

/// Segment start of country-shaped editions
pub const COUNTRY_BEGIN: u32 = 16_776_960;

/// Segment start of revision 0 region databases
pub const STATE_BEGIN_REV0: u32 = 16_700_000;

/// Segment start of revision 1 region databases
pub const STATE_BEGIN_REV1: u32 = 16_000_000;

/// Width of the segment-start field following the edition byte
pub const SEGMENT_RECORD_LENGTH: usize = 3;

/// Raw edition bytes at or above this value predate April 2003
pub const LEGACY_EDITION_THRESHOLD: u8 = 106;

/// Offset subtracted from legacy edition bytes
pub const LEGACY_EDITION_OFFSET: u8 = 105;

/// Maximum pointer width across editions
pub const MAX_RECORD_LENGTH: usize = 4;

/// Record window read for city editions
pub const FULL_RECORD_LENGTH: usize = 60;

/// Record window read for organization-shaped editions
pub const MAX_ORG_RECORD_LENGTH: usize = 300;

/// Database edition, as stored in the trailer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Edition {
    /// Country, IPv4
    Country = 1,
    /// City revision 1 (with metro/area codes), IPv4
    CityRev1 = 2,
    /// Region revision 1, IPv4
    RegionRev1 = 3,
    /// ISP names, IPv4
    Isp = 4,
    /// Organization names, IPv4
    Org = 5,
    /// City revision 0, IPv4
    CityRev0 = 6,
    /// Region revision 0, IPv4
    RegionRev0 = 7,
    /// Anonymous proxy ids, IPv4
    Proxy = 8,
    /// Autonomous-system labels, IPv4
    AsNum = 9,
    /// Connection speed ids, IPv4
    NetSpeed = 10,
    /// Domain names, IPv4
    Domain = 11,
    /// Country, IPv6
    CountryV6 = 12,
    /// Autonomous-system labels, IPv6
    AsNumV6 = 21,
    /// ISP names, IPv6
    IspV6 = 22,
    /// Organization names, IPv6
    OrgV6 = 23,
    /// Domain names, IPv6
    DomainV6 = 24,
    /// City revision 1, IPv6
    CityRev1V6 = 30,
    /// City revision 0, IPv6
    CityRev0V6 = 31,
    /// Connection speed labels, IPv4
    NetSpeedRev1 = 32,
    /// Connection speed labels, IPv6
    NetSpeedRev1V6 = 33,
}

/// How a terminal pointer is turned into a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// Pointer minus segment start indexes the country table
    Country,
    /// Pointer minus a state constant encodes country and region
    Region,
    /// Variable-length city record in the record region
    City,
    /// Single NUL-terminated label in the record region
    Label,
    /// Pointer minus segment start is a bare id
    Id,
    /// Pointer minus segment start is a connection speed id
    Speed,
}

impl Edition {
    /// Decode a normalized edition code
    pub fn from_code(code: u8) -> Option<Self> {
        let edition = match code {
            1 => Edition::Country,
            2 => Edition::CityRev1,
            3 => Edition::RegionRev1,
            4 => Edition::Isp,
            5 => Edition::Org,
            6 => Edition::CityRev0,
            7 => Edition::RegionRev0,
            8 => Edition::Proxy,
            9 => Edition::AsNum,
            10 => Edition::NetSpeed,
            11 => Edition::Domain,
            12 => Edition::CountryV6,
            21 => Edition::AsNumV6,
            22 => Edition::IspV6,
            23 => Edition::OrgV6,
            24 => Edition::DomainV6,
            30 => Edition::CityRev1V6,
            31 => Edition::CityRev0V6,
            32 => Edition::NetSpeedRev1,
            33 => Edition::NetSpeedRev1V6,
            _ => return None,
        };
        Some(edition)
    }

    /// Decode a raw trailer byte, applying the pre-2003 offset
    pub fn from_raw(raw: u8) -> Option<Self> {
        let code = if raw >= LEGACY_EDITION_THRESHOLD {
            raw - LEGACY_EDITION_OFFSET
        } else {
            raw
        };
        Self::from_code(code)
    }

    /// Numeric edition code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Address family the trie of this edition is keyed on
    pub fn family(self) -> AddressFamily {
        match self {
            Edition::CountryV6
            | Edition::AsNumV6
            | Edition::IspV6
            | Edition::OrgV6
            | Edition::DomainV6
            | Edition::CityRev1V6
            | Edition::CityRev0V6
            | Edition::NetSpeedRev1V6 => AddressFamily::V6,
            _ => AddressFamily::V4,
        }
    }

    /// Record shape a terminal pointer decodes to
    pub fn shape(self) -> RecordShape {
        match self {
            Edition::Country | Edition::CountryV6 => RecordShape::Country,
            Edition::RegionRev0 | Edition::RegionRev1 => RecordShape::Region,
            Edition::CityRev0 | Edition::CityRev1 | Edition::CityRev0V6 | Edition::CityRev1V6 => {
                RecordShape::City
            }
            Edition::Proxy => RecordShape::Id,
            Edition::NetSpeed => RecordShape::Speed,
            Edition::Org
            | Edition::OrgV6
            | Edition::Isp
            | Edition::IspV6
            | Edition::Domain
            | Edition::DomainV6
            | Edition::AsNum
            | Edition::AsNumV6
            | Edition::NetSpeedRev1
            | Edition::NetSpeedRev1V6 => RecordShape::Label,
        }
    }

    /// True when the segment start is stored after the edition byte
    pub fn has_stored_segment(self) -> bool {
        matches!(self.shape(), RecordShape::City | RecordShape::Label)
    }

    /// Bytes per trie pointer slot
    ///
    /// Organization-shaped editions use 4-byte pointers, everything else 3.
    pub fn node_record_width(self) -> u8 {
        match self {
            Edition::Org
            | Edition::OrgV6
            | Edition::Isp
            | Edition::IspV6
            | Edition::Domain
            | Edition::DomainV6 => 4,
            _ => 3,
        }
    }

    /// City editions that append a metro/area combo for US records
    pub fn has_metro_codes(self) -> bool {
        matches!(self, Edition::CityRev1 | Edition::CityRev1V6)
    }

    /// Human-readable edition name
    pub fn name(self) -> &'static str {
        match self {
            Edition::Country => "GeoIP Country Edition",
            Edition::CityRev1 => "GeoIP City Edition, Rev 1",
            Edition::RegionRev1 => "GeoIP Region Edition, Rev 1",
            Edition::Isp => "GeoIP ISP Edition",
            Edition::Org => "GeoIP Organization Edition",
            Edition::CityRev0 => "GeoIP City Edition, Rev 0",
            Edition::RegionRev0 => "GeoIP Region Edition, Rev 0",
            Edition::Proxy => "GeoIP Proxy Edition",
            Edition::AsNum => "GeoIP ASNum Edition",
            Edition::NetSpeed => "GeoIP Netspeed Edition",
            Edition::Domain => "GeoIP Domain Name Edition",
            Edition::CountryV6 => "GeoIP Country V6 Edition",
            Edition::AsNumV6 => "GeoIP ASNum V6 Edition",
            Edition::IspV6 => "GeoIP ISP V6 Edition",
            Edition::OrgV6 => "GeoIP Organization V6 Edition",
            Edition::DomainV6 => "GeoIP Domain Name V6 Edition",
            Edition::CityRev1V6 => "GeoIP City Edition V6, Rev 1",
            Edition::CityRev0V6 => "GeoIP City Edition V6, Rev 0",
            Edition::NetSpeedRev1 => "GeoIP Netspeed Edition, Rev 1",
            Edition::NetSpeedRev1V6 => "GeoIP Netspeed Edition V6, Rev 1",
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Address family a descent runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddressFamily {
    /// 32-bit descent
    V4,
    /// 128-bit descent
    V6,
}

impl AddressFamily {
    /// Number of address bits consumed by a full descent
    pub fn bit_width(self) -> u8 {
        match self {
            AddressFamily::V4 => 32,
            AddressFamily::V6 => 128,
        }
    }

    /// Normalize an address into the descent key for this family
    ///
    /// IPv6 descents accept 4-byte addresses by placing them at byte 12 of a
    /// zeroed 16-byte key. IPv4 descents accept IPv6 addresses only in the
    /// `::ffff:a.b.c.d` mapped form; anything else, including the deprecated
    /// `::a.b.c.d` compatible form and `::1`, yields `None`.
    pub fn normalize(self, addr: IpAddr) -> Option<[u8; 16]> {
        let mut key = [0u8; 16];
        match (self, addr) {
            (AddressFamily::V4, IpAddr::V4(v4)) => key[..4].copy_from_slice(&v4.octets()),
            (AddressFamily::V4, IpAddr::V6(v6)) => {
                key[..4].copy_from_slice(&v6.to_ipv4_mapped()?.octets());
            }
            (AddressFamily::V6, IpAddr::V4(v4)) => key[12..].copy_from_slice(&v4.octets()),
            (AddressFamily::V6, IpAddr::V6(v6)) => key = v6.octets(),
        }
        Some(key)
    }
}
