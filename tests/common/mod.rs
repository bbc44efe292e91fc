//! Fixture writer for legacy containers
//!
//! Builds small but well-formed `.dat` files: a trie of `(prefix -> value)`
//! entries, an optional record region and the trailer.

#![allow(dead_code)]

use geodat::dat::types::{
    COUNTRY_BEGIN, INFO_DELIMITER, STATE_BEGIN_REV0, STATE_BEGIN_REV1, STRUCTURE_MARKER,
};
use geodat::dat::RecordShape;
use geodat::{AddressFamily, Edition};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Node(u32),
    Leaf(u32),
}

/// Entries must be inserted from least to most specific
#[derive(Clone, Debug)]
struct Trie {
    nodes: Vec<[Slot; 2]>,
}

impl Trie {
    fn new() -> Self {
        Self {
            nodes: vec![[Slot::Leaf(0), Slot::Leaf(0)]],
        }
    }

    fn insert(&mut self, key: &[u8; 16], prefix_len: u32, value: u32) {
        assert!(prefix_len >= 1, "the root itself cannot be a leaf");
        let mut node = 0usize;
        for depth in 0..prefix_len {
            let bit = ((key[(depth / 8) as usize] >> (7 - depth % 8)) & 1) as usize;
            if depth == prefix_len - 1 {
                self.nodes[node][bit] = Slot::Leaf(value);
                return;
            }
            node = match self.nodes[node][bit] {
                Slot::Node(next) => next as usize,
                Slot::Leaf(inherited) => {
                    let next = self.nodes.len();
                    self.nodes.push([Slot::Leaf(inherited), Slot::Leaf(inherited)]);
                    self.nodes[node][bit] = Slot::Node(next as u32);
                    next
                }
            };
        }
    }
}

/// A city row as stored in the record region
#[derive(Clone, Debug)]
pub struct CityRow {
    pub country: u8,
    pub region: &'static str,
    pub city: &'static str,
    pub postal: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub metro_area: Option<(u32, u32)>,
}

/// Builder for a single-edition container
#[derive(Clone, Debug)]
pub struct Fixture {
    edition: Edition,
    trie: Trie,
    records: Vec<u8>,
    info: String,
}

impl Fixture {
    pub fn new(edition: Edition) -> Self {
        Self {
            edition,
            trie: Trie::new(),
            // Offset 0 of the record region is the "no data" terminal
            records: vec![0],
            info: String::new(),
        }
    }

    pub fn info(mut self, info: &str) -> Self {
        self.info = info.to_string();
        self
    }

    /// Map a prefix to a raw terminal value relative to the segment start
    pub fn value(&mut self, cidr: &str, value: u32) -> &mut Self {
        let (key, len) = parse_cidr(cidr, self.edition.family());
        self.trie.insert(&key, len, value);
        self
    }

    /// Map a prefix to a country index
    pub fn country(&mut self, cidr: &str, index: u32) -> &mut Self {
        self.value(cidr, index)
    }

    /// Map a prefix to a city record
    pub fn city(&mut self, cidr: &str, row: &CityRow) -> &mut Self {
        let offset = self.records.len() as u32;
        self.records.push(row.country);
        for field in [row.region, row.city, row.postal] {
            self.records.extend(latin1(field));
            self.records.push(0);
        }
        self.records.extend(angle(row.latitude));
        self.records.extend(angle(row.longitude));
        if let Some((metro, area)) = row.metro_area {
            self.records
                .extend_from_slice(&(metro * 1000 + area).to_le_bytes()[..3]);
        }
        self.value(cidr, offset)
    }

    /// Map a prefix to a label record
    pub fn label(&mut self, cidr: &str, label: &str) -> &mut Self {
        let offset = self.records.len() as u32;
        self.records.extend(latin1(label));
        self.records.push(0);
        self.value(cidr, offset)
    }

    /// Map a prefix to raw record bytes, stored as given
    pub fn raw_record(&mut self, cidr: &str, bytes: &[u8]) -> &mut Self {
        let offset = self.records.len() as u32;
        self.records.extend_from_slice(bytes);
        self.value(cidr, offset)
    }

    pub fn segment_start(&self) -> u32 {
        match self.edition.shape() {
            RecordShape::Country | RecordShape::Id | RecordShape::Speed => COUNTRY_BEGIN,
            RecordShape::Region if self.edition == Edition::RegionRev0 => STATE_BEGIN_REV0,
            RecordShape::Region => STATE_BEGIN_REV1,
            RecordShape::City | RecordShape::Label => self.trie.nodes.len() as u32,
        }
    }

    /// Trie and record region without any trailer
    pub fn body(&self) -> Vec<u8> {
        let width = self.edition.node_record_width() as usize;
        let seg = self.segment_start();
        let mut out = Vec::new();
        for node in &self.trie.nodes {
            for slot in node {
                let pointer = match *slot {
                    Slot::Node(n) => n,
                    Slot::Leaf(v) => seg + v,
                };
                out.extend_from_slice(&pointer.to_le_bytes()[..width]);
            }
        }
        if matches!(self.edition.shape(), RecordShape::City | RecordShape::Label) {
            out.extend_from_slice(&self.records);
        }
        out
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.body();
        out.extend_from_slice(&INFO_DELIMITER);
        out.extend(latin1(&self.info));
        out.extend_from_slice(&STRUCTURE_MARKER);
        out.push(self.edition.code());
        if self.edition.has_stored_segment() {
            out.extend_from_slice(&self.segment_start().to_le_bytes()[..3]);
        }
        out
    }

    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).expect("write fixture");
        path
    }
}

/// Country fixture covering the whole IPv4 space
///
/// - 0.0.0.0/1      -> US
/// - 10.0.0.0/8     -> GB
/// - 10.1.0.0/16    -> DE
/// - 128.0.0.0/1    -> unknown (index 0)
/// - 192.0.2.0/24   -> JP
/// - 255.255.255.255/32 -> CA
pub fn country_fixture() -> Fixture {
    let mut f = Fixture::new(Edition::Country).info("GEO-106FREE 20240102 Build 1 Test Data");
    f.country("0.0.0.0/1", US)
        .country("10.0.0.0/8", GB)
        .country("10.1.0.0/16", DE)
        .country("192.0.2.0/24", JP)
        .country("255.255.255.255/32", CA);
    f
}

pub const US: u32 = 225;
pub const CA: u32 = 38;
pub const CH: u32 = 43;
pub const DE: u32 = 56;
pub const GB: u32 = 77;
pub const JP: u32 = 111;

pub fn mountain_view() -> CityRow {
    CityRow {
        country: US as u8,
        region: "CA",
        city: "Mountain View",
        postal: "94043",
        latitude: 37.386,
        longitude: -122.0838,
        metro_area: Some((807, 650)),
    }
}

pub fn zurich() -> CityRow {
    CityRow {
        country: CH as u8,
        region: "25",
        city: "Zürich",
        postal: "",
        latitude: 47.3667,
        longitude: 8.55,
        metro_area: None,
    }
}

/// City rev 1 fixture: 8.8.8.0/24 Mountain View, 84.0.0.0/8 Zurich
pub fn city_fixture() -> Fixture {
    let mut f = Fixture::new(Edition::CityRev1).info("GEO-107 20231115 Build 2");
    f.city("8.8.8.0/24", &mountain_view())
        .city("84.0.0.0/8", &zurich());
    f
}

/// Organization fixture: 8.0.0.0/8 and 17.0.0.0/8
pub fn org_fixture() -> Fixture {
    let mut f = Fixture::new(Edition::Org).info("GEO-110 20240301 Build 1");
    f.label("8.0.0.0/8", "Level 3 Communications")
        .label("17.0.0.0/8", "Apple Computer");
    f
}

/// Parse `addr/len` into a descent key for `family`
///
/// IPv4 prefixes in an IPv6 fixture are placed at bytes 12..16, the way a
/// 4-byte address is padded for a 128-bit descent.
pub fn parse_cidr(cidr: &str, family: AddressFamily) -> ([u8; 16], u32) {
    let (addr, len) = cidr.split_once('/').expect("cidr");
    let addr: IpAddr = addr.parse().expect("address");
    let len: u32 = len.parse().expect("prefix length");

    let mut key = [0u8; 16];
    match (family, addr) {
        (AddressFamily::V4, IpAddr::V4(v4)) => {
            key[..4].copy_from_slice(&v4.octets());
            (key, len)
        }
        (AddressFamily::V6, IpAddr::V4(v4)) => {
            key[12..].copy_from_slice(&v4.octets());
            (key, len + 96)
        }
        (AddressFamily::V6, IpAddr::V6(v6)) => (v6.octets(), len),
        (AddressFamily::V4, IpAddr::V6(_)) => panic!("IPv6 prefix in IPv4 fixture"),
    }
}

fn latin1(s: &str) -> Vec<u8> {
    s.chars().map(|c| c as u32 as u8).collect()
}

fn angle(deg: f64) -> [u8; 3] {
    let raw = ((deg + 180.0) * 10000.0).round() as u32;
    let b = raw.to_le_bytes();
    [b[0], b[1], b[2]]
}
