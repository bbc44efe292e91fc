//! IPv6 editions and the 4-byte address artifact
//!
//! A v4 address looked up against a 128-bit trie is padded to sixteen bytes
//! with the four address bytes last. IPv6 fixtures below store their IPv4
//! data at that position, so a v6 lookup must agree with the plain v4 one.

mod common;

use common::*;
use geodat::{AddressFamily, Edition, GeoIpDatabase, OpenOptions, Record};
use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

/// The country fixture's prefixes, stored under ::/96
fn country_v6_fixture() -> Fixture {
    let mut f = Fixture::new(Edition::CountryV6).info("GEO-117 20240102 Build 1");
    f.country("0.0.0.0/1", US)
        .country("10.0.0.0/8", GB)
        .country("10.1.0.0/16", DE)
        .country("192.0.2.0/24", JP)
        .country("255.255.255.255/32", CA)
        .country("2001:db8::/32", JP);
    f
}

struct Pair {
    v4: GeoIpDatabase,
    v6: GeoIpDatabase,
}

fn pair() -> &'static Pair {
    static PAIR: OnceLock<Pair> = OnceLock::new();
    PAIR.get_or_init(|| Pair {
        v4: GeoIpDatabase::from_bytes(country_fixture().build(), OpenOptions::new()).unwrap(),
        v6: GeoIpDatabase::from_bytes(country_v6_fixture().build(), OpenOptions::new()).unwrap(),
    })
}

#[test]
fn test_v6_edition_metadata() {
    let meta = pair().v6.metadata().unwrap();
    assert_eq!(meta.edition, Edition::CountryV6);
    assert_eq!(meta.edition.family(), AddressFamily::V6);
    assert_eq!(pair().v6.container_info().unwrap().edition(), Some(Edition::CountryV6));
}

#[test]
fn test_native_v6_prefix() {
    let db = &pair().v6;
    let addr: IpAddr = "2001:db8::1".parse().unwrap();
    let lookup = db.query(addr, None).unwrap();
    assert_eq!(lookup.record.and_then(|r| r.country()).map(|c| c.code), Some("JP"));
    assert_eq!(lookup.netmask, Some(32));

    let other: IpAddr = "2001:db9::1".parse().unwrap();
    assert!(db.country(other).unwrap().is_unknown());
}

#[test]
fn test_v4_address_on_v6_edition() {
    let db = &pair().v6;
    let addr: IpAddr = "10.1.2.3".parse().unwrap();
    assert_eq!(db.country(addr).unwrap().code, "DE");
    assert_eq!(db.query(addr, None).unwrap().netmask, Some(96 + 16));
}

#[test]
fn test_mapped_text_is_reduced_to_four_bytes() {
    let db = &pair().v6;
    let record = db.lookup_str("::ffff:10.1.2.3").unwrap();
    assert_eq!(record.and_then(|r| r.country()).map(|c| c.code), Some("DE"));
}

#[test]
fn test_forced_v6_descent_on_v4_address() {
    let db = &pair().v6;
    let addr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
    let record = db.lookup_as(addr, AddressFamily::V6).unwrap();
    assert_eq!(record.and_then(|r| r.country()).map(|c| c.code), Some("JP"));
}

#[test]
fn test_v6_only_address_on_v4_edition_is_unknown() {
    let db = &pair().v4;
    for addr in [
        IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1)),
        IpAddr::V6(Ipv6Addr::LOCALHOST),
        "::10.1.2.3".parse().unwrap(),
    ] {
        let lookup = db.query(addr, None).unwrap();
        assert_eq!(
            lookup.record,
            Some(Record::Country(geodat::Country::UNKNOWN)),
            "{}",
            addr
        );
        assert_eq!(lookup.netmask, None, "{}", addr);
    }

    let mapped: IpAddr = "::ffff:10.1.2.3".parse().unwrap();
    assert_eq!(db.country(mapped).unwrap().code, "DE");
}

#[test]
fn test_city_v6_edition() {
    let mut fixture = Fixture::new(Edition::CityRev1V6);
    fixture
        .city("8.8.8.0/24", &mountain_view())
        .city("2001:4860::/32", &zurich());
    let db = GeoIpDatabase::from_bytes(fixture.build(), OpenOptions::new()).unwrap();

    let mv = db.location("8.8.8.8".parse().unwrap()).unwrap().expect("location");
    assert_eq!(mv.city.as_deref(), Some("Mountain View"));
    assert_eq!(mv.metro_code, Some(807));

    let zh = db
        .location("2001:4860:4860::8888".parse().unwrap())
        .unwrap()
        .expect("location");
    assert_eq!(zh.city.as_deref(), Some("Zürich"));
    assert_eq!(db.last_netmask(), Some(32));
}

#[test]
fn test_org_v6_uses_wide_pointers() {
    let mut fixture = Fixture::new(Edition::OrgV6);
    fixture.label("2001:db8::/32", "Documentation Net");
    let db = GeoIpDatabase::from_bytes(fixture.build(), OpenOptions::new()).unwrap();

    assert_eq!(db.metadata().unwrap().node_record_width, 4);
    assert_eq!(
        db.organization("2001:db8:1::1".parse().unwrap()).unwrap().as_deref(),
        Some("Documentation Net")
    );
    assert_eq!(db.organization("2001:db9::1".parse().unwrap()).unwrap(), None);
}

proptest! {
    #[test]
    fn prop_v4_on_v6_matches_v4(raw in any::<u32>()) {
        let addr = IpAddr::V4(Ipv4Addr::from(raw));
        let expected = pair().v4.lookup(addr).unwrap();
        let actual = pair().v6.lookup_as(addr, AddressFamily::V6).unwrap();
        prop_assert_eq!(actual, expected);
    }
}
