#![no_main]
use geodat::{GeoIpDatabase, OpenOptions};
use libfuzzer_sys::fuzz_target;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

// Layout: 16 address bytes, then the container
fuzz_target!(|data: &[u8]| {
    if data.len() < 16 {
        return;
    }
    let (key, container) = data.split_at(16);
    let Ok(db) = GeoIpDatabase::from_bytes(container.to_vec(), OpenOptions::new()) else {
        return;
    };

    let mut v6 = [0u8; 16];
    v6.copy_from_slice(key);
    let v4 = Ipv4Addr::new(key[0], key[1], key[2], key[3]);

    for addr in [IpAddr::V4(v4), IpAddr::V6(Ipv6Addr::from(v6))] {
        let _ = db.query(addr, None);
        let _ = db.country(addr);
        let _ = db.location(addr);
        let _ = db.organization(addr);
    }
    if let Ok(text) = std::str::from_utf8(key) {
        let _ = db.lookup_str(text);
    }
});
