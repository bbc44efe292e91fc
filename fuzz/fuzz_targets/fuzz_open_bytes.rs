#![no_main]
use geodat::{GeoIpDatabase, OpenOptions};
use libfuzzer_sys::fuzz_target;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must open or fail cleanly, never panic
    let Ok(db) = GeoIpDatabase::from_bytes(data.to_vec(), OpenOptions::new()) else {
        return;
    };
    let _ = db.container_info();
    for addr in [
        IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        IpAddr::V4(Ipv4Addr::BROADCAST),
        IpAddr::V6(Ipv6Addr::LOCALHOST),
    ] {
        let _ = db.lookup(addr);
        let _ = db.id(addr);
    }
});
