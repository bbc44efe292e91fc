use anyhow::{Context, Result};
use clap::Args;
use geodat::{GeoIpDatabase, OpenOptions};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

/// Cache selection shared by every subcommand
#[derive(Args, Clone, Copy, Debug, Default)]
pub struct CacheArgs {
    /// Load the whole database into memory (wins over --index)
    #[arg(long)]
    pub memory: bool,

    /// Load only the trie index into memory
    #[arg(long)]
    pub index: bool,

    /// Reload automatically when the file changes on disk
    #[arg(long)]
    pub check: bool,
}

impl CacheArgs {
    pub fn options(&self) -> OpenOptions {
        let mut flags = OpenOptions::STANDARD;
        if self.memory {
            flags |= OpenOptions::MEMORY_CACHE;
        }
        if self.index {
            flags |= OpenOptions::INDEX_CACHE;
        }
        if self.check {
            flags |= OpenOptions::CHECK_CACHE;
        }
        OpenOptions::from_flags(flags)
    }
}

pub fn open_database(path: &Path, cache: &CacheArgs) -> Result<GeoIpDatabase> {
    GeoIpDatabase::open(path, cache.options())
        .with_context(|| format!("Failed to open database: {}", path.display()))
}

/// Network address of `addr` under a prefix length, as CIDR text
///
/// `bit_width` is the width of the descent that produced `prefix_len`. An
/// IPv4 address descended over 128 bits sits at `::a.b.c.d`, so it prints in
/// IPv4 form only when the prefix reaches past the first 96 bits.
pub fn format_cidr(addr: IpAddr, prefix_len: u8, bit_width: u8) -> String {
    match addr {
        IpAddr::V4(ipv4) if bit_width == 128 && prefix_len < 96 => {
            v6_network(ipv4.to_ipv6_compatible(), prefix_len)
        }
        IpAddr::V4(ipv4) => {
            let prefix_len = if bit_width == 128 {
                prefix_len - 96
            } else {
                prefix_len.min(32)
            };
            let mask = if prefix_len == 0 {
                0u32
            } else {
                !0u32 << (32 - prefix_len)
            };
            let network = Ipv4Addr::from(u32::from(ipv4) & mask);
            format!("{}/{}", network, prefix_len)
        }
        IpAddr::V6(ipv6) => v6_network(ipv6, prefix_len),
    }
}

fn v6_network(addr: Ipv6Addr, prefix_len: u8) -> String {
    let prefix_len = prefix_len.min(128);
    let mask = if prefix_len == 0 {
        0u128
    } else {
        !0u128 << (128 - prefix_len)
    };
    format!("{}/{}", Ipv6Addr::from(u128::from(addr) & mask), prefix_len)
}

pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

pub fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

pub fn format_qps(qps: f64) -> String {
    if qps >= 1_000_000.0 {
        format!("{:.2}M", qps / 1_000_000.0)
    } else if qps >= 1_000.0 {
        format!("{:.2}K", qps / 1_000.0)
    } else {
        format!("{:.2}", qps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_cidr_v4_descent() {
        assert_eq!(format_cidr(ip("10.1.2.3"), 16, 32), "10.1.0.0/16");
        assert_eq!(format_cidr(ip("255.255.255.255"), 32, 32), "255.255.255.255/32");
        assert_eq!(format_cidr(ip("8.8.8.8"), 0, 32), "0.0.0.0/0");
    }

    #[test]
    fn test_format_cidr_v4_address_on_v6_descent() {
        assert_eq!(format_cidr(ip("10.1.2.3"), 112, 128), "10.1.0.0/16");
        assert_eq!(format_cidr(ip("10.1.2.3"), 96, 128), "0.0.0.0/0");
        assert_eq!(format_cidr(ip("10.1.2.3"), 40, 128), "::/40");
        assert_eq!(format_cidr(ip("10.1.2.3"), 5, 128), "::/5");
    }

    #[test]
    fn test_format_cidr_v6() {
        assert_eq!(format_cidr(ip("2001:db8:1::1"), 32, 128), "2001:db8::/32");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(500), "500");
    }
}
