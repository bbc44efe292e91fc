use anyhow::{Context, Result};
use geodat::{AddressFamily, Country, Record};
use serde_json::json;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::cli_utils::{format_cidr, open_database, CacheArgs};

pub fn cmd_query(
    database: PathBuf,
    addresses: Vec<String>,
    v6: bool,
    quiet: bool,
    cache: CacheArgs,
) -> Result<()> {
    let db = open_database(&database, &cache)?;
    let family = v6.then_some(AddressFamily::V6);
    let edition = db.edition()?;
    let bit_width = family.unwrap_or_else(|| edition.family()).bit_width();

    let mut all_found = true;
    for address in &addresses {
        let parsed = address.trim().parse::<IpAddr>().map(|ip| ip.to_canonical());

        let (record, prefix_len, network) = match parsed {
            Ok(ip) => {
                let lookup = db
                    .query(ip, family)
                    .with_context(|| format!("Query failed for: {}", address))?;
                let network = lookup.netmask.map(|bits| format_cidr(ip, bits, bit_width));
                (lookup.record, lookup.netmask, network)
            }
            Err(_) => (Record::unknown_for(edition), None, None),
        };

        let found = match &record {
            Some(r) => r.country() != Some(Country::UNKNOWN),
            None => false,
        };
        all_found &= found;

        if !quiet {
            let line = json!({
                "address": address,
                "network": network,
                "prefix_len": prefix_len,
                "record": record,
            });
            println!("{}", serde_json::to_string(&line)?);
        }
    }

    if quiet && !all_found {
        std::process::exit(1);
    }
    Ok(())
}
