use anyhow::{Context, Result};
use rand::Rng;
use rayon::prelude::*;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Instant;

use crate::cli_utils::{format_bytes, format_number, format_qps, open_database, CacheArgs};

pub fn cmd_bench(database: PathBuf, count: usize, threads: usize, cache: CacheArgs) -> Result<()> {
    println!("--- Phase 1: Open Database ---");
    let open_start = Instant::now();
    let db = open_database(&database, &cache)?;
    let open_time = open_start.elapsed();
    println!("  Edition:     {}", db.edition()?);
    println!("  Cache:       {}", db.cache_mode()?);
    println!("  Resident:    {}", format_bytes(db.resident_bytes()?));
    println!("  Open time:   {:.3}ms", open_time.as_micros() as f64 / 1000.0);
    println!();

    let mut rng = rand::rng();
    let addresses: Vec<IpAddr> = (0..count)
        .map(|_| IpAddr::V4(Ipv4Addr::from(rng.random::<u32>())))
        .collect();

    println!("--- Phase 2: Lookups ---");
    let threads = threads.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to build worker pool")?;

    let query_start = Instant::now();
    let hits = pool.install(|| {
        addresses
            .par_iter()
            .map(|&addr| db.lookup(addr).map(|r| usize::from(r.is_some())))
            .try_reduce(|| 0, |a, b| Ok(a + b))
    })?;
    let query_time = query_start.elapsed();
    let qps = count as f64 / query_time.as_secs_f64();

    println!("  Threads:     {}", threads);
    println!("  Lookups:     {}", format_number(count));
    println!("  With data:   {}", format_number(hits));
    println!("  Time:        {:.2}s", query_time.as_secs_f64());
    println!("  Throughput:  {} lookups/sec", format_qps(qps));

    Ok(())
}
