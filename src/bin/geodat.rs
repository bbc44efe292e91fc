mod cli_utils;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cli_utils::CacheArgs;
use commands::{cmd_bench, cmd_inspect, cmd_query};

#[derive(Parser)]
#[command(name = "geodat")]
#[command(
    about = "Query legacy binary-trie GeoIP databases",
    long_about = "geodat - Lookup tool for legacy GeoIP .dat databases\n\n\
    Reads country, region, city, organization, ISP, domain, AS number, proxy\n\
    and netspeed editions (IPv4 and IPv6), plain or gzip compressed.\n\n\
    Examples:\n\
      geodat query GeoIP.dat 8.8.8.8 1.1.1.1\n\
      geodat query GeoIPv6.dat 2001:db8::1 --v6\n\
      geodat inspect GeoLiteCity.dat --json\n\
      geodat bench GeoLiteCity.dat --index -n 1000000 -j 8"
)]
#[command(version)]
struct Cli {
    /// Log verbosity (-v for debug, -vv for trace); RUST_LOG also applies
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one or more addresses
    Query {
        /// Path to the database (.dat or .dat.gz)
        #[arg(value_name = "DATABASE")]
        database: PathBuf,

        /// Addresses to look up
        #[arg(value_name = "ADDRESS", required = true)]
        addresses: Vec<String>,

        /// Descend 128 bits even for IPv4 editions
        #[arg(long)]
        v6: bool,

        /// No output; exit status 1 if any address has no data
        #[arg(short, long)]
        quiet: bool,

        #[command(flatten)]
        cache: CacheArgs,
    },

    /// Show edition, layout and build information
    Inspect {
        /// Path to the database (.dat or .dat.gz)
        #[arg(value_name = "DATABASE", env = "GEODAT_DATABASE")]
        database: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        #[command(flatten)]
        cache: CacheArgs,
    },

    /// Time random IPv4 lookups against a database
    Bench {
        /// Path to the database (.dat or .dat.gz)
        #[arg(value_name = "DATABASE", env = "GEODAT_DATABASE")]
        database: PathBuf,

        /// Number of lookups
        #[arg(short = 'n', long, default_value = "100000")]
        count: usize,

        /// Worker threads sharing the one database instance
        #[arg(short = 'j', long, default_value = "1")]
        threads: usize,

        #[command(flatten)]
        cache: CacheArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Query {
            database,
            addresses,
            v6,
            quiet,
            cache,
        } => cmd_query(database, addresses, v6, quiet, cache),
        Commands::Inspect {
            database,
            json,
            cache,
        } => cmd_inspect(database, json, cache),
        Commands::Bench {
            database,
            count,
            threads,
            cache,
        } => cmd_bench(database, count, threads, cache),
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.init();
}
