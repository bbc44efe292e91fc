use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use crate::cli_utils::{format_bytes, format_number, open_database, CacheArgs};

pub fn cmd_inspect(database: PathBuf, json_output: bool, cache: CacheArgs) -> Result<()> {
    let db = open_database(&database, &cache)?;

    let metadata = db.metadata()?;
    let info = db.container_info()?;
    let mode = db.cache_mode()?;
    let resident = db.resident_bytes()?;
    let family = metadata.edition.family();

    if json_output {
        let output = json!({
            "file": database.display().to_string(),
            "edition": metadata.edition.name(),
            "edition_code": metadata.edition.code(),
            "address_bits": family.bit_width(),
            "metadata": metadata,
            "cache": mode,
            "resident_bytes": resident,
            "info": info.as_str(),
            "build_date": info.date().map(|d| d.to_string()),
            "premium": info.is_premium(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Database: {}", database.display());
        println!(
            "Edition:  {} (code {})",
            metadata.edition,
            metadata.edition.code()
        );
        println!();
        println!("Layout:");
        println!("  Address bits:    {}", family.bit_width());
        println!("  Segment start:   {}", format_number(metadata.segment_start as usize));
        println!("  Pointer width:   {} bytes", metadata.node_record_width);
        println!("  File size:       {}", format_bytes(metadata.source_size as usize));
        println!(
            "  Trailer:         {}",
            match metadata.marker_offset {
                Some(offset) => format!("marker at offset {}", offset),
                None => "none (pre-marker country layout)".to_string(),
            }
        );
        println!();
        println!("Cache:");
        println!("  Mode:            {}", mode);
        println!("  Resident:        {}", format_bytes(resident));

        if !info.is_empty() {
            println!();
            println!("Info:");
            println!("  {}", info);
            if let Some(date) = info.date() {
                println!("  Build date:      {}", date);
            }
            println!(
                "  Build type:      {}",
                if info.is_premium() { "premium" } else { "free" }
            );
        }
    }

    Ok(())
}
