//! inspect_csv - report the detected dialect and shape of an inventory file

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use scanstation::csv::parse_auto;
use scanstation::inventory::{HydrateError, Inventory};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// CSV file to inspect.
    file: PathBuf,
    /// Number of data rows to preview.
    #[arg(long, default_value_t = 5)]
    preview: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let table = parse_auto(&text);

    println!("file:      {}", args.file.display());
    println!("delimiter: {}", printable_delimiter(table.delimiter));
    println!("rows:      {} (including header)", table.rows.len());

    let inventory = match Inventory::hydrate(&table) {
        Ok(inventory) => inventory,
        Err(HydrateError::EmptyTable) => {
            println!("status:    the file is empty");
            return Ok(());
        }
        Err(HydrateError::NoColumns) => {
            println!("status:    no columns detected");
            return Ok(());
        }
        Err(HydrateError::NoDataRows) => {
            println!("status:    header only, no data rows");
            return Ok(());
        }
    };

    println!("columns:   {}", inventory.columns().join(", "));
    println!("key:       {}", inventory.key());
    println!("records:   {}", inventory.len());

    for record in inventory.records().iter().take(args.preview) {
        println!("  {}", record.join(" | "));
    }
    if inventory.len() > args.preview {
        println!("  ... {} more", inventory.len() - args.preview);
    }
    Ok(())
}

fn printable_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t (tab)".to_string(),
        other => other.to_string(),
    }
}
