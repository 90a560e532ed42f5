//! demo - end-to-end synthetic run for the scan station core
//!
//! Parses a small inventory, then scans a synthetic video source with the
//! native backend absent, so the whole fallback path runs: engine probe,
//! lazy decoder construction, throttled loop attempts, dedup, confirmation
//! into SQLite and CSV export. No camera or decoder library required.

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

use scanstation::detect::stubs::{AbsentNativeProvider, EmbeddedCodeFallbackProvider};
use scanstation::{
    ConfirmedLog, Inventory, LogStatusSink, ScanSession, SqliteConfirmedStore, StationConfig,
    SyntheticVideoSource, Tick,
};

const SAMPLE_INVENTORY: &str =
    "codigo,desc,qty\r\n750,Caja tornillos,5\r\n751,Cinta aislante,12\r\n752,\"Llave, ajustable\",3\r\n";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Inventory CSV to load instead of the built-in sample.
    #[arg(long)]
    inventory: Option<PathBuf>,
    /// Codes to hold in front of the synthetic camera, in order.
    #[arg(long, value_delimiter = ',', default_value = "750,750,999,751")]
    codes: Vec<String>,
    /// Simulated display-frame ticks per shown code.
    #[arg(long, default_value_t = 30)]
    ticks_per_code: u64,
    /// SQLite database for the confirmed-scan log.
    #[arg(long, default_value = "demo_scanstation.db")]
    db: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if args.codes.is_empty() {
        return Err(anyhow!("at least one code is required"));
    }

    stage("load inventory");
    let text = match &args.inventory {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE_INVENTORY.to_string(),
    };
    let table = scanstation::parse_auto(&text);
    let inventory =
        Inventory::hydrate(&table).map_err(|e| anyhow!("inventory not usable: {e}"))?;
    println!(
        "inventory: {} records, key column '{}', delimiter '{}'",
        inventory.len(),
        inventory.key(),
        table.delimiter
    );

    stage("open confirmed-scan log");
    let mut log = ConfirmedLog::open(Box::new(SqliteConfirmedStore::open(&args.db)?))?;
    println!("restored {} previously confirmed codes", log.len());

    stage("run scan session (fallback engine)");
    let config = StationConfig::default();
    let mut session = ScanSession::new(
        &config,
        Box::new(AbsentNativeProvider),
        Box::new(EmbeddedCodeFallbackProvider::new()),
        Box::new(LogStatusSink),
    );

    // Drive the cooperative loop by hand: one tick every simulated 16 ms,
    // one stop/start cycle per shown code, like swapping the item in front
    // of the camera between sessions.
    let mut accepted: Vec<String> = Vec::new();
    for (phase, code) in args.codes.iter().enumerate() {
        let mut video = SyntheticVideoSource::new(config.video.width, config.video.height);
        video.show_code(Some(code));
        session.start(Box::new(video));
        let base = phase as u64 * args.ticks_per_code;
        for i in 0..args.ticks_per_code {
            let now_ms = (base + i) * 16;
            if session.tick(now_ms, &mut |code| accepted.push(code.to_string())) == Tick::Stop {
                break;
            }
        }
        session.stop();
    }
    println!("accepted codes: {accepted:?}");

    stage("confirm accepted codes");
    for code in &accepted {
        let outcome = log.confirm(code, Some(&inventory), Utc::now())?;
        println!("  {code}: {outcome:?}");
    }

    stage("export");
    match log.export_csv(inventory.columns(), inventory.delimiter()) {
        Some(text) => println!("{text}"),
        None => println!("nothing to export"),
    }
    Ok(())
}

fn stage(name: &str) {
    eprintln!("==> {name}");
}
