//! rowgroup - group flat records by a key path and print them in order
//!
//! Reads a JSON array of flat objects, groups it by each field in turn
//! (outermost first), and prints the flattened result so records sharing a
//! key prefix are contiguous. Without arguments it runs the built-in
//! six-record sample through `steamid website id`.
//!
//! Usage:
//!   cargo run                                     # sample rows, sample key path
//!   cargo run -- steamid website                  # sample rows, custom key path
//!   cargo run -- --input rows.json region city    # your rows
//!   cargo run -- --emit tree --key-order ascending
//!
//! Environment:
//!   ROWGROUP_CONFIG - alternate config file (default: ./rowgroup.toml)
//!   RUST_LOG        - log filter for stderr diagnostics (default: warn)

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rowgroup::config::{resolve_config, resolve_settings, Emit, Overrides, RunSettings, CONFIG_ENV_VAR};
use rowgroup::input::{load_records, sample_rows};
use rowgroup::KeyOrder;

#[derive(Debug, Parser)]
#[command(name = "rowgroup", version, about = "Group flat JSON records by a key path")]
struct Args {
    /// Grouping fields, outermost first
    fields: Vec<String>,

    /// JSON file holding an array of records (default: built-in sample)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Config file (default: ./rowgroup.toml if present)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Bucket ordering at each level
    #[arg(long, value_enum)]
    key_order: Option<KeyOrder>,

    /// Print the flattened list or the nested tree
    #[arg(long, value_enum)]
    emit: Option<Emit>,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("\n❌ rowgroup failed: {}\n", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (config, config_path) = resolve_config(args.config.as_deref())?;
    if let Some(path) = &config_path {
        info!(path = %path.display(), "loaded config");
    }

    let (records, using_sample) = match &args.input {
        Some(path) => (load_records(path)?, false),
        None => (sample_rows(), true),
    };
    info!(records = records.len(), sample = using_sample, "records loaded");

    let overrides = Overrides {
        fields: args.fields,
        key_order: args.key_order,
        emit: args.emit,
        compact: args.compact,
    };
    let RunSettings { grouper, emit, pretty } = resolve_settings(&config, &overrides, using_sample);
    info!(fields = ?grouper.fields(), key_order = ?grouper.key_order(), "grouping");

    let tree = grouper.build_tree(records)?;
    let json = match emit {
        Emit::Tree => render(&tree, pretty)?,
        Emit::Flat => render(&tree.flatten(), pretty)?,
    };

    println!("{}", json);
    Ok(())
}

fn render<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
