//! Room Modes - loudspeaker placement against room resonances
//!
//! Copyright (C) 2025 Pierre Aubert pierre(at)spinorama(dot)org
//!
//! This program is free software: you can redistribute it and/or modify
//! it under the terms of the GNU General Public License as published by
//! the Free Software Foundation, either version 3 of the License, or
//! (at your option) any later version.
//!
//! This program is distributed in the hope that it will be useful,
//! but WITHOUT ANY WARRANTY; without even the implied warranty of
//! MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//! GNU General Public License for more details.
//!
//! You should have received a copy of the GNU General Public License
//! along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use roommodes::{load_settings, run_search, Settings};
use roommodes_env::{default_log_path, resolve_config_path};
use schemars::schema_for;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

mod output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Room Modes - find the loudspeaker position with the smoothest modal spread
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a .toml or .json configuration (default: $ROOMMODES_CONFIG, then ./roommodes.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log level, overrides RUST_LOG
    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"])]
    loglevel: Option<String>,

    /// Log to a file (default: $ROOMMODES_LOG, then ./roommodes.log)
    #[arg(long, value_name = "PATH")]
    logfile: Option<Option<PathBuf>>,

    /// Delete the log file before starting
    #[arg(long, requires = "logfile")]
    zap: bool,

    /// Dump JSON schema for the configuration format
    #[arg(long)]
    schema: bool,
}

fn init_logging(args: &Args) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = &args.loglevel {
        builder.parse_filters(level);
    }
    if let Some(logfile) = &args.logfile {
        let path = logfile.clone().unwrap_or_else(default_log_path);
        if args.zap && path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove log file: {:?}", path))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.schema {
        let schema = schema_for!(Settings);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    init_logging(&args)?;

    let config_path = resolve_config_path(args.config.as_deref())?;
    run(&config_path, args.output.as_deref(), args.format)
}

fn run(config_path: &Path, output_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    info!("Loading room configuration from {:?}", config_path);
    let settings = load_settings(config_path)
        .with_context(|| format!("Failed to load config file: {:?}", config_path))?;

    let result = run_search(&settings).context("Placement search failed")?;

    let report = match format {
        OutputFormat::Text => output::render_text(&settings, &result)?,
        OutputFormat::Json => output::render_json(&settings, &result)?,
    };

    match output_path {
        Some(path) => {
            std::fs::write(path, report)
                .with_context(|| format!("Failed to write report: {:?}", path))?;
            info!("Report written to {:?}", path);
        }
        None => print!("{}", report),
    }
    Ok(())
}
