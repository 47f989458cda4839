use anyhow::{Context, Result};
use clap::Parser;
use glob::glob;
use record_chunks::config::Config;
use record_chunks::display::{OutputFormat, PrintOptions, RecordPrinter};
use record_chunks::logging::{init_logging, run_span};
use record_chunks::processor::{process_file, CountProcessor};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "record-chunks")]
#[command(about = "Print the key: value records of plain or gzip-compressed files")]
#[command(version)]
struct Cli {
    /// Files to read; glob patterns are expanded
    #[arg(required = true)]
    paths: Vec<String>,

    /// Output format (defaults to the configured one)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Only print the number of records in each file
    #[arg(long)]
    count: bool,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    /// Configuration file to use instead of the default locations
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => handle_error(e),
    };
    let guard = init_logging(&config.logging, &config.paths.log_directory);
    if let Some(path) = &config.loaded_from {
        info!(config_file = %path.display(), "Loaded configuration from file");
    }
    for warning in config.warnings() {
        warn!("{}", warning);
    }

    if let Err(e) = run(&cli, &config) {
        debug!(error = %format!("{:#}", e), "run failed");
        // exit skips destructors; flush file logs first
        drop(guard);
        handle_error(e);
    }
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let paths = expand_paths(&cli.paths)?;
    let span = run_span(paths.len());
    let _entered = span.enter();

    let options = PrintOptions {
        format: cli.format.unwrap_or(config.output.format),
        color: config.output.color && !cli.no_color,
        json_pretty: config.output.json_pretty,
    };
    if !options.color {
        colored::control::set_override(false);
    }

    for path in &paths {
        if cli.count {
            let count = process_file(path, CountProcessor::new())?;
            println!("{}: {}", path.display(), count);
        } else {
            let stdout = io::stdout();
            let printed = process_file(path, RecordPrinter::new(stdout.lock(), options))?;
            debug!(path = %path.display(), printed, "printed records");
        }
    }
    Ok(())
}

/// Expands glob patterns; plain paths pass through untouched so a missing
/// file is reported by the parser rather than silently skipped.
fn expand_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let before = paths.len();
        for entry in glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
            paths.push(entry.with_context(|| format!("Failed to expand {}", pattern))?);
        }
        if paths.len() == before {
            anyhow::bail!("No files match {}", pattern);
        }
    }
    Ok(paths)
}

fn handle_error(e: anyhow::Error) -> ! {
    eprintln!("Error: {:#}", e);
    process::exit(1);
}
