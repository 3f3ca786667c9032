//! Prox Log Reader CLI Application
//!
//! This is the command-line interface for the prox card log decoder.
//! It uses the prox-log-decoder library and adds:
//! - Batch decoding of multiple capture files
//! - Text and JSON decode reports (stdout or file)
//! - TOML-driven decode runs

use anyhow::{Context, Result};
use clap::Parser;
use prox_log_decoder::{CaptureFormat, Decoder, DecoderConfig};
use std::path::{Path, PathBuf};

mod config;
mod report;

use report::DecodeReport;

/// Prox Log Reader - Decode captured card reader line logs
#[derive(Parser, Debug)]
#[command(name = "prox-log-cli")]
#[command(about = "Decode captured prox card reader logs (CSV, bit dumps)", long_about = None)]
#[command(version)]
struct Args {
    /// Capture file(s) to decode (can be repeated)
    #[arg(short, long, value_name = "FILE")]
    log: Vec<PathBuf>,

    /// Capture format: csv or bits (default: inferred from the extension)
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<CaptureFormat>,

    /// Check sentinels, parity and pad bits while decoding
    #[arg(long)]
    validate: bool,

    /// Only keep samples latched while the card-present line is asserted
    #[arg(long)]
    present_only: bool,

    /// Emit reports as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Output file for decode reports (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (decode.toml) - for batch runs
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Prox Log Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", prox_log_decoder::VERSION);

    // Check if simple decode mode or config mode
    if !args.log.is_empty() {
        // Simple decode mode - decode the files named on the command line
        simple_decode_mode(&args)?;
    } else if let Some(config_path) = &args.config {
        // Config mode - inputs, decode options and output come from TOML
        config_mode(config_path, &args)?;
    } else {
        // No arguments - show help
        println!("Prox Log Reader - No input specified");
        println!("\nQuick Start:");
        println!("  prox-log-cli --log card.csv");
        println!("  prox-log-cli --log dump.bits --validate");
        println!("\nFor batch runs:");
        println!("  prox-log-cli --config decode.toml");
        println!("\nUse --help for more options");
    }

    Ok(())
}

/// Simple decode mode - decode captures named on the command line
fn simple_decode_mode(args: &Args) -> Result<()> {
    let decoder_config = DecoderConfig::new()
        .with_frame_validation(args.validate)
        .with_present_filter(args.present_only);
    let decoder = Decoder::with_config(decoder_config);

    if !args.json && args.output.is_none() {
        print_banner();
    }

    let reports = decode_files(&decoder, &args.log, args.format);
    write_reports(&reports, args.json, args.output.as_deref())?;
    finish(&reports)
}

/// Config mode - decode the captures a TOML run file names
fn config_mode(config_path: &Path, args: &Args) -> Result<()> {
    log::info!("Loading configuration from: {:?}", config_path);
    let app_config = config::load_config(config_path)?;
    log::debug!("Configuration loaded successfully");

    let decoder = Decoder::with_config(app_config.decode.clone());
    // Command-line flags win over the config file
    let json = args.json || app_config.output.format == config::OutputFormat::Json;
    let output = args
        .output
        .clone()
        .or_else(|| app_config.output.file.clone());

    if !json && output.is_none() {
        print_banner();
    }

    let reports = decode_files(&decoder, &app_config.input.files, app_config.input.format);
    write_reports(&reports, json, output.as_deref())?;
    finish(&reports)
}

/// Decode each capture file into a report, continuing past failures
fn decode_files(
    decoder: &Decoder,
    files: &[PathBuf],
    format: Option<CaptureFormat>,
) -> Vec<DecodeReport> {
    let mut reports = Vec::with_capacity(files.len());

    for file in files {
        let result = match format {
            Some(format) => decoder.decode_file_as(file, format),
            None => decoder.decode_file(file),
        };
        match result {
            Ok(credential) => {
                log::info!("Decoded {:?}: {}", file, credential.serial());
                reports.push(DecodeReport::success(file.clone(), credential));
            }
            Err(e) => {
                log::error!("Failed to decode {:?}: {}", file, e);
                reports.push(DecodeReport::failure(file.clone(), &e));
            }
        }
    }

    reports
}

/// Write reports to stdout or the requested output file
fn write_reports(reports: &[DecodeReport], json: bool, output: Option<&Path>) -> Result<()> {
    let rendered = if json {
        let mut text = serde_json::to_string_pretty(reports)
            .context("Failed to serialize decode reports")?;
        text.push('\n');
        text
    } else {
        let mut text = String::new();
        for report in reports {
            text.push_str(&report.render_text());
            text.push('\n');
        }
        text
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report file: {:?}", path))?;
            log::info!("Wrote {} report(s) to {:?}", reports.len(), path);
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Log the run summary and fail when nothing decoded
fn finish(reports: &[DecodeReport]) -> Result<()> {
    let decoded = reports.iter().filter(|r| r.is_success()).count();
    log::info!("Decoded {}/{} capture file(s)", decoded, reports.len());

    if decoded == 0 && !reports.is_empty() {
        anyhow::bail!("no capture file could be decoded");
    }
    Ok(())
}

fn print_banner() {
    println!("═══════════════════════════════════════════════");
    println!("  Prox Log Decoder");
    println!("═══════════════════════════════════════════════\n");
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
