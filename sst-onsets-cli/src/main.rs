//! Stop-Signal Onset CLI Application
//!
//! This is the command-line front end for the sst-onsets library.
//! It adds:
//! - Session directory layout (`<outdir>/<sid>/EPI_stop_signal`)
//! - TOML configuration and batch processing of independent sessions
//! - The JSON contrast hand-off for the statistics engine

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use sst_onsets::{ProtocolModel, SessionOutcome, SessionProcessor, Timepoint};
use std::io::Write;
use std::path::{Path, PathBuf};

mod config;
mod report;

/// Name of the per-subject task directory
const TASK_DIR: &str = "EPI_stop_signal";

/// Stop-signal onsets - Build onset files and contrasts for first-level fMRI
#[derive(Parser, Debug)]
#[command(name = "sst-onsets-cli")]
#[command(about = "Build onset files and contrasts from stop-signal behaviour logs", long_about = None)]
#[command(version)]
struct Args {
    /// Behavioural log of the session
    #[arg(short, long, value_name = "FILE")]
    behavfile: Option<PathBuf>,

    /// Timepoint of the session (BL or FU2)
    #[arg(short, long)]
    timepoint: Option<Timepoint>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    outdir: Option<PathBuf>,

    /// Subject identifier; outputs go to <outdir>/<sid>/EPI_stop_signal
    #[arg(short, long)]
    sid: Option<String>,

    /// Protocol model (a or b)
    #[arg(short, long)]
    model: Option<ProtocolModel>,

    /// Onset file delimiter
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Clean the subject output folder before processing
    #[arg(short, long)]
    erase: bool,

    /// Path to configuration file (config.toml) - required for batch mode
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
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

    log::info!("SST Onsets CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using sst-onsets library v{}", sst_onsets::VERSION);

    let mut app_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::AppConfig::default(),
    };
    if let Some(delimiter) = args.delimiter {
        app_config.session.delimiter = delimiter;
    }

    if args.behavfile.is_some() {
        single_session_mode(&args, &app_config)?;
    } else if !app_config.sessions.is_empty() {
        batch_mode(&app_config, args.erase, args.quiet)?;
    } else {
        // No arguments - show help
        println!("SST Onsets - No input specified");
        println!("\nQuick Start:");
        println!("  sst-onsets-cli -b ss_000001441076.csv -t BL -o /tmp/sst -s 000001441076");
        println!("\nBatch processing:");
        println!("  sst-onsets-cli --config config.toml");
        println!("\nUse --help for more options");
    }

    Ok(())
}

/// Process the session named on the command line
fn single_session_mode(args: &Args, app_config: &config::AppConfig) -> Result<()> {
    let behavfile = args
        .behavfile
        .as_deref()
        .context("--behavfile is required")?;
    let timepoint = args.timepoint.context("--timepoint is required with --behavfile")?;
    let outdir = args
        .outdir
        .as_deref()
        .context("--outdir is required with --behavfile")?;
    let model = args.model.or(app_config.model).unwrap_or(ProtocolModel::A);

    let processor = SessionProcessor::new(app_config.session.clone())
        .with_table(app_config.transcoding_table());

    let outcome = run_session(
        &processor,
        args.sid.as_deref(),
        behavfile,
        timepoint,
        model,
        outdir,
        args.erase,
    )?;

    if !args.quiet {
        report::write_summary(&mut std::io::stdout().lock(), args.sid.as_deref(), &outcome)?;
    }
    Ok(())
}

/// Process every configured session in parallel
///
/// A failing session is reported and does not stop the others.
fn batch_mode(app_config: &config::AppConfig, erase: bool, quiet: bool) -> Result<()> {
    let processor = SessionProcessor::new(app_config.session.clone())
        .with_table(app_config.transcoding_table());
    let default_model = app_config.model.unwrap_or(ProtocolModel::A);

    log::info!("Processing {} sessions", app_config.sessions.len());

    let results: Vec<_> = app_config
        .sessions
        .par_iter()
        .map(|entry| {
            let result = run_session(
                &processor,
                Some(entry.sid.as_str()),
                &entry.behavfile,
                entry.timepoint,
                entry.model.unwrap_or(default_model),
                &entry.outdir,
                erase,
            );
            (entry, result)
        })
        .collect();

    let failures = report_batch(&results, quiet, &mut std::io::stdout().lock())?;
    if failures > 0 {
        anyhow::bail!("{} of {} sessions failed", failures, results.len());
    }
    Ok(())
}

/// Print batch results, returning the number of failed sessions
///
/// Failures always go to stderr; summaries are skipped when `quiet` is set.
fn report_batch<W: Write>(
    results: &[(&config::SessionEntry, Result<SessionOutcome>)],
    quiet: bool,
    out: &mut W,
) -> Result<usize> {
    let mut failures = 0;
    for (entry, result) in results {
        match result {
            Ok(outcome) if !quiet => report::write_summary(out, Some(entry.sid.as_str()), outcome)?,
            Ok(_) => {}
            Err(e) => {
                failures += 1;
                eprintln!("{} - FAIL: {:#}", entry.sid, e);
            }
        }
    }
    Ok(failures)
}

/// Run one session into its output directory and write the contrast hand-off
fn run_session(
    processor: &SessionProcessor,
    sid: Option<&str>,
    behavfile: &Path,
    timepoint: Timepoint,
    model: ProtocolModel,
    outdir: &Path,
    erase: bool,
) -> Result<SessionOutcome> {
    let session_dir = prepare_session_dir(outdir, sid, erase)?;

    let outcome = processor
        .process(behavfile, timepoint, model, &session_dir)
        .with_context(|| format!("Failed to process behaviour file: {:?}", behavfile))?;

    let contrast_report =
        report::ContrastReport::new(sid, processor.config().delimiter, &outcome);
    report::write_contrast_report(&session_dir, &contrast_report)?;

    Ok(outcome)
}

fn session_dir(outdir: &Path, sid: Option<&str>) -> PathBuf {
    match sid {
        Some(sid) => outdir.join(sid).join(TASK_DIR),
        None => outdir.to_path_buf(),
    }
}

/// Create the session directory, first removing a previous run when `erase` is set
///
/// Only a subject task directory is ever erased; without a subject the outputs
/// go straight into `outdir`, which is left in place.
fn prepare_session_dir(outdir: &Path, sid: Option<&str>, erase: bool) -> Result<PathBuf> {
    let dir = session_dir(outdir, sid);

    if erase {
        if sid.is_none() {
            log::warn!("--erase needs a subject identifier; {:?} is kept", dir);
        } else if dir.is_dir() {
            log::info!("Erasing previous outputs in {:?}", dir);
            std::fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to erase output directory: {:?}", dir))?;
        }
    }

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    Ok(dir)
}

/// Map `-q` and the `-v` count onto a level filter
fn log_level(verbose: u8, quiet: bool) -> log::LevelFilter {
    match (quiet, verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Info,
        (false, 1) => log::LevelFilter::Debug,
        (false, _) => log::LevelFilter::Trace,
    }
}

/// Logs go to stderr without timestamps; `RUST_LOG` can still tune single modules
fn init_logging(verbose: u8, quiet: bool) {
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level(verbose, quiet))
        .format_timestamp(None)
        .format_target(true)
        .init();
}
