//! Project Status Log CLI Application
//!
//! This is the command-line interface for the project status dashboard.
//! It uses the projlog-core library and adds:
//! - Plan configuration (baseline schedule, EVM series, log source)
//! - HTTP fetch of the status sheet with a short-lived cache
//! - Last-good state retention across failed refreshes
//! - Report generation (text / HTML / JSON)
//! - A watch mode that refreshes on an interval

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

mod config;
mod fetch;
mod report;
mod state;

use config::AppConfig;
use fetch::LogFetcher;
use report::ReportFormat;
use state::{Dashboard, LogSource};

/// Project Status Log Reader - reconcile a status log against the plan
#[derive(Parser, Debug)]
#[command(name = "projlog-cli")]
#[command(about = "Reconcile a project status log against its baseline plan", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the plan file (plan.toml)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Read the status log from a local CSV file instead of the configured URL
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Evaluate as of this project week (default: derived from the start date)
    #[arg(short, long, value_name = "WEEK")]
    week: Option<u32>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Write the report to a file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Keep running, refreshing the log on an interval
    #[arg(long)]
    watch: bool,

    /// Refresh interval for watch mode, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    interval: u64,

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

    log::info!("Project Log Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using core library v{}", projlog_core::VERSION);

    let config = config::load_config(&args.config)?;
    let source = build_source(&args, &config)?;

    let week = effective_week(&args, &config);
    let mut dashboard = Dashboard::new(config, source, week);

    if args.watch {
        run_watch(&mut dashboard, &args)
    } else {
        run_once(&mut dashboard, &args, week)
    }
}

/// One refresh, one report, exit. A degraded refresh still reports (with a
/// warning); only config problems are fatal.
fn run_once(dashboard: &mut Dashboard, args: &Args, week: u32) -> Result<()> {
    dashboard.refresh(week);
    let rendered = report::render(dashboard.snapshot(), args.format)?;
    emit(&rendered, args)
}

/// Refresh-and-report loop. Refreshes never overlap: each cycle completes
/// before the next sleep starts.
fn run_watch(dashboard: &mut Dashboard, args: &Args) -> Result<()> {
    let interval = Duration::from_secs(args.interval.max(1));
    log::info!("watch mode, refreshing every {}s", interval.as_secs());

    loop {
        let week = effective_week(args, dashboard.config());
        dashboard.refresh(week);
        let rendered = report::render(dashboard.snapshot(), args.format)?;
        emit(&rendered, args)?;
        std::thread::sleep(interval);
    }
}

fn emit(rendered: &str, args: &Args) -> Result<()> {
    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write report to {:?}", path)),
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}

/// Week precedence: --week flag, then the plan's fixed override, then the
/// calendar.
fn effective_week(args: &Args, config: &AppConfig) -> u32 {
    args.week
        .or(config.project.current_week)
        .map(|week| week.clamp(1, config.project.total_weeks))
        .unwrap_or_else(|| {
            projlog_core::current_week(
                config.project.start_date,
                Local::now().date_naive(),
                config.project.total_weeks,
            )
        })
}

fn build_source(args: &Args, config: &AppConfig) -> Result<LogSource> {
    if let Some(path) = &args.log {
        log::info!("reading status log from {:?}", path);
        return Ok(LogSource::File(path.clone()));
    }
    match &config.source {
        Some(source) => {
            let fetcher = LogFetcher::new(
                source.url.clone(),
                Duration::from_secs(source.timeout_secs),
                Duration::from_secs(source.cache_secs),
            )?;
            Ok(LogSource::Http(fetcher))
        }
        None => Ok(LogSource::None),
    }
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
