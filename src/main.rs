//! CLI entry point for the bike-sharing analysis tool.
//!
//! Loads the daily and hourly tables (remote first, local cache second) and
//! either previews them or computes the full statistics report.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use bikeshare_eda::analyzers::report::{build_report, build_strict_report};
use bikeshare_eda::config::Settings;
use bikeshare_eda::dataset::{DayRecord, HourRecord, Record, Table};
use bikeshare_eda::fetch::BasicClient;
use bikeshare_eda::loader::{Loaded, Loader};
use bikeshare_eda::output::{print_head, print_json, print_pretty, write_json};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_eda")]
#[command(about = "Exploratory analysis of the bike-sharing dataset", long_about = None)]
struct Cli {
    /// Skip the download and read the local cache only
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    /// Directory holding day.csv and hour.csv (overrides BIKESHARE_CACHE_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load both tables and report where each came from
    Load,
    /// Show the first rows of both tables
    Head {
        /// Number of rows per table
        #[arg(short, default_value_t = 5)]
        n: usize,
    },
    /// Compute the statistics report
    Report {
        /// Also write the report as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail if the regression or t-test cannot be computed
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let mut settings = Settings::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = settings
        .log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = settings
        .log_file_path
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_eda.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    if let Some(dir) = cli.cache_dir {
        settings.cache_dir = dir;
    }

    let loader = Loader::new(BasicClient::new()?)
        .with_base_url(settings.download_url.clone())
        .offline(cli.offline);

    let day = load::<DayRecord>(&loader, &settings)?;
    let hour = load::<HourRecord>(&loader, &settings)?;

    match cli.command {
        Commands::Load => {
            info!(
                day_rows = day.len(),
                hour_rows = hour.len(),
                "Datasets ready"
            );
        }
        Commands::Head { n } => {
            print_head("day", &day, n)?;
            print_head("hour", &hour, n)?;
        }
        Commands::Report { output, strict } => {
            let report = if strict {
                build_strict_report(&day, &hour)?
            } else {
                build_report(&day, &hour)
            };

            print_pretty(&report);
            print_json(&report)?;
            if let Some(path) = output {
                write_json(&path, &report)?;
            }
        }
    }

    Ok(())
}

/// Loads one table. A fatal load error ends the run before any analysis.
fn load<R: Record>(loader: &Loader<BasicClient>, settings: &Settings) -> Result<Table<R>> {
    let dataset = settings.dataset(R::KIND);
    let Loaded {
        table,
        source,
        advisory,
    } = loader.load::<R>(&dataset)?;

    info!(
        dataset = %R::KIND,
        source = ?source,
        offline_fallback = advisory.is_some(),
        rows = table.len(),
        "Dataset loaded"
    );

    Ok(table)
}
