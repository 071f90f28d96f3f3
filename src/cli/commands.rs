use crate::cli::args::Cli;
use crate::clients::{ReqwestTransport, SystemClock};
use crate::error::{CollectorError, Result};
use crate::processors::{CollectionRequest, CollectionSummary, Collector, DistrictSource};
use crate::settings::Settings;
use crate::utils::dates::resolve_target_date;
use crate::writers::DuplicatePolicy;
use std::fs::File;
use std::path::Path;
use std::rc::Rc;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    // Everything that can be rejected is checked before any network call
    let (settings, request) = prepare(&cli)?;
    info!(
        "Collecting {} with {:?} weather endpoint",
        request.date, settings.endpoints.weather_endpoint
    );

    let transport = Rc::new(ReqwestTransport::new(&settings.http)?);
    let collector = Collector::new(settings, transport, Rc::new(SystemClock));
    let summary = collector.run(&request)?;

    report(&summary, cli.quiet);
    Ok(())
}

/// Resolve settings and the collection request from the command line.
pub fn prepare(cli: &Cli) -> Result<(Settings, CollectionRequest)> {
    let settings = Settings::load(cli.config.as_deref())?;
    let date = resolve_target_date(cli.date.as_deref(), settings.utc_offset_hours)?;

    let api_key = cli
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(CollectorError::MissingApiKey)?
        .to_string();

    let duplicate_policy = if cli.dedupe {
        DuplicatePolicy::LatestWins
    } else {
        DuplicatePolicy::KeepAll
    };

    let request = CollectionRequest {
        date,
        api_key,
        rebuild_geocode: cli.rebuild_geocode,
        limit: cli.district_limit(),
        duplicate_policy,
        show_progress: !cli.quiet,
    };
    Ok((settings, request))
}

fn init_logging(verbose: bool, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let initialized = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    initialized.map_err(|e| CollectorError::Config(format!("failed to initialise logging: {}", e)))
}

fn report(summary: &CollectionSummary, quiet: bool) {
    for skipped in &summary.master.skipped {
        warn!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    if !summary.unresolved_districts.is_empty() {
        warn!(
            "No coordinates for: {}",
            summary.unresolved_districts.join(", ")
        );
    }

    if !quiet {
        let source = match summary.district_source {
            DistrictSource::Reused => "existing districts file".to_string(),
            DistrictSource::Resolved(source) => format!("{:?} district list", source).to_lowercase(),
        };
        println!("Districts from {}", source);
        if !summary.failed_districts.is_empty() {
            println!(
                "{} districts written with null metrics",
                summary.failed_districts.len()
            );
        }
        println!(
            "Master: {} rows from {} files ({} skipped) at {}",
            summary.master.rows,
            summary.master.files_loaded,
            summary.master.skipped.len(),
            summary.master.path.display()
        );
    }

    println!(
        "Wrote {} rows to {}",
        summary.rows_written,
        summary.raw_path.display()
    );
}
