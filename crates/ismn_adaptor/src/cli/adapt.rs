//! Adapt command - rename and rewrite the files of one network

use crate::cli::error::HelpfulError;
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use ismn_adaptor::{AdaptReport, Adaptor, AdaptorConfig, NetworkLocation};
use std::path::PathBuf;
use tracing::info;

/// Arguments for the adapt command
#[derive(Debug)]
pub struct AdaptArgs {
    pub database: String,
    pub root: Option<PathBuf>,
    pub pattern: Option<String>,
    pub extension: Option<String>,
    pub config: Option<PathBuf>,
    pub include_hidden: bool,
    pub follow_symlinks: bool,
    pub dry_run: bool,
    pub json: bool,
}

/// Execute the adapt command
pub fn run(args: AdaptArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };

    let extension = config.suffix();
    let adaptor = Adaptor::new(root, args.database, config).with_dry_run(args.dry_run);
    let network = match adaptor.locate_network() {
        NetworkLocation::Found(network) => network,
        NetworkLocation::NotFound(missing) => {
            return Err(HelpfulError::network_not_found(&missing).into());
        }
    };

    let progress = if args.json {
        ProgressBar::hidden()
    } else {
        create_progress_bar(&extension)?
    };

    let report = adaptor
        .adapt_files(&network, &progress)
        .context("Adaptation aborted")?;
    progress.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        log_summary(&report, args.dry_run);
    }

    Ok(())
}

/// Config file values first, then command-line overrides.
fn resolve_config(args: &AdaptArgs) -> anyhow::Result<AdaptorConfig> {
    let mut config = match &args.config {
        Some(path) => AdaptorConfig::load(path)
            .map_err(|e| HelpfulError::invalid_config(path, &e.to_string()))?,
        None => AdaptorConfig::default(),
    };

    if let Some(pattern) = &args.pattern {
        config.pattern = pattern.clone();
    }
    if let Some(extension) = &args.extension {
        config.extension = extension.clone();
    }
    if args.include_hidden {
        config.include_hidden = true;
    }
    if args.follow_symlinks {
        config.follow_symlinks = true;
    }

    config.validate()?;
    Ok(config)
}

fn create_progress_bar(extension: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Iterating over {} files", extension));
    Ok(pb)
}

fn log_summary(report: &AdaptReport, dry_run: bool) {
    if dry_run {
        info!(
            total = report.total,
            planned = report.planned(),
            skipped = report.skipped(),
            "Dry run finished; no files were changed"
        );
    } else {
        info!(
            total = report.total,
            adapted = report.adapted(),
            skipped = report.skipped(),
            "Finished adapting {}",
            report.network_dir.display()
        );
    }
}
