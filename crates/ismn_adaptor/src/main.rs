//! ISMN Adaptor
//!
//! Usage:
//!     ismn-adaptor <DATABASE> [--pattern USDA-ARS] [--root DIR] [--dry-run]

mod cli;

use clap::Parser;
use ismn_logging::LogConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "ismn-adaptor",
    version,
    about = "Rename USDA-ARS .stm files and rewrite their headers to the 2500 mV form"
)]
struct Cli {
    /// Name of the database directory below --root
    database: String,

    /// Directory containing the database (defaults to the working directory)
    #[arg(long, env = "ISMN_ADAPTOR_ROOT")]
    root: Option<PathBuf>,

    /// Network whose files are adapted
    #[arg(short = 'p', long)]
    pattern: Option<String>,

    /// Extension of candidate files
    #[arg(long)]
    extension: Option<String>,

    /// TOML config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Also adapt files inside hidden directories
    #[arg(long)]
    include_hidden: bool,

    /// Descend into symlinked station directories
    #[arg(long)]
    follow_symlinks: bool,

    /// Report planned renames without changing any file
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Only log warnings and errors on stderr
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = ismn_logging::init_logging(LogConfig {
        app_name: "ismn-adaptor",
        verbose: cli.verbose,
        quiet: cli.quiet,
    }) {
        eprintln!("Warning: {:#}", err);
    }

    let result = cli::adapt::run(cli::adapt::AdaptArgs {
        database: cli.database,
        root: cli.root,
        pattern: cli.pattern,
        extension: cli.extension,
        config: cli.config,
        include_hidden: cli.include_hidden,
        follow_symlinks: cli.follow_symlinks,
        dry_run: cli.dry_run,
        json: cli.json,
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}
