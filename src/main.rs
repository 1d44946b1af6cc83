mod commands;
mod input;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use booking_core::{BookingConfig, ErrorPolicy};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "booking")]
#[command(about = "Expand recurring appointments into the dated instances of a booking calendar")]
struct Cli {
    /// Read configuration from this file instead of ~/.config/booking/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand every appointment in a calendar file
    Expand {
        /// JSON file with appointments (an array, or an object with "appointments")
        file: PathBuf,

        /// Only show instances from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Only show instances until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Print instances as JSON records
        #[arg(long)]
        json: bool,

        /// Fail if any appointment cannot be expanded
        #[arg(long)]
        abort_on_error: bool,
    },
    /// Show the appointments on one day
    Agenda {
        file: PathBuf,

        /// Day to show (YYYY-MM-DD)
        date: String,
    },
    /// Show the config path and effective settings
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Expand {
            file,
            from,
            to,
            json,
            abort_on_error,
        } => {
            if abort_on_error {
                config.on_error = ErrorPolicy::Abort;
            }
            let document = input::load(&file)?;
            let from = from.as_deref().map(parse_date).transpose()?;
            let to = to.as_deref().map(parse_date).transpose()?;
            commands::expand::run(document, &config, from, to, json)
        }
        Commands::Agenda { file, date } => {
            let document = input::load(&file)?;
            commands::agenda::run(document, &config, parse_date(&date)?)
        }
        Commands::Config => commands::config::run(cli.config.as_deref(), &config),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<BookingConfig> {
    let config = match path {
        Some(path) => BookingConfig::load_from(path),
        None => BookingConfig::load(),
    };

    config.context("Could not load configuration")
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}
