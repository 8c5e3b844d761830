//! Command-line parsing for the `lift` model search.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the search code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "lift",
    version,
    about = "Sliding-window search for fatigue-aware training intensity models"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit every missing model state of a client from a training-log CSV.
    Fit(FitArgs),
    /// Write a synthetic training-log CSV generated from known coefficients.
    Sample(SampleArgs),
}

/// Options for `lift fit`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Training-log CSV to load.
    #[arg(long, env = "LIFT_CSV", value_name = "CSV")]
    pub csv: PathBuf,

    /// Client whose missing model states are generated.
    #[arg(long, env = "LIFT_CLIENT")]
    pub client: i64,

    /// History scanned before each target, as FAR,NEAR days.
    #[arg(
        long,
        env = "LIFT_TIME_FRAME",
        value_name = "FAR,NEAR",
        default_value = "60,7",
        value_parser = parse_day_pair,
        allow_hyphen_values = true
    )]
    pub time_frame: (i64, i64),

    /// Dates eligible for the regression window, as FAR,NEAR days.
    #[arg(
        long,
        env = "LIFT_WINDOW",
        value_name = "FAR,NEAR",
        default_value = "10,7",
        value_parser = parse_day_pair,
        allow_hyphen_values = true
    )]
    pub window: (i64, i64),

    /// Concurrent searches (defaults to available parallelism).
    #[arg(long, env = "LIFT_WORKERS")]
    pub workers: Option<usize>,

    /// Show at most this many outcomes.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Export fitted model states to CSV.
    #[arg(long = "export-csv")]
    pub export_csv: Option<PathBuf>,

    /// Export fitted model states to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for `lift sample`.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    #[arg(long, default_value_t = 1)]
    pub client: i64,

    /// Comma-separated exercise ids.
    #[arg(long, value_delimiter = ',', default_value = "1")]
    pub exercises: Vec<i64>,

    /// First session date (YYYY-MM-DD).
    #[arg(long, default_value = "2024-01-01")]
    pub start: NaiveDate,

    /// Calendar days covered by the log.
    #[arg(long, default_value_t = 90)]
    pub days: u32,

    /// Days between sessions.
    #[arg(long, default_value_t = 2)]
    pub interval: u32,

    /// Logged sets per session.
    #[arg(long, default_value_t = 6)]
    pub points: usize,

    /// Seven comma-separated model coefficients (c0..c6).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub coefficients: Option<Vec<f64>>,

    /// Standard deviation of the Gaussian noise added to intensity.
    #[arg(long, default_value_t = 0.01)]
    pub noise: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Parse `FAR,NEAR` into a raw pair of day offsets.
pub fn parse_day_pair(s: &str) -> Result<(i64, i64), String> {
    let (far, near) = s
        .split_once(',')
        .ok_or_else(|| format!("expected FAR,NEAR but got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<i64>()
            .map_err(|_| format!("invalid day offset '{}' in '{s}'", v.trim()))
    };
    Ok((parse(far)?, parse(near)?))
}
