//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - runs the sliding-window search for one client
//! - prints the run report
//! - writes optional exports and synthetic logs

use std::num::NonZeroUsize;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, FitArgs, SampleArgs};
use crate::data::sample::{DEFAULT_COEFFICIENTS, SampleConfig, generate_training_log};
use crate::domain::{COEFFICIENT_COUNT, FitConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `lift` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; the CLI falls back to real environment variables.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    let summary = crate::report::summarize(&run.outcomes);
    println!(
        "{}",
        crate::report::format_run_summary(
            config.client_id,
            run.engine.limits(),
            run.engine.workers(),
            &summary
        )
    );
    println!("{}", crate::report::format_outcomes(&run.outcomes, config.top_n));

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_model_states_csv(path, &run.states)?;
        info!(path = %path.display(), states = run.states.len(), "wrote CSV export");
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_model_states_json(path, &run.states)?;
        info!(path = %path.display(), states = run.states.len(), "wrote JSON export");
    }

    if run.states.is_empty() {
        return Err(AppError::new(3, "No model state could be fitted."));
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = sample_config_from_args(&args)?;
    let rows = generate_training_log(&config)?;
    crate::io::export::write_training_log_csv(&args.out, &rows)?;
    println!("Wrote {} rows to {}", rows.len(), args.out.display());
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    let workers = args.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    });
    FitConfig {
        csv_path: args.csv.clone(),
        client_id: args.client,
        time_frame: args.time_frame,
        window: args.window,
        workers,
        top_n: args.top,
        export_csv: args.export_csv.clone(),
        export_json: args.export_json.clone(),
    }
}

pub fn sample_config_from_args(args: &SampleArgs) -> Result<SampleConfig, AppError> {
    let coefficients = match &args.coefficients {
        None => DEFAULT_COEFFICIENTS,
        Some(values) => <[f64; COEFFICIENT_COUNT]>::try_from(values.as_slice()).map_err(|_| {
            AppError::new(
                2,
                format!(
                    "Expected {COEFFICIENT_COUNT} coefficients but got {}.",
                    values.len()
                ),
            )
        })?,
    };
    Ok(SampleConfig {
        client_id: args.client,
        exercise_ids: args.exercises.clone(),
        start: args.start,
        days: args.days,
        session_interval: args.interval,
        points_per_session: args.points,
        coefficients,
        noise_sd: args.noise,
        seed: args.seed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn sample_args(extra: &[&str]) -> SampleArgs {
        let mut argv = vec!["lift", "sample", "--out", "log.csv"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Sample(args) => args,
            Command::Fit(_) => panic!("expected sample"),
        }
    }

    #[test]
    fn explicit_workers_win_over_default() {
        let cli = Cli::try_parse_from([
            "lift", "fit", "--csv", "a.csv", "--client", "1", "--workers", "3",
        ])
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        let config = fit_config_from_args(&args);
        assert_eq!(config.workers, 3);
        assert_eq!(config.time_frame, (60, 7));
    }

    #[test]
    fn sample_uses_default_coefficients() {
        let config = sample_config_from_args(&sample_args(&[])).unwrap();
        assert_eq!(config.coefficients, DEFAULT_COEFFICIENTS);
        assert_eq!(config.exercise_ids, vec![1]);
    }

    #[test]
    fn sample_rejects_wrong_coefficient_count() {
        let err = sample_config_from_args(&sample_args(&["--coefficients", "1,2,3"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("got 3"));
    }
}
