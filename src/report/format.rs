//! Formatted terminal output.
//!
//! We keep formatting code in one place so the search code stays free of
//! presentation concerns and output changes stay localized.

use crate::domain::ModelState;
use crate::error::ErrorKind;
use crate::fit::{Limits, SearchOutcome};
use crate::report::OutcomeSummary;

/// Format the run header and outcome tally.
pub fn format_run_summary(
    client_id: i64,
    limits: &Limits,
    workers: usize,
    summary: &OutcomeSummary,
) -> String {
    let mut out = String::new();

    out.push_str("=== lift - sliding window model search ===\n");
    out.push_str(&format!("Client: {client_id}\n"));
    let tf = limits.time_frame();
    let win = limits.window();
    out.push_str(&format!(
        "Time frame: {}..{} days | Window: {}..{} days | Workers: {workers}\n",
        tf.far, tf.near, win.far, win.near
    ));
    out.push_str(&format!(
        "Targets: {} | fitted: {} | unscored: {} | failed: {}\n",
        summary.total,
        summary.fitted,
        summary.unscored,
        summary.total - summary.fitted - summary.unscored
    ));
    if let Some(mse) = summary.mean_mse {
        out.push_str(&format!("Mean MSE (fitted): {mse:.6}\n"));
    }

    if !summary.failures.is_empty() {
        out.push_str("\nFailures:\n");
        for kind in ErrorKind::ALL {
            if let Some(n) = summary.failures.get(&kind) {
                out.push_str(&format!("- {:<28} {n}\n", kind.display_name()));
            }
        }
    }
    out
}

/// Format one row per outcome, capped at `limit` rows.
pub fn format_outcomes(outcomes: &[SearchOutcome], limit: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:>8} {:>6} {:>6} {:>12} {:>10}  {}\n",
            "date", "exercise", "win", "tf", "mse", "rcond", "coefficients / error"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<10} {:-<8} {:-<6} {:-<6} {:-<12} {:-<10}  {:-<20}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for outcome in outcomes.iter().take(limit) {
        let t = &outcome.target;
        let line = match &outcome.result {
            Ok(ms) if !ms.is_fitted() => format!(
                "{:<10} {:>8} {:>6} {:>6} {:>12} {:>10}  unscored",
                t.date.to_string(),
                t.exercise_id,
                "-",
                "-",
                "-",
                "-",
            ),
            Ok(ms) => format!(
                "{:<10} {:>8} {:>6} {:>6} {:>12.6} {:>10.2e}  {}",
                t.date.to_string(),
                t.exercise_id,
                ms.window,
                ms.time_frame,
                ms.mse,
                ms.rcond,
                fmt_coefficients(ms),
            ),
            Err(err) => format!(
                "{:<10} {:>8} {:>6} {:>6} {:>12} {:>10}  {err}",
                t.date.to_string(),
                t.exercise_id,
                "-",
                "-",
                "-",
                "-",
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    if outcomes.len() > limit {
        out.push_str(&format!("... {} more\n", outcomes.len() - limit));
    }
    out
}

fn fmt_coefficients(ms: &ModelState) -> String {
    let parts: Vec<String> = ms.coefficients.iter().map(|x| format!("{x:.4}")).collect();
    format!("[{}]", parts.join(", "))
}
