//! The `attainment compare` command.

use std::path::PathBuf;

use anyhow::Result;

use attainment_core::report::AttainmentReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(threshold >= 0.0, "threshold must not be negative");

    let baseline = AttainmentReport::load_json(&baseline_path)?;
    let current = AttainmentReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.regressions.is_empty() {
                println!("\nRegressions:");
                for r in &report.regressions {
                    println!(
                        "  {} {:.2} -> {:.2} ({:+.2})",
                        r.po_id, r.baseline_score, r.current_score, r.delta
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} {:.2} -> {:.2} ({:+.2})",
                        i.po_id, i.baseline_score, i.current_score, i.delta
                    );
                }
            }

            if report.invalid > 0 {
                println!("\n{} outcome(s) Invalid in either report", report.invalid);
            }
            if report.new_outcomes > 0 {
                println!("\n{} new outcome(s)", report.new_outcomes);
            }
            if report.removed_outcomes > 0 {
                println!("{} removed outcome(s)", report.removed_outcomes);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
