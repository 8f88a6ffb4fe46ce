//! Regression detection integration tests.
//!
//! Tests the report comparison workflow end-to-end, including
//! JSON serialization, report loading, and regression detection.

use std::path::Path;

use attainment_core::config::Settings;
use attainment_core::parser::parse_input_str;
use attainment_core::pipeline::{compute, AttainmentInput};
use attainment_core::report::AttainmentReport;

fn sample_input() -> AttainmentInput {
    let content = std::fs::read_to_string("../../samples/cse-2021.toml").unwrap();
    parse_input_str(&content, Path::new("cse-2021.toml"), &Settings::default()).unwrap()
}

fn report_for(input: &AttainmentInput) -> AttainmentReport {
    AttainmentReport::new(compute(input), Some("cse-2021.toml".into()))
}

#[test]
fn saved_reports_compare_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");

    let baseline_input = sample_input();
    let mut current_input = sample_input();
    // s2 improves on the CS101 end-semester paper: CS101-CO2 reaches 3/4.
    for mark in &mut current_input.marks {
        if mark.student_id == "s2" && mark.assessment_id == "cs101-end" {
            mark.scores[0].marks = 16.0;
        }
    }

    report_for(&baseline_input).save_json(&baseline_path).unwrap();
    report_for(&current_input).save_json(&current_path).unwrap();

    let baseline = AttainmentReport::load_json(&baseline_path).unwrap();
    let current = AttainmentReport::load_json(&current_path).unwrap();
    assert_eq!(current.source.as_deref(), Some("cse-2021.toml"));

    let comparison = current.compare(&baseline, 0.05);
    assert!(!comparison.has_regressions());
    assert_eq!(comparison.improvements.len(), 2);
    assert_eq!(comparison.unchanged, 1);

    let po2 = comparison
        .improvements
        .iter()
        .find(|c| c.po_id == "PO2")
        .unwrap();
    // direct 1.4 -> 2.6, overall 1.72 -> 2.68
    assert!((po2.delta - 0.96).abs() < 1e-9);

    // Swapping sides turns the improvements into regressions.
    let reversed = baseline.compare(&current, 0.05);
    assert_eq!(reversed.regressions.len(), 2);
    assert!(reversed.improvements.is_empty());
}

#[test]
fn invalid_indirect_is_not_a_regression() {
    let baseline_input = sample_input();
    let mut current_input = sample_input();
    current_input
        .indirect
        .insert("PO1".into(), "pending".into());

    let comparison = report_for(&current_input).compare(&report_for(&baseline_input), 0.05);

    assert!(!comparison.has_regressions());
    assert_eq!(comparison.invalid, 1);
    assert_eq!(comparison.unchanged, 2);
}

#[test]
fn threshold_absorbs_small_changes() {
    let baseline_input = sample_input();
    let mut current_input = sample_input();
    current_input.indirect.insert("PO3".into(), "2.2".into());

    let baseline = report_for(&baseline_input);
    let current = report_for(&current_input);

    // PO3 overall 0.40 -> 0.44
    let loose = current.compare(&baseline, 0.05);
    assert!(loose.improvements.is_empty());
    assert_eq!(loose.unchanged, 3);

    let strict = current.compare(&baseline, 0.01);
    assert_eq!(strict.improvements.len(), 1);
    assert_eq!(strict.improvements[0].po_id, "PO3");
}

#[test]
fn new_and_removed_outcomes_are_counted() {
    let baseline_input = sample_input();
    let mut current_input = sample_input();
    current_input.program_outcomes.retain(|po| po.id != "PO3");
    current_input.mappings[0].po_id = "PO4".into();

    let comparison = report_for(&current_input).compare(&report_for(&baseline_input), 0.05);

    assert_eq!(comparison.new_outcomes, 1);
    assert_eq!(comparison.removed_outcomes, 1);
}

#[test]
fn comparison_markdown_lists_changes() {
    let baseline_input = sample_input();
    let mut current_input = sample_input();
    current_input.weights.set_direct(100);

    let md = report_for(&current_input)
        .compare(&report_for(&baseline_input), 0.05)
        .to_markdown();

    assert!(md.contains("**Summary:** 3 regressions, 0 improvements, 0 unchanged"));
    assert!(md.contains("| PO2 | 1.72 | 1.40 | -0.32 |"));
}
