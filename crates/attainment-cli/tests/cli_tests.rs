//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE: &str = "../../samples/cse-2021.toml";

fn attainment() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("attainment").unwrap();
    cmd.env_remove("ATTAINMENT_DIRECT_WEIGHT");
    cmd
}

fn compute_json(args: &[&str]) -> serde_json::Value {
    let output = attainment()
        .arg("compute")
        .arg("--input")
        .arg(SAMPLE)
        .arg("--format")
        .arg("json")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).unwrap()
}

fn overall(report: &serde_json::Value, po: &str) -> f64 {
    report["attainment"]["program_outcomes"][po]["overall"]["value"]
        .as_f64()
        .unwrap()
}

#[test]
fn validate_sample_input() {
    attainment()
        .arg("validate")
        .arg("--input")
        .arg(SAMPLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 courses"))
        .stdout(predicate::str::contains("3 program outcomes"))
        .stdout(predicate::str::contains("Input valid."));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("input.toml");
    std::fs::write(
        &path,
        r#"
[program]
id = "CSE"

[weights]
direct = 70
indirect = 20

[[mappings]]
co = "CO9"
po = "PO1"
level = 2
"#,
    )
    .unwrap();

    attainment()
        .arg("validate")
        .arg("--input")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING: weights do not sum to 100"))
        .stdout(predicate::str::contains("[CO9->PO1] WARNING"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    attainment()
        .arg("validate")
        .arg("--input")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[program\nid = ").unwrap();

    attainment()
        .arg("validate")
        .arg("--input")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse TOML"));
}

#[test]
fn compute_text_summary() {
    attainment()
        .arg("compute")
        .arg("--input")
        .arg(SAMPLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("80% direct / 20% indirect"))
        .stdout(predicate::str::contains("CS101-CO1"))
        .stdout(predicate::str::contains("2.24"))
        .stdout(predicate::str::contains("1.72"))
        .stdout(predicate::str::contains("0.40"));
}

#[test]
fn compute_json_levels_and_scores() {
    let report = compute_json(&[]);
    let courses = &report["attainment"]["courses"];

    assert_eq!(courses["CS101"]["outcomes"]["CS101-CO1"]["level"], 3);
    assert_eq!(courses["CS101"]["outcomes"]["CS101-CO2"]["level"], 1);
    // s5 is enrolled but inactive, s4 is not enrolled
    assert_eq!(courses["CS102"]["cohort_size"], 3);
    assert_eq!(courses["CS102"]["outcomes"]["CS102-CO1"]["level"], 2);

    let pos = &report["attainment"]["program_outcomes"];
    assert!((pos["PO1"]["direct"]["score"].as_f64().unwrap() - 2.17).abs() < 1e-9);
    assert!((pos["PO2"]["direct"]["score"].as_f64().unwrap() - 1.4).abs() < 1e-9);
    assert_eq!(pos["PO3"]["direct"]["contributing_mappings"], 0);

    assert!((overall(&report, "PO1") - 2.24).abs() < 1e-9);
    assert!((overall(&report, "PO2") - 1.72).abs() < 1e-9);
    assert!((overall(&report, "PO3") - 0.4).abs() < 1e-9);
}

#[test]
fn compute_direct_weight_override() {
    let report = compute_json(&["--direct-weight", "100"]);

    assert_eq!(report["attainment"]["weights"]["direct"], 100);
    assert_eq!(report["attainment"]["weights"]["indirect"], 0);
    assert!((overall(&report, "PO1") - 2.17).abs() < 1e-9);
    assert!((overall(&report, "PO3") - 0.0).abs() < 1e-9);
}

#[test]
fn compute_rejects_out_of_range_weight() {
    attainment()
        .arg("compute")
        .arg("--input")
        .arg(SAMPLE)
        .arg("--direct-weight")
        .arg("150")
        .assert()
        .failure();
}

#[test]
fn compute_marks_unparseable_indirect_invalid() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("input.toml");
    let content = std::fs::read_to_string(SAMPLE)
        .unwrap()
        .replace("PO1 = \"2.5\"", "PO1 = \"good\"");
    std::fs::write(&path, content).unwrap();

    attainment()
        .arg("compute")
        .arg("--input")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid"))
        .stdout(predicate::str::contains("1.72"))
        .stderr(predicate::str::contains("is not a number"));
}

#[test]
fn compute_markdown_format() {
    attainment()
        .arg("compute")
        .arg("--input")
        .arg(SAMPLE)
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("## Attainment: CSE (batch 2021)"))
        .stdout(predicate::str::contains("| PO3 | 0.00 (no data) | 2 | 0.40 |"));
}

#[test]
fn compute_shows_course_status() {
    let report = compute_json(&[]);
    assert_eq!(report["attainment"]["courses"]["CS101"]["status"], "active");

    attainment()
        .arg("compute")
        .arg("--input")
        .arg(SAMPLE)
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("| CS102 | active | CS102-CO1 | 2 |"));
}

#[test]
fn compute_student_view_json() {
    let view = compute_json(&["--student", "s1"]);
    assert_eq!(view["student_id"], "s1");

    // mid q1 8/10 plus end q1 15/20
    let co1 = view["courses"]["CS101"]["CS101-CO1"].as_f64().unwrap();
    assert!((co1 - 23.0 / 30.0 * 100.0).abs() < 1e-9);
    let cs102 = view["courses"]["CS102"]["CS102-CO1"].as_f64().unwrap();
    assert!((cs102 - 75.0).abs() < 1e-9);

    // s4 is not enrolled in CS102
    let s4 = compute_json(&["--student", "s4"]);
    assert!(s4["courses"]["CS102"].is_null());
    assert!((s4["courses"]["CS101"]["CS101-CO2"].as_f64().unwrap() - 90.0).abs() < 1e-9);
}

#[test]
fn compute_student_view_text() {
    attainment()
        .arg("compute")
        .arg("--input")
        .arg(SAMPLE)
        .arg("--student")
        .arg("s1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Student: s1"))
        .stdout(predicate::str::contains("76.7%"))
        .stdout(predicate::str::contains("PO1").not());

    // s5 is inactive, so no cohort includes them
    attainment()
        .arg("compute")
        .arg("--input")
        .arg(SAMPLE)
        .arg("--student")
        .arg("s5")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not in any course cohort."));
}

#[test]
fn compute_unknown_format() {
    attainment()
        .arg("compute")
        .arg("--input")
        .arg(SAMPLE)
        .arg("--format")
        .arg("yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn compute_saves_report() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("reports");

    attainment()
        .arg("compute")
        .arg("--input")
        .arg(SAMPLE)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Report saved to"));

    let saved: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
    assert_eq!(saved.len(), 1);
    let name = saved[0].as_ref().unwrap().file_name();
    let name = name.to_string_lossy();
    assert!(name.starts_with("report-") && name.ends_with(".json"));
}

#[test]
fn compute_missing_config_file() {
    attainment()
        .arg("compute")
        .arg("--input")
        .arg(SAMPLE)
        .arg("--config")
        .arg("no_such_config.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    attainment()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created attainment.toml"))
        .stdout(predicate::str::contains("Created inputs/sample.toml"));

    assert!(dir.path().join("attainment.toml").exists());
    assert!(dir.path().join("inputs/sample.toml").exists());

    attainment()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--input")
        .arg("inputs/sample.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Input valid."));

    attainment()
        .current_dir(dir.path())
        .arg("compute")
        .arg("--input")
        .arg("inputs/sample.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("2.50"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    attainment()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    attainment()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

fn write_report(dir: &TempDir, name: &str, args: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, compute_json(args).to_string()).unwrap();
    path
}

#[test]
fn compare_reports() {
    let dir = TempDir::new().unwrap();
    let baseline = write_report(&dir, "baseline.json", &[]);
    let current = write_report(&dir, "current.json", &["--direct-weight", "100"]);

    attainment()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline)
        .arg("--current")
        .arg(&current)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 regressions"))
        .stdout(predicate::str::contains("PO1 2.24 -> 2.17 (-0.07)"));
}

#[test]
fn compare_fail_on_regression() {
    let dir = TempDir::new().unwrap();
    let baseline = write_report(&dir, "baseline.json", &[]);
    let current = write_report(&dir, "current.json", &["--direct-weight", "100"]);

    attainment()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline)
        .arg("--current")
        .arg(&current)
        .arg("--fail-on-regression")
        .assert()
        .failure();

    attainment()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline)
        .arg("--current")
        .arg(&baseline)
        .arg("--fail-on-regression")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 regressions, 0 improvements, 3 unchanged"));
}

#[test]
fn compare_nonexistent_report() {
    attainment()
        .arg("compare")
        .arg("--baseline")
        .arg("no_such_file.json")
        .arg("--current")
        .arg("also_no_file.json")
        .assert()
        .failure();
}

#[test]
fn help_output() {
    attainment()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Course and program outcome attainment engine",
        ));
}

#[test]
fn version_output() {
    attainment()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("attainment"));
}
