//! The `attainment compute` command.

use std::path::PathBuf;

use anyhow::Result;

use attainment_core::config::load_settings_from;
use attainment_core::parser;
use attainment_core::pipeline::{self, StudentAttainment};
use attainment_core::report::AttainmentReport;

pub fn execute(
    input_path: PathBuf,
    direct_weight: Option<u32>,
    config_path: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
    student: Option<String>,
) -> Result<()> {
    let settings = load_settings_from(config_path.as_deref())?;
    let mut input = parser::parse_input(&input_path, &settings)?;

    if let Some(weight) = direct_weight {
        input.weights.set_direct(weight);
    }
    tracing::debug!(
        input = %input_path.display(),
        courses = input.courses.len(),
        weights = %input.weights,
        "input loaded"
    );

    for w in parser::validate_input(&input) {
        let prefix = w
            .subject
            .as_ref()
            .map(|s| format!("[{s}] "))
            .unwrap_or_default();
        eprintln!("Warning: {prefix}{}", w.message);
    }

    let attainment = pipeline::compute(&input);
    let report = AttainmentReport::new(attainment, Some(input_path.display().to_string()));

    match student {
        Some(student_id) => {
            let view = pipeline::student_attainment(&input, &student_id);
            match format.as_str() {
                "markdown" | "md" => println!("{}", student_markdown(&view)),
                "json" => println!("{}", serde_json::to_string_pretty(&view)?),
                "text" => print_student(&view),
                other => anyhow::bail!("unknown format '{other}' (expected text, json or markdown)"),
            }
        }
        None => match format.as_str() {
            "markdown" | "md" => {
                println!("{}", report.to_markdown());
            }
            "json" => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            "text" => print_summary(&report),
            other => anyhow::bail!("unknown format '{other}' (expected text, json or markdown)"),
        },
    }

    if let Some(dir) = output {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = dir.join(format!("report-{timestamp}.json"));
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_summary(report: &AttainmentReport) {
    use comfy_table::{Cell, Table};

    let a = &report.attainment;
    println!(
        "Attainment: {} (batch {}), weights {}",
        a.program_id, a.batch_id, a.weights
    );

    let mut courses = Table::new();
    courses.set_header(vec![
        "Course",
        "Status",
        "CO",
        "Level",
        "Meeting target",
        "Class %",
    ]);
    for course in a.courses.values() {
        if !course.is_computed() {
            courses.add_row(vec![
                Cell::new(&course.course_id),
                Cell::new(course.status),
                Cell::new("-"),
                Cell::new("not computed"),
                Cell::new("-"),
                Cell::new("-"),
            ]);
            continue;
        }
        for co in course.outcomes.values() {
            courses.add_row(vec![
                Cell::new(&course.course_id),
                Cell::new(course.status),
                Cell::new(&co.co_id),
                Cell::new(co.level),
                Cell::new(
                    co.percentage_meeting_target
                        .map(|p| {
                            format!(
                                "{p:.1}% ({}/{})",
                                co.students_meeting_target, co.cohort_size
                            )
                        })
                        .unwrap_or_else(|| "no questions".to_string()),
                ),
                Cell::new(
                    co.class_percentage
                        .map(|p| format!("{p:.1}%"))
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]);
        }
    }
    println!("\n{courses}");

    let mut outcomes = Table::new();
    outcomes.set_header(vec!["PO", "Direct", "Mapped COs", "Indirect", "Overall"]);
    for (po_id, po) in &a.program_outcomes {
        outcomes.add_row(vec![
            Cell::new(po_id),
            Cell::new(format!("{:.2}", po.direct.score)),
            Cell::new(po.direct.contributing_mappings),
            Cell::new(
                po.indirect_input
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or("default"),
            ),
            Cell::new(po.overall),
        ]);
    }
    println!("\n{outcomes}");
}

fn percentage_cell(pct: Option<f64>) -> String {
    pct.map(|p| format!("{p:.1}%"))
        .unwrap_or_else(|| "not attempted".to_string())
}

fn print_student(view: &StudentAttainment) {
    use comfy_table::{Cell, Table};

    println!("Student: {}", view.student_id);
    if view.courses.is_empty() {
        println!("Not in any course cohort.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Course", "CO", "Obtained %"]);
    for (course_id, outcomes) in &view.courses {
        for (co_id, pct) in outcomes {
            table.add_row(vec![
                Cell::new(course_id),
                Cell::new(co_id),
                Cell::new(percentage_cell(*pct)),
            ]);
        }
    }
    println!("\n{table}");
}

fn student_markdown(view: &StudentAttainment) -> String {
    let mut md = format!("## Student: {}\n\n", view.student_id);
    md.push_str("| Course | CO | Obtained % |\n");
    md.push_str("|--------|----|------------|\n");
    for (course_id, outcomes) in &view.courses {
        for (co_id, pct) in outcomes {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                course_id,
                co_id,
                percentage_cell(*pct)
            ));
        }
    }
    md
}
