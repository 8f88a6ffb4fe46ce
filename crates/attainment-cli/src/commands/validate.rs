//! The `attainment validate` command.

use std::path::PathBuf;

use anyhow::Result;

use attainment_core::config::load_settings_from;

pub fn execute(input_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let settings = load_settings_from(config_path.as_deref())?;
    let input = attainment_core::parser::parse_input(&input_path, &settings)?;

    println!(
        "Input: {} (batch {}), {} courses, {} course outcomes, {} program outcomes",
        input.program_id,
        input.batch_id,
        input.courses.len(),
        input.course_outcomes.len(),
        input.program_outcomes.len()
    );

    let warnings = attainment_core::parser::validate_input(&input);
    for w in &warnings {
        let prefix = w
            .subject
            .as_ref()
            .map(|s| format!("  [{s}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Input valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
