//! The `attainment init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("attainment.toml").exists() {
        println!("attainment.toml already exists, skipping.");
    } else {
        std::fs::write("attainment.toml", SAMPLE_CONFIG)?;
        println!("Created attainment.toml");
    }

    std::fs::create_dir_all("inputs")?;
    let sample_path = std::path::Path::new("inputs/sample.toml");
    if sample_path.exists() {
        println!("inputs/sample.toml already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_INPUT)?;
        println!("Created inputs/sample.toml");
    }

    println!("\nNext steps:");
    println!("  1. Adjust the default targets and weights in attainment.toml");
    println!("  2. Run: attainment validate --input inputs/sample.toml");
    println!("  3. Run: attainment compute --input inputs/sample.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# attainment configuration
#
# Defaults applied when an input document leaves them out.

# Percentage of a CO's marks a student needs to meet the target
default_co_target = 50

# Minimum percentage of students meeting the target for levels 1, 2 and 3
default_level1 = 50
default_level2 = 60
default_level3 = 70

# Direct/indirect weights for the overall PO score
default_weight_direct = 80
default_weight_indirect = 20

# Indirect score used for POs with no manual entry
default_indirect_score = 3.0
"#;

const SAMPLE_INPUT: &str = r#"[program]
id = "CSE"
batch = "2024"

[[courses]]
id = "CS101"
name = "Programming Fundamentals"

[[course_outcomes]]
id = "CO1"
course = "CS101"
number = "CO1"

[[course_outcomes]]
id = "CO2"
course = "CS101"
number = "CO2"

[[assessments]]
id = "mid"
course = "CS101"
section = "A"

[[assessments.questions]]
q = "q1"
max_marks = 10
co_ids = ["CO1"]

[[assessments.questions]]
q = "q2"
max_marks = 10
co_ids = ["CO2"]

[[marks]]
student = "s1"
assessment = "mid"
scores = [{ q = "q1", marks = 9 }, { q = "q2", marks = 4 }]

[[marks]]
student = "s2"
assessment = "mid"
scores = [{ q = "q1", marks = 7 }, { q = "q2", marks = 6 }]

[[students]]
id = "s1"

[[students]]
id = "s2"

[[enrollments]]
course = "CS101"
student = "s1"

[[enrollments]]
course = "CS101"
student = "s2"

[[program_outcomes]]
id = "PO1"
number = "PO1"

[[mappings]]
co = "CO1"
po = "PO1"
level = 3

[[mappings]]
co = "CO2"
po = "PO1"
level = 1

[indirect]
PO1 = "2.5"
"#;
