//! TOML input document parser.
//!
//! Loads an `AttainmentInput` from a TOML file, filling unspecified course
//! targets, thresholds and weights from `Settings`, and validates it.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::combiner::{AttainmentWeights, IndirectScore};
use crate::config::Settings;
use crate::model::{
    Assessment, CoPoMapping, CohortMembership, Course, CourseOutcome, CourseStatus, Enrollment,
    LevelThresholds, ProgramOutcome, Question, Student, StudentMark, StudentStatus,
};
use crate::pipeline::AttainmentInput;

/// Intermediate TOML structure for parsing input documents.
#[derive(Debug, Deserialize)]
struct TomlInputFile {
    program: TomlProgramHeader,
    #[serde(default)]
    weights: Option<TomlWeights>,
    #[serde(default)]
    courses: Vec<TomlCourse>,
    #[serde(default)]
    course_outcomes: Vec<TomlCourseOutcome>,
    #[serde(default)]
    assessments: Vec<TomlAssessment>,
    #[serde(default)]
    marks: Vec<StudentMark>,
    #[serde(default)]
    cohorts: Vec<CohortMembership>,
    #[serde(default)]
    students: Vec<TomlStudent>,
    #[serde(default)]
    enrollments: Vec<Enrollment>,
    #[serde(default)]
    program_outcomes: Vec<TomlProgramOutcome>,
    #[serde(default)]
    mappings: Vec<CoPoMapping>,
    #[serde(default)]
    indirect: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
struct TomlProgramHeader {
    id: String,
    #[serde(default)]
    batch: String,
}

#[derive(Debug, Deserialize)]
struct TomlWeights {
    #[serde(default)]
    direct: Option<u32>,
    #[serde(default)]
    indirect: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TomlCourse {
    id: String,
    #[serde(default)]
    program: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    target: Option<f64>,
    #[serde(default)]
    level1: Option<f64>,
    #[serde(default)]
    level2: Option<f64>,
    #[serde(default)]
    level3: Option<f64>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlCourseOutcome {
    id: String,
    course: String,
    #[serde(default)]
    number: String,
}

#[derive(Debug, Deserialize)]
struct TomlAssessment {
    id: String,
    course: String,
    #[serde(default)]
    section: String,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct TomlStudent {
    id: String,
    #[serde(default)]
    program: Option<String>,
    #[serde(default)]
    batch: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlProgramOutcome {
    id: String,
    #[serde(default)]
    number: String,
}

impl TomlWeights {
    fn resolve(&self, settings: &Settings) -> AttainmentWeights {
        AttainmentWeights::resolve(self.direct, self.indirect, settings.weights())
    }
}

/// Parse a TOML input file into an `AttainmentInput`.
pub fn parse_input(path: &Path, settings: &Settings) -> Result<AttainmentInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input file: {}", path.display()))?;

    parse_input_str(&content, path, settings)
}

/// Parse a TOML string into an `AttainmentInput` (useful for testing).
pub fn parse_input_str(
    content: &str,
    source_path: &Path,
    settings: &Settings,
) -> Result<AttainmentInput> {
    let parsed: TomlInputFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let program_id = parsed.program.id;
    let batch_id = parsed.program.batch;
    let default_thresholds = settings.thresholds();

    let courses = parsed
        .courses
        .into_iter()
        .map(|c| {
            let status = c
                .status
                .map(|s| s.parse::<CourseStatus>())
                .transpose()
                .with_context(|| format!("course {}", c.id))?
                .unwrap_or_default();

            Ok(Course {
                program_id: c.program.unwrap_or_else(|| program_id.clone()),
                name: c.name,
                target: c.target.unwrap_or(settings.default_co_target),
                thresholds: LevelThresholds::new(
                    c.level1.unwrap_or(default_thresholds.level1),
                    c.level2.unwrap_or(default_thresholds.level2),
                    c.level3.unwrap_or(default_thresholds.level3),
                ),
                status,
                id: c.id,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let course_outcomes = parsed
        .course_outcomes
        .into_iter()
        .map(|co| CourseOutcome {
            id: co.id,
            course_id: co.course,
            number: co.number,
        })
        .collect();

    let assessments = parsed
        .assessments
        .into_iter()
        .map(|a| Assessment {
            id: a.id,
            course_id: a.course,
            section_id: a.section,
            questions: a.questions,
        })
        .collect();

    let students = parsed
        .students
        .into_iter()
        .map(|s| {
            let status = s
                .status
                .map(|st| st.parse::<StudentStatus>())
                .transpose()
                .with_context(|| format!("student {}", s.id))?
                .unwrap_or_default();

            Ok(Student {
                id: s.id,
                program_id: s.program.unwrap_or_else(|| program_id.clone()),
                batch_id: s.batch.unwrap_or_else(|| batch_id.clone()),
                status,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let program_outcomes = parsed
        .program_outcomes
        .into_iter()
        .map(|po| ProgramOutcome {
            id: po.id,
            program_id: program_id.clone(),
            number: po.number,
        })
        .collect();

    let indirect = parsed
        .indirect
        .into_iter()
        .map(|(po_id, value)| {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                other => anyhow::bail!(
                    "indirect score for {po_id} must be a string or number, got {}",
                    other.type_str()
                ),
            };
            Ok((po_id, text))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    let weights = parsed
        .weights
        .map(|w| w.resolve(settings))
        .unwrap_or_else(|| settings.weights());

    Ok(AttainmentInput {
        program_id,
        batch_id,
        courses,
        course_outcomes,
        assessments,
        marks: parsed.marks,
        cohorts: parsed.cohorts,
        students,
        enrollments: parsed.enrollments,
        program_outcomes,
        mappings: parsed.mappings,
        weights,
        indirect,
        default_indirect_score: Some(settings.default_indirect_score),
    })
}

/// A warning from input validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The entity the warning is about (if applicable).
    pub subject: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn about(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            message: message.into(),
        }
    }
}

/// Check an input for anomalies the engine silently tolerates.
pub fn validate_input(input: &AttainmentInput) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let weights = input.weights;
    if weights.direct > 100 || weights.indirect > 100 {
        warnings.push(ValidationWarning {
            subject: None,
            message: format!("weights out of range: {weights}"),
        });
    }
    if !weights.sums_to_hundred() {
        warnings.push(ValidationWarning {
            subject: None,
            message: format!("weights do not sum to 100: {weights}"),
        });
    }

    // Check for duplicate IDs
    let mut seen = HashSet::new();
    for course in &input.courses {
        if !seen.insert(&course.id) {
            warnings.push(ValidationWarning::about(
                &course.id,
                format!("duplicate course ID: {}", course.id),
            ));
        }
    }
    let mut seen = HashSet::new();
    for co in &input.course_outcomes {
        if !seen.insert(&co.id) {
            warnings.push(ValidationWarning::about(
                &co.id,
                format!("duplicate course outcome ID: {}", co.id),
            ));
        }
    }
    let mut seen = HashSet::new();
    for po in &input.program_outcomes {
        if !seen.insert(&po.id) {
            warnings.push(ValidationWarning::about(
                &po.id,
                format!("duplicate program outcome ID: {}", po.id),
            ));
        }
    }

    let course_ids: HashSet<&str> = input.courses.iter().map(|c| c.id.as_str()).collect();
    for course in &input.courses {
        if !course.thresholds.is_ascending() {
            warnings.push(ValidationWarning::about(
                &course.id,
                format!(
                    "attainment thresholds are not ascending ({} / {} / {})",
                    course.thresholds.level1, course.thresholds.level2, course.thresholds.level3
                ),
            ));
        }
        if !(0.0..=100.0).contains(&course.target) {
            warnings.push(ValidationWarning::about(
                &course.id,
                format!("target {} is outside 0-100", course.target),
            ));
        }
    }

    for co in &input.course_outcomes {
        if !course_ids.contains(co.course_id.as_str()) {
            warnings.push(ValidationWarning::about(
                &co.id,
                format!("course outcome references unknown course {}", co.course_id),
            ));
        }
    }

    let co_ids: HashSet<&str> = input
        .course_outcomes
        .iter()
        .map(|co| co.id.as_str())
        .collect();
    let mut questions: HashMap<(&str, &str), f64> = HashMap::new();
    for assessment in &input.assessments {
        if !course_ids.contains(assessment.course_id.as_str()) {
            warnings.push(ValidationWarning::about(
                &assessment.id,
                format!("assessment references unknown course {}", assessment.course_id),
            ));
        }
        for question in &assessment.questions {
            let key = (assessment.id.as_str(), question.q.as_str());
            if questions.insert(key, question.max_marks).is_some() {
                warnings.push(ValidationWarning::about(
                    &assessment.id,
                    format!("duplicate question {}", question.q),
                ));
            }
            if question.max_marks <= 0.0 {
                warnings.push(ValidationWarning::about(
                    &assessment.id,
                    format!("question {} has non-positive max marks", question.q),
                ));
            }
            if question.co_ids.is_empty() {
                warnings.push(ValidationWarning::about(
                    &assessment.id,
                    format!("question {} is not mapped to any course outcome", question.q),
                ));
            }
            for co_id in &question.co_ids {
                if !co_ids.contains(co_id.as_str()) {
                    warnings.push(ValidationWarning::about(
                        &assessment.id,
                        format!("question {} references unknown course outcome {co_id}", question.q),
                    ));
                }
            }
        }
    }

    let assessment_ids: HashSet<&str> = input.assessments.iter().map(|a| a.id.as_str()).collect();
    for mark in &input.marks {
        if !assessment_ids.contains(mark.assessment_id.as_str()) {
            warnings.push(ValidationWarning::about(
                &mark.student_id,
                format!("marks reference unknown assessment {}", mark.assessment_id),
            ));
            continue;
        }
        for score in &mark.scores {
            match questions.get(&(mark.assessment_id.as_str(), score.q.as_str())) {
                None => warnings.push(ValidationWarning::about(
                    &mark.student_id,
                    format!(
                        "marks reference unknown question {} in {}",
                        score.q, mark.assessment_id
                    ),
                )),
                Some(&max) if score.marks < 0.0 || score.marks > max => {
                    warnings.push(ValidationWarning::about(
                        &mark.student_id,
                        format!(
                            "marks {} for {}/{} outside 0-{max}",
                            score.marks, mark.assessment_id, score.q
                        ),
                    ))
                }
                Some(_) => {}
            }
        }
    }

    let mut edges = HashSet::new();
    for mapping in &input.mappings {
        let subject = format!("{}->{}", mapping.co_id, mapping.po_id);
        if !mapping.is_mapped() {
            warnings.push(ValidationWarning::about(
                &subject,
                format!("mapping strength {} is not positive and will be ignored", mapping.strength),
            ));
        }
        if !co_ids.contains(mapping.co_id.as_str()) {
            warnings.push(ValidationWarning::about(
                &subject,
                format!("mapping references unknown course outcome {}", mapping.co_id),
            ));
        }
        if !edges.insert((mapping.co_id.as_str(), mapping.po_id.as_str())) {
            warnings.push(ValidationWarning::about(&subject, "duplicate CO-PO mapping"));
        }
    }

    for (po_id, text) in &input.indirect {
        if IndirectScore::parse(Some(text.as_str()), 0.0) == IndirectScore::Unparseable {
            warnings.push(ValidationWarning::about(
                po_id,
                format!("indirect score '{text}' is not a number; overall will be Invalid"),
            ));
        }
    }

    for course in &input.courses {
        if input.cohort_for(&course.id).student_ids.is_empty() {
            warnings.push(ValidationWarning::about(
                &course.id,
                "no cohort; course outcomes will not be computed",
            ));
        }
    }

    warnings
}
