//! Core data model types for outcome attainment.
//!
//! These are the read-only inputs the engine consumes: courses and their
//! outcomes, assessments with graded questions, raw student marks, program
//! outcomes and the weighted CO-PO mapping matrix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Percentage thresholds for the three attainment tiers.
///
/// Expected to be ascending (`level1 <= level2 <= level3`). The engine does
/// not enforce this; `parser::validate_input` warns about it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelThresholds {
    pub level1: f64,
    pub level2: f64,
    pub level3: f64,
}

impl LevelThresholds {
    pub fn new(level1: f64, level2: f64, level3: f64) -> Self {
        Self {
            level1,
            level2,
            level3,
        }
    }

    /// Classify a percentage, checking the highest tier first.
    /// Thresholds are inclusive lower bounds.
    pub fn classify(&self, percentage: f64) -> AttainmentLevel {
        if percentage >= self.level3 {
            AttainmentLevel::High
        } else if percentage >= self.level2 {
            AttainmentLevel::Medium
        } else if percentage >= self.level1 {
            AttainmentLevel::Low
        } else {
            AttainmentLevel::None
        }
    }

    pub fn is_ascending(&self) -> bool {
        self.level1 <= self.level2 && self.level2 <= self.level3
    }
}

/// Lifecycle status of a course. Callers pre-filter on it; the engine
/// carries it through to `CourseAttainment` unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    #[serde(alias = "Active")]
    Active,
    #[serde(alias = "Completed")]
    Completed,
    #[serde(alias = "Future")]
    Future,
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseStatus::Active => write!(f, "active"),
            CourseStatus::Completed => write!(f, "completed"),
            CourseStatus::Future => write!(f, "future"),
        }
    }
}

impl FromStr for CourseStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(CourseStatus::Active),
            "completed" => Ok(CourseStatus::Completed),
            "future" => Ok(CourseStatus::Future),
            other => Err(ModelError::UnknownCourseStatus(other.to_string())),
        }
    }
}

/// A course whose outcomes are measured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    /// Owning program.
    pub program_id: String,
    #[serde(default)]
    pub name: String,
    /// Minimum per-outcome percentage a student needs to count as meeting
    /// the target.
    pub target: f64,
    pub thresholds: LevelThresholds,
    #[serde(default)]
    pub status: CourseStatus,
}

/// A course outcome (CO).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOutcome {
    pub id: String,
    pub course_id: String,
    #[serde(default)]
    pub number: String,
}

/// A graded question inside an assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within its assessment.
    pub q: String,
    pub max_marks: f64,
    /// Course outcomes this question exercises.
    #[serde(default)]
    pub co_ids: Vec<String>,
}

/// An assessment (test, assignment, end-semester exam) of one course section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,
    pub course_id: String,
    #[serde(default)]
    pub section_id: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Marks obtained on one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionScore {
    pub q: String,
    pub marks: f64,
}

/// All marks of one student on one assessment.
///
/// A question with no entry was not attempted. An entry with `marks = 0`
/// was attempted and scored zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentMark {
    #[serde(rename = "student")]
    pub student_id: String,
    #[serde(rename = "assessment")]
    pub assessment_id: String,
    #[serde(default)]
    pub scores: Vec<QuestionScore>,
}

/// A program outcome (PO).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramOutcome {
    pub id: String,
    #[serde(default)]
    pub program_id: String,
    #[serde(default)]
    pub number: String,
}

/// A weighted CO-PO edge. Strengths `<= 0` mean "not mapped".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoPoMapping {
    #[serde(rename = "co")]
    pub co_id: String,
    #[serde(rename = "po")]
    pub po_id: String,
    #[serde(rename = "level")]
    pub strength: i32,
}

impl CoPoMapping {
    pub fn is_mapped(&self) -> bool {
        self.strength > 0
    }
}

/// Enrollment status of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    #[serde(alias = "Active")]
    Active,
    #[serde(alias = "Inactive")]
    Inactive,
}

impl FromStr for StudentStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(StudentStatus::Active),
            "inactive" => Ok(StudentStatus::Inactive),
            other => Err(ModelError::UnknownStudentStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    #[serde(default)]
    pub program_id: String,
    #[serde(default)]
    pub batch_id: String,
    #[serde(default)]
    pub status: StudentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(rename = "course")]
    pub course_id: String,
    #[serde(rename = "student")]
    pub student_id: String,
}

/// The students measured for one course.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohortMembership {
    #[serde(rename = "course")]
    pub course_id: String,
    #[serde(rename = "students", default)]
    pub student_ids: Vec<String>,
}

/// Attainment tier of a course outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AttainmentLevel {
    None = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl AttainmentLevel {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl From<AttainmentLevel> for u8 {
    fn from(level: AttainmentLevel) -> Self {
        level.value()
    }
}

impl TryFrom<u8> for AttainmentLevel {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AttainmentLevel::None),
            1 => Ok(AttainmentLevel::Low),
            2 => Ok(AttainmentLevel::Medium),
            3 => Ok(AttainmentLevel::High),
            other => Err(ModelError::LevelOutOfRange(other)),
        }
    }
}

impl fmt::Display for AttainmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
