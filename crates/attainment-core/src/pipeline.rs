//! End-to-end attainment pipeline.
//!
//! `compute` is a pure function of its input: it builds its indexes fresh,
//! keeps nothing between calls, and returns ordered maps, so identical
//! inputs always give identical output. Callers own any memoization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregator::{OutcomeAggregator, PoDirectAttainment};
use crate::calculator::{CourseAttainment, OutcomeAttainmentCalculator};
use crate::cohort::select_cohort;
use crate::combiner::{
    AttainmentCombiner, AttainmentWeights, CombinedScore, DEFAULT_INDIRECT_SCORE,
};
use crate::index::MarkIndex;
use crate::model::{
    Assessment, AttainmentLevel, CoPoMapping, CohortMembership, Course, CourseOutcome, Enrollment,
    ProgramOutcome, Student, StudentMark,
};

/// Everything the engine needs for one program and batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttainmentInput {
    pub program_id: String,
    #[serde(default)]
    pub batch_id: String,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub course_outcomes: Vec<CourseOutcome>,
    #[serde(default)]
    pub assessments: Vec<Assessment>,
    #[serde(default)]
    pub marks: Vec<StudentMark>,
    /// Explicit cohorts; take precedence over `students` + `enrollments`.
    #[serde(default)]
    pub cohorts: Vec<CohortMembership>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
    #[serde(default)]
    pub program_outcomes: Vec<ProgramOutcome>,
    #[serde(default)]
    pub mappings: Vec<CoPoMapping>,
    #[serde(default)]
    pub weights: AttainmentWeights,
    /// Manual indirect attainment text per PO id.
    #[serde(default)]
    pub indirect: BTreeMap<String, String>,
    /// Indirect score for POs without an entry; `DEFAULT_INDIRECT_SCORE`
    /// when unset.
    #[serde(default)]
    pub default_indirect_score: Option<f64>,
}

impl AttainmentInput {
    /// The cohort measured for `course_id`: an explicit membership if one
    /// was supplied, otherwise one derived from students and enrollments.
    pub fn cohort_for(&self, course_id: &str) -> CohortMembership {
        if let Some(explicit) = self.cohorts.iter().find(|c| c.course_id == course_id) {
            return explicit.clone();
        }
        select_cohort(
            course_id,
            &self.program_id,
            &self.batch_id,
            &self.students,
            &self.enrollments,
        )
    }
}

/// Final attainment of one program outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoAttainment {
    pub direct: PoDirectAttainment,
    /// The indirect text as entered, if any.
    #[serde(default)]
    pub indirect_input: Option<String>,
    pub overall: CombinedScore,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramAttainment {
    pub program_id: String,
    pub batch_id: String,
    pub weights: AttainmentWeights,
    pub courses: BTreeMap<String, CourseAttainment>,
    pub program_outcomes: BTreeMap<String, PoAttainment>,
}

impl ProgramAttainment {
    /// Computed CO levels across all courses.
    pub fn co_levels(&self) -> BTreeMap<String, AttainmentLevel> {
        self.courses
            .values()
            .flat_map(|course| course.levels())
            .collect()
    }

    pub fn direct_scores(&self) -> BTreeMap<String, f64> {
        self.program_outcomes
            .iter()
            .map(|(id, po)| (id.clone(), po.direct.score))
            .collect()
    }

    pub fn overall_scores(&self) -> BTreeMap<String, CombinedScore> {
        self.program_outcomes
            .iter()
            .map(|(id, po)| (id.clone(), po.overall))
            .collect()
    }
}

/// Run the whole pipeline: marks and questions, CO levels per course, PO
/// direct scores, then the weighted blend with indirect entries.
pub fn compute(input: &AttainmentInput) -> ProgramAttainment {
    let marks = MarkIndex::build(&input.marks);

    let mut courses = BTreeMap::new();
    for course in &input.courses {
        let cohort = input.cohort_for(&course.id);
        if cohort.student_ids.is_empty() {
            tracing::warn!(course = %course.id, "no cohort for course, skipping");
        }
        let calculator = OutcomeAttainmentCalculator::new(
            course,
            &input.course_outcomes,
            &input.assessments,
            &marks,
        );
        courses.insert(course.id.clone(), calculator.compute(&cohort.student_ids));
    }

    let levels: BTreeMap<String, AttainmentLevel> = courses
        .values()
        .flat_map(CourseAttainment::levels)
        .collect();

    let direct = OutcomeAggregator::new(&input.mappings).aggregate(&input.program_outcomes, &levels);
    let combiner = AttainmentCombiner::new(input.weights).with_default_indirect(
        input
            .default_indirect_score
            .unwrap_or(DEFAULT_INDIRECT_SCORE),
    );

    let program_outcomes: BTreeMap<String, PoAttainment> = direct
        .into_iter()
        .map(|(po_id, direct)| {
            let indirect_input = input.indirect.get(&po_id).cloned();
            let overall = combiner.combine(Some(direct.score), indirect_input.as_deref());
            (
                po_id,
                PoAttainment {
                    direct,
                    indirect_input,
                    overall,
                },
            )
        })
        .collect();

    tracing::info!(
        program = %input.program_id,
        batch = %input.batch_id,
        courses = courses.len(),
        outcomes = levels.len(),
        program_outcomes = program_outcomes.len(),
        "attainment computed"
    );

    ProgramAttainment {
        program_id: input.program_id.clone(),
        batch_id: input.batch_id.clone(),
        weights: input.weights,
        courses,
        program_outcomes,
    }
}

/// Per-outcome percentages of one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAttainment {
    pub student_id: String,
    /// Course id to CO id to percentage. Only courses whose cohort contains
    /// the student appear; `None` marks an outcome with nothing attempted.
    pub courses: BTreeMap<String, BTreeMap<String, Option<f64>>>,
}

/// Percentage obtained by `student_id` on each outcome of every course the
/// student is measured in.
pub fn student_attainment(input: &AttainmentInput, student_id: &str) -> StudentAttainment {
    let marks = MarkIndex::build(&input.marks);

    let courses: BTreeMap<String, BTreeMap<String, Option<f64>>> = input
        .courses
        .iter()
        .filter(|course| {
            input
                .cohort_for(&course.id)
                .student_ids
                .iter()
                .any(|id| id == student_id)
        })
        .map(|course| {
            let calculator = OutcomeAttainmentCalculator::new(
                course,
                &input.course_outcomes,
                &input.assessments,
                &marks,
            );
            (course.id.clone(), calculator.student_percentages(student_id))
        })
        .collect();

    if courses.is_empty() {
        tracing::warn!(student = student_id, "student is not in any course cohort");
    }

    StudentAttainment {
        student_id: student_id.to_string(),
        courses,
    }
}
