//! Course outcome attainment.
//!
//! For one course and one cohort, classifies every course outcome into an
//! attainment tier from the share of students who reached the course target
//! on the questions that exercise it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::index::{MarkIndex, QuestionOutcomeIndex, QuestionRef};
use crate::model::{Assessment, AttainmentLevel, Course, CourseOutcome, CourseStatus};

/// Attainment of one course outcome, with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoAttainment {
    pub co_id: String,
    pub level: AttainmentLevel,
    /// Number of graded questions exercising this outcome.
    pub mapped_questions: usize,
    pub cohort_size: usize,
    pub students_meeting_target: usize,
    /// `None` when the outcome has no mapped questions.
    pub percentage_meeting_target: Option<f64>,
    /// Pooled obtained / pooled maximum over every attempted mapped question
    /// in the cohort, as a percentage. `None` when nothing was attempted.
    pub class_percentage: Option<f64>,
}

/// Outcome attainment for one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseAttainment {
    pub course_id: String,
    /// Copied from the course; not used in the calculation.
    #[serde(default)]
    pub status: CourseStatus,
    pub cohort_size: usize,
    /// Empty when the cohort is empty or the course has no outcomes. Callers
    /// must read a missing CO as "not computed", never as level 0.
    pub outcomes: BTreeMap<String, CoAttainment>,
}

impl CourseAttainment {
    pub fn levels(&self) -> BTreeMap<String, AttainmentLevel> {
        self.outcomes
            .iter()
            .map(|(id, co)| (id.clone(), co.level))
            .collect()
    }

    pub fn is_computed(&self) -> bool {
        !self.outcomes.is_empty()
    }
}

/// Running sums for one student on one outcome.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    obtained: f64,
    max: f64,
}

impl Tally {
    fn percentage(self) -> Option<f64> {
        (self.max > 0.0).then(|| self.obtained / self.max * 100.0)
    }
}

/// Computes CO attainment levels for a single course.
pub struct OutcomeAttainmentCalculator<'a> {
    course: &'a Course,
    outcome_ids: Vec<&'a str>,
    questions: QuestionOutcomeIndex,
    marks: &'a MarkIndex,
}

impl<'a> OutcomeAttainmentCalculator<'a> {
    /// `outcomes` and `assessments` may span several courses; only those
    /// belonging to `course` are used.
    pub fn new(
        course: &'a Course,
        outcomes: &'a [CourseOutcome],
        assessments: &'a [Assessment],
        marks: &'a MarkIndex,
    ) -> Self {
        let outcome_ids: Vec<&str> = outcomes
            .iter()
            .filter(|co| co.course_id == course.id)
            .map(|co| co.id.as_str())
            .collect();
        let course_assessments: Vec<&Assessment> = assessments
            .iter()
            .filter(|a| a.course_id == course.id)
            .collect();
        let questions = QuestionOutcomeIndex::build(&outcome_ids, &course_assessments);

        Self {
            course,
            outcome_ids,
            questions,
            marks,
        }
    }

    pub fn course(&self) -> &Course {
        self.course
    }

    /// Attainment of every course outcome for `cohort`. Duplicate student ids
    /// are counted once.
    pub fn compute<S: AsRef<str>>(&self, cohort: &[S]) -> CourseAttainment {
        let students: BTreeSet<&str> = cohort.iter().map(|s| s.as_ref()).collect();

        let mut outcomes = BTreeMap::new();
        if !students.is_empty() {
            for co_id in &self.outcome_ids {
                let attainment = self.outcome_attainment(co_id, &students);
                outcomes.insert(co_id.to_string(), attainment);
            }
        }

        CourseAttainment {
            course_id: self.course.id.clone(),
            status: self.course.status,
            cohort_size: students.len(),
            outcomes,
        }
    }

    fn outcome_attainment(&self, co_id: &str, students: &BTreeSet<&str>) -> CoAttainment {
        let refs = self.questions.questions(co_id);
        let cohort_size = students.len();

        if refs.is_empty() {
            tracing::debug!(course = %self.course.id, co = co_id, "no mapped questions, level 0");
            return CoAttainment {
                co_id: co_id.to_string(),
                level: AttainmentLevel::None,
                mapped_questions: 0,
                cohort_size,
                students_meeting_target: 0,
                percentage_meeting_target: None,
                class_percentage: None,
            };
        }

        let mut meeting = 0usize;
        let mut pooled = Tally::default();
        for student in students {
            let tally = self.tally(student, refs);
            pooled.obtained += tally.obtained;
            pooled.max += tally.max;
            if tally
                .percentage()
                .is_some_and(|pct| pct >= self.course.target)
            {
                meeting += 1;
            }
        }

        let percentage_meeting = meeting as f64 / cohort_size as f64 * 100.0;
        let level = self.course.thresholds.classify(percentage_meeting);

        tracing::debug!(
            course = %self.course.id,
            co = co_id,
            meeting,
            cohort_size,
            percentage_meeting,
            level = level.value(),
            "outcome classified"
        );

        CoAttainment {
            co_id: co_id.to_string(),
            level,
            mapped_questions: refs.len(),
            cohort_size,
            students_meeting_target: meeting,
            percentage_meeting_target: Some(percentage_meeting),
            class_percentage: pooled.percentage(),
        }
    }

    /// Sums over attempted questions only; unattempted ones add to neither
    /// side.
    fn tally(&self, student_id: &str, refs: &[QuestionRef]) -> Tally {
        refs.iter().fold(Tally::default(), |mut tally, r| {
            if let Some(obtained) = self.marks.get(student_id, &r.assessment_id, &r.question_id) {
                tally.obtained += obtained;
                tally.max += r.max_marks;
            }
            tally
        })
    }

    /// Per-outcome percentage for one student; `None` for outcomes the
    /// student attempted no questions of.
    pub fn student_percentages(&self, student_id: &str) -> BTreeMap<String, Option<f64>> {
        self.outcome_ids
            .iter()
            .map(|co_id| {
                let tally = self.tally(student_id, self.questions.questions(co_id));
                (co_id.to_string(), tally.percentage())
            })
            .collect()
    }
}
