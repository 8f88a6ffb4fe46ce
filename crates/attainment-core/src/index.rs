//! Lookup indexes over raw marks and question-outcome links.
//!
//! Both indexes are plain values built per invocation from the inputs; they
//! hold no state between runs.

use std::collections::{BTreeMap, HashMap};

use crate::model::{Assessment, StudentMark};

/// `(student, assessment, question) -> obtained marks`.
#[derive(Debug, Clone, Default)]
pub struct MarkIndex {
    marks: HashMap<String, HashMap<String, HashMap<String, f64>>>,
}

impl MarkIndex {
    /// Build from mark records. A later record for the same
    /// student/assessment/question replaces an earlier one.
    pub fn build(records: &[StudentMark]) -> Self {
        let mut marks: HashMap<String, HashMap<String, HashMap<String, f64>>> = HashMap::new();
        for record in records {
            let questions = marks
                .entry(record.student_id.clone())
                .or_default()
                .entry(record.assessment_id.clone())
                .or_default();
            for score in &record.scores {
                questions.insert(score.q.clone(), score.marks);
            }
        }
        Self { marks }
    }

    /// Obtained marks, or `None` when the question was not attempted.
    /// `Some(0.0)` means attempted and scored zero.
    pub fn get(&self, student_id: &str, assessment_id: &str, question_id: &str) -> Option<f64> {
        self.marks
            .get(student_id)?
            .get(assessment_id)?
            .get(question_id)
            .copied()
    }
}

/// One graded question that exercises a course outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRef {
    pub assessment_id: String,
    pub question_id: String,
    pub max_marks: f64,
}

/// `CO id -> questions exercising it`, across a course's assessments.
///
/// A question mapped to several COs is listed under each of them with its
/// full marks.
#[derive(Debug, Clone, Default)]
pub struct QuestionOutcomeIndex {
    by_outcome: BTreeMap<String, Vec<QuestionRef>>,
}

impl QuestionOutcomeIndex {
    /// Build from a course's CO ids and its assessments. Every listed CO gets
    /// an entry, even with no questions.
    pub fn build<S: AsRef<str>>(co_ids: &[S], assessments: &[&Assessment]) -> Self {
        let mut by_outcome: BTreeMap<String, Vec<QuestionRef>> = co_ids
            .iter()
            .map(|id| (id.as_ref().to_string(), Vec::new()))
            .collect();

        for assessment in assessments {
            for question in &assessment.questions {
                for co_id in &question.co_ids {
                    by_outcome
                        .entry(co_id.clone())
                        .or_default()
                        .push(QuestionRef {
                            assessment_id: assessment.id.clone(),
                            question_id: question.q.clone(),
                            max_marks: question.max_marks,
                        });
                }
            }
        }

        Self { by_outcome }
    }

    /// Questions for a CO; empty for COs with none or unknown COs.
    pub fn questions(&self, co_id: &str) -> &[QuestionRef] {
        self.by_outcome
            .get(co_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
