//! Program outcome direct attainment.
//!
//! Folds computed CO levels through the weighted CO-PO matrix into one
//! direct score per program outcome.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{AttainmentLevel, CoPoMapping, ProgramOutcome};

/// Direct attainment of one program outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoDirectAttainment {
    pub po_id: String,
    /// Strength-weighted mean of contributing CO levels, rounded to 2 dp.
    /// `0.0` when nothing contributed.
    pub score: f64,
    /// Mapped edges whose CO had a computed level.
    pub contributing_mappings: usize,
    pub total_weight: i64,
}

impl PoDirectAttainment {
    /// `false` when the score is `0.0` only because no mapped CO had data.
    pub fn has_data(&self) -> bool {
        self.contributing_mappings > 0
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregates CO levels into PO direct scores.
pub struct OutcomeAggregator<'a> {
    mappings: &'a [CoPoMapping],
}

impl<'a> OutcomeAggregator<'a> {
    pub fn new(mappings: &'a [CoPoMapping]) -> Self {
        Self { mappings }
    }

    /// Direct score of a single PO. COs absent from `levels` are skipped,
    /// not counted as zero.
    pub fn direct_attainment(
        &self,
        po_id: &str,
        levels: &BTreeMap<String, AttainmentLevel>,
    ) -> PoDirectAttainment {
        let mut weighted_sum = 0i64;
        let mut total_weight = 0i64;
        let mut contributing = 0usize;

        for mapping in self
            .mappings
            .iter()
            .filter(|m| m.po_id == po_id && m.is_mapped())
        {
            let Some(level) = levels.get(&mapping.co_id) else {
                continue;
            };
            let strength = i64::from(mapping.strength);
            weighted_sum += i64::from(level.value()) * strength;
            total_weight += strength;
            contributing += 1;
        }

        let score = if total_weight > 0 {
            round2(weighted_sum as f64 / total_weight as f64)
        } else {
            0.0
        };

        tracing::debug!(po = po_id, contributing, total_weight, score, "po aggregated");

        PoDirectAttainment {
            po_id: po_id.to_string(),
            score,
            contributing_mappings: contributing,
            total_weight,
        }
    }

    /// Direct scores for every listed PO, plus any PO that only appears in
    /// the mapping matrix.
    pub fn aggregate(
        &self,
        program_outcomes: &[ProgramOutcome],
        levels: &BTreeMap<String, AttainmentLevel>,
    ) -> BTreeMap<String, PoDirectAttainment> {
        let mut po_ids: Vec<&str> = program_outcomes.iter().map(|po| po.id.as_str()).collect();
        po_ids.extend(self.mappings.iter().map(|m| m.po_id.as_str()));

        po_ids
            .into_iter()
            .map(|po_id| (po_id.to_string(), self.direct_attainment(po_id, levels)))
            .collect()
    }
}
