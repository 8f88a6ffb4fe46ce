//! Attainment report types with JSON persistence and baseline comparison.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::ProgramAttainment;

/// A complete attainment report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttainmentReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Input document the report was computed from, if any.
    #[serde(default)]
    pub source: Option<String>,
    pub attainment: ProgramAttainment,
}

impl AttainmentReport {
    pub fn new(attainment: ProgramAttainment, source: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source,
            attainment,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttainmentReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let a = &self.attainment;
        let mut md = String::new();

        md.push_str(&format!(
            "## Attainment: {} (batch {})\n\n",
            a.program_id, a.batch_id
        ));
        md.push_str(&format!("**Weights:** {}\n\n", a.weights));

        md.push_str("### Course outcomes\n\n");
        md.push_str("| Course | Status | CO | Level | Meeting target | Class % |\n");
        md.push_str("|--------|--------|----|-------|----------------|---------|\n");
        for course in a.courses.values() {
            if !course.is_computed() {
                md.push_str(&format!(
                    "| {} | {} | - | not computed | - | - |\n",
                    course.course_id, course.status
                ));
                continue;
            }
            for co in course.outcomes.values() {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    course.course_id,
                    course.status,
                    co.co_id,
                    co.level,
                    co.percentage_meeting_target
                        .map(|p| format!("{p:.1}% ({}/{})", co.students_meeting_target, co.cohort_size))
                        .unwrap_or_else(|| "no questions".to_string()),
                    co.class_percentage
                        .map(|p| format!("{p:.1}%"))
                        .unwrap_or_else(|| "-".to_string()),
                ));
            }
        }
        md.push('\n');

        md.push_str("### Program outcomes\n\n");
        md.push_str("| PO | Direct | Indirect | Overall |\n");
        md.push_str("|----|--------|----------|---------|\n");
        for (po_id, po) in &a.program_outcomes {
            let direct = if po.direct.has_data() {
                format!("{:.2}", po.direct.score)
            } else {
                format!("{:.2} (no data)", po.direct.score)
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                po_id,
                direct,
                po.indirect_input
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or("default"),
                po.overall
            ));
        }

        md
    }

    /// Compare this report against a baseline to detect regressions in the
    /// overall PO scores. Outcomes that are `Invalid` on either side are
    /// counted separately, never compared numerically.
    pub fn compare(&self, baseline: &AttainmentReport, threshold: f64) -> ComparisonReport {
        let baseline_scores = baseline.attainment.overall_scores();
        let current_scores = self.attainment.overall_scores();

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut invalid = 0usize;
        let mut new_outcomes = 0usize;

        for (po_id, current) in &current_scores {
            let Some(base) = baseline_scores.get(po_id) else {
                new_outcomes += 1;
                continue;
            };
            let (Some(current), Some(base)) = (current.value(), base.value()) else {
                invalid += 1;
                continue;
            };
            let delta = current - base;
            let change = ScoreChange {
                po_id: po_id.clone(),
                baseline_score: base,
                current_score: current,
                delta,
            };
            if delta < -threshold {
                regressions.push(change);
            } else if delta > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed_outcomes = baseline_scores
            .keys()
            .filter(|k| !current_scores.contains_key(*k))
            .count();

        ComparisonReport {
            regressions,
            improvements,
            unchanged,
            invalid,
            new_outcomes,
            removed_outcomes,
        }
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Outcomes whose overall score went down.
    pub regressions: Vec<ScoreChange>,
    /// Outcomes whose overall score went up.
    pub improvements: Vec<ScoreChange>,
    /// Outcomes with no significant change.
    pub unchanged: usize,
    /// Outcomes that are `Invalid` in either report.
    pub invalid: usize,
    /// Outcomes in current but not baseline.
    pub new_outcomes: usize,
    /// Outcomes in baseline but not current.
    pub removed_outcomes: usize,
}

/// A change in one PO's overall score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreChange {
    pub po_id: String,
    pub baseline_score: f64,
    pub current_score: f64,
    pub delta: f64,
}

impl ComparisonReport {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        let sections = [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ];

        for (title, changes) in sections {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| PO | Baseline | Current | Delta |\n");
            md.push_str("|----|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {:.2} | {:.2} | {:+.2} |\n",
                    c.po_id, c.baseline_score, c.current_score, c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if there are any regressions.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}
