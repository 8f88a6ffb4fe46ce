//! Direct + indirect attainment blending.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregator::round2;

/// Indirect score assumed when none was entered for a PO.
pub const DEFAULT_INDIRECT_SCORE: f64 = 3.0;

/// Direct/indirect weights as integer percentages.
///
/// The setters keep the pair coupled so it always sums to 100. The fields
/// stay public for callers that supply their own pair; the combiner uses
/// whatever values it is given without normalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttainmentWeights {
    pub direct: u32,
    pub indirect: u32,
}

impl AttainmentWeights {
    pub fn new(direct: u32, indirect: u32) -> Self {
        Self { direct, indirect }
    }

    /// A coupled pair with the given direct weight (clamped to 100).
    pub fn from_direct(direct: u32) -> Self {
        let mut weights = Self::default();
        weights.set_direct(direct);
        weights
    }

    /// Set the direct weight; the indirect weight becomes `100 - w`.
    pub fn set_direct(&mut self, weight: u32) {
        self.direct = weight.min(100);
        self.indirect = 100 - self.direct;
    }

    /// Set the indirect weight; the direct weight becomes `100 - w`.
    pub fn set_indirect(&mut self, weight: u32) {
        self.indirect = weight.min(100);
        self.direct = 100 - self.indirect;
    }

    /// Resolve a possibly partial pair: one knob given couples the other,
    /// both given are taken as is, neither falls back to `fallback`.
    pub fn resolve(direct: Option<u32>, indirect: Option<u32>, fallback: Self) -> Self {
        match (direct, indirect) {
            (Some(direct), Some(indirect)) => Self::new(direct, indirect),
            (Some(direct), None) => Self::from_direct(direct),
            (None, Some(indirect)) => {
                let mut weights = Self::default();
                weights.set_indirect(indirect);
                weights
            }
            (None, None) => fallback,
        }
    }

    pub fn sums_to_hundred(&self) -> bool {
        self.direct.checked_add(self.indirect) == Some(100)
    }
}

impl Default for AttainmentWeights {
    fn default() -> Self {
        Self {
            direct: 80,
            indirect: 20,
        }
    }
}

impl fmt::Display for AttainmentWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% direct / {}% indirect", self.direct, self.indirect)
    }
}

/// Final attainment of a PO.
///
/// `Invalid` means the manual indirect entry was not a number; it must be
/// shown as such and never fed back into arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum CombinedScore {
    Score(f64),
    Invalid,
}

impl CombinedScore {
    pub fn value(&self) -> Option<f64> {
        match self {
            CombinedScore::Score(v) => Some(*v),
            CombinedScore::Invalid => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, CombinedScore::Invalid)
    }
}

impl fmt::Display for CombinedScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinedScore::Score(v) => write!(f, "{v:.2}"),
            CombinedScore::Invalid => write!(f, "Invalid"),
        }
    }
}

/// How a manual indirect entry was read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndirectScore {
    /// Blank or missing; the default applies.
    Defaulted(f64),
    Entered(f64),
    Unparseable,
}

impl IndirectScore {
    /// Blank or absent text takes `default`; anything else must be a
    /// finite number.
    pub fn parse(text: Option<&str>, default: f64) -> Self {
        let trimmed = text.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return IndirectScore::Defaulted(default);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => IndirectScore::Entered(value),
            _ => IndirectScore::Unparseable,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            IndirectScore::Defaulted(v) | IndirectScore::Entered(v) => Some(*v),
            IndirectScore::Unparseable => None,
        }
    }
}

/// Blends direct and indirect attainment.
#[derive(Debug, Clone, Copy)]
pub struct AttainmentCombiner {
    weights: AttainmentWeights,
    default_indirect: f64,
}

impl AttainmentCombiner {
    pub fn new(weights: AttainmentWeights) -> Self {
        Self {
            weights,
            default_indirect: DEFAULT_INDIRECT_SCORE,
        }
    }

    /// Replace the indirect score assumed for blank entries.
    pub fn with_default_indirect(mut self, default: f64) -> Self {
        self.default_indirect = default;
        self
    }

    pub fn weights(&self) -> AttainmentWeights {
        self.weights
    }

    /// `direct × direct% + indirect × indirect%`, rounded to 2 dp.
    pub fn combine(&self, direct: Option<f64>, indirect: Option<&str>) -> CombinedScore {
        let direct = direct.unwrap_or(0.0);
        let Some(indirect) = IndirectScore::parse(indirect, self.default_indirect).value() else {
            return CombinedScore::Invalid;
        };
        let overall = direct * f64::from(self.weights.direct) / 100.0
            + indirect * f64::from(self.weights.indirect) / 100.0;
        CombinedScore::Score(round2(overall))
    }
}
