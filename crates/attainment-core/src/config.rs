//! System-wide attainment settings.
//!
//! Defaults applied when an input document leaves a course target,
//! threshold, or the weight pair unspecified.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::combiner::{AttainmentWeights, DEFAULT_INDIRECT_SCORE};
use crate::model::LevelThresholds;

/// Env var overriding the default direct weight (indirect follows as 100 - w).
pub const DIRECT_WEIGHT_ENV: &str = "ATTAINMENT_DIRECT_WEIGHT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Percentage a student needs on a CO to meet the target.
    #[serde(default = "default_co_target")]
    pub default_co_target: f64,
    #[serde(default = "default_level1")]
    pub default_level1: f64,
    #[serde(default = "default_level2")]
    pub default_level2: f64,
    #[serde(default = "default_level3")]
    pub default_level3: f64,
    /// Direct/indirect weights. Setting only one couples the other to
    /// `100 - w`; setting neither gives 80/20.
    #[serde(default)]
    pub default_weight_direct: Option<u32>,
    #[serde(default)]
    pub default_weight_indirect: Option<u32>,
    /// Indirect score assumed for a PO with no manual entry.
    #[serde(default = "default_indirect_score")]
    pub default_indirect_score: f64,
}

fn default_co_target() -> f64 {
    50.0
}
fn default_level1() -> f64 {
    50.0
}
fn default_level2() -> f64 {
    60.0
}
fn default_level3() -> f64 {
    70.0
}
fn default_indirect_score() -> f64 {
    DEFAULT_INDIRECT_SCORE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_co_target: default_co_target(),
            default_level1: default_level1(),
            default_level2: default_level2(),
            default_level3: default_level3(),
            default_weight_direct: None,
            default_weight_indirect: None,
            default_indirect_score: default_indirect_score(),
        }
    }
}

impl Settings {
    pub fn thresholds(&self) -> LevelThresholds {
        LevelThresholds::new(
            self.default_level1,
            self.default_level2,
            self.default_level3,
        )
    }

    pub fn weights(&self) -> AttainmentWeights {
        AttainmentWeights::resolve(
            self.default_weight_direct,
            self.default_weight_indirect,
            AttainmentWeights::default(),
        )
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(DIRECT_WEIGHT_ENV) {
            let direct: u32 = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid {DIRECT_WEIGHT_ENV}: '{raw}'"))?;
            let weights = AttainmentWeights::from_direct(direct);
            self.default_weight_direct = Some(weights.direct);
            self.default_weight_indirect = Some(weights.indirect);
        }
        Ok(())
    }
}

/// Load settings from the default locations.
///
/// Search order:
/// 1. `attainment.toml` in the current directory
/// 2. `~/.config/attainment/config.toml`
///
/// Falls back to built-in defaults when neither exists.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(None)
}

/// Load settings from an explicit path, or search the default locations.
pub fn load_settings_from(path: Option<&Path>) -> Result<Settings> {
    let settings_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("attainment.toml");
        if local.exists() {
            Some(local)
        } else {
            config_dir()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut settings = match settings_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<Settings>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => {
            tracing::debug!("no config file found, using defaults");
            Settings::default()
        }
    };

    settings.apply_env_overrides()?;
    Ok(settings)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("attainment"))
}
