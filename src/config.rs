//! Evolution constants.
//!
//! The transfer rates and stage multipliers of the game's evolution
//! arithmetic, plus the lineage validation mode. Every field has a default
//! matching live game behavior, so a config file only lists overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Tunable evolution arithmetic.
///
/// # Examples
///
/// ```rust
/// use evostat::EvolutionConstants;
///
/// let constants = EvolutionConstants::from_toml_str(
///     "legacy_character_ids = [250]\nstrict_lineage = false\n",
/// )
/// .unwrap();
/// assert_eq!(constants.legacy_character_ids, vec![250]);
/// assert!(!constants.strict_lineage);
/// assert_eq!(constants.material_transfer_rate, 0.15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConstants {
    /// Share of each evolution material's stat carried into the result.
    #[serde(default = "default_material_transfer_rate")]
    pub material_transfer_rate: f64,
    /// Share of each amalgamation material's stat added to the result.
    #[serde(default = "default_amalgamation_transfer_rate")]
    pub amalgamation_transfer_rate: f64,
    /// Number of material shares a turnover accident result receives.
    #[serde(default = "default_turnover_material_count")]
    pub turnover_material_count: i64,
    /// Rank 1 of a single-stage line.
    #[serde(default = "default_single_stage_multiplier")]
    pub single_stage_multiplier: f64,
    /// Terminal stage of a multi-stage line.
    #[serde(default = "default_final_stage_multiplier")]
    pub final_stage_multiplier: f64,
    /// Any other stage.
    #[serde(default = "default_intermediate_stage_multiplier")]
    pub intermediate_stage_multiplier: f64,
    #[serde(default = "default_legacy_final_stage_multiplier")]
    pub legacy_final_stage_multiplier: f64,
    #[serde(default = "default_legacy_intermediate_stage_multiplier")]
    pub legacy_intermediate_stage_multiplier: f64,
    /// Characters whose lines use the legacy multipliers.
    #[serde(default = "default_legacy_character_ids")]
    pub legacy_character_ids: Vec<u32>,
    /// Four-star lines use the first stage's stored stat in place of the
    /// card's own when combining.
    #[serde(default)]
    pub four_star_uses_first_evo_stat: bool,
    /// Reject cards with more than one applicable predecessor edge. When
    /// off, the highest-precedence edge is kept and a warning is logged.
    #[serde(default = "default_strict_lineage")]
    pub strict_lineage: bool,
}

impl Default for EvolutionConstants {
    fn default() -> Self {
        EvolutionConstants {
            material_transfer_rate: default_material_transfer_rate(),
            amalgamation_transfer_rate: default_amalgamation_transfer_rate(),
            turnover_material_count: default_turnover_material_count(),
            single_stage_multiplier: default_single_stage_multiplier(),
            final_stage_multiplier: default_final_stage_multiplier(),
            intermediate_stage_multiplier: default_intermediate_stage_multiplier(),
            legacy_final_stage_multiplier: default_legacy_final_stage_multiplier(),
            legacy_intermediate_stage_multiplier: default_legacy_intermediate_stage_multiplier(),
            legacy_character_ids: default_legacy_character_ids(),
            four_star_uses_first_evo_stat: false,
            strict_lineage: default_strict_lineage(),
        }
    }
}

fn default_material_transfer_rate() -> f64 {
    0.15
}
fn default_amalgamation_transfer_rate() -> f64 {
    0.08
}
fn default_turnover_material_count() -> i64 {
    2
}
fn default_single_stage_multiplier() -> f64 {
    1.0
}
fn default_final_stage_multiplier() -> f64 {
    1.1
}
fn default_intermediate_stage_multiplier() -> f64 {
    1.05
}
// queen of ice, strategist
fn default_legacy_final_stage_multiplier() -> f64 {
    1.209
}
fn default_legacy_intermediate_stage_multiplier() -> f64 {
    1.155
}
fn default_legacy_character_ids() -> Vec<u32> {
    vec![250, 315]
}
fn default_strict_lineage() -> bool {
    true
}

impl EvolutionConstants {
    /// Parse and validate constants from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let constants: EvolutionConstants = toml::from_str(content)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Load and validate constants from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check rates and multipliers are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rates = [
            ("material_transfer_rate", self.material_transfer_rate),
            ("amalgamation_transfer_rate", self.amalgamation_transfer_rate),
        ];
        for (name, rate) in rates {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be a non-negative number, got {rate}"
                )));
            }
        }

        let multipliers = [
            ("single_stage_multiplier", self.single_stage_multiplier),
            ("final_stage_multiplier", self.final_stage_multiplier),
            ("intermediate_stage_multiplier", self.intermediate_stage_multiplier),
            ("legacy_final_stage_multiplier", self.legacy_final_stage_multiplier),
            (
                "legacy_intermediate_stage_multiplier",
                self.legacy_intermediate_stage_multiplier,
            ),
        ];
        for (name, multiplier) in multipliers {
            if !multiplier.is_finite() || multiplier < 1.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be at least 1.0, got {multiplier}"
                )));
            }
        }

        if self.turnover_material_count < 0 {
            return Err(ConfigError::ValidationError(format!(
                "turnover_material_count must not be negative, got {}",
                self.turnover_material_count
            )));
        }
        Ok(())
    }

    /// `true` when `character_id` uses the legacy stage multipliers.
    pub fn is_legacy_character(&self, character_id: Option<u32>) -> bool {
        character_id.is_some_and(|id| self.legacy_character_ids.contains(&id))
    }
}
