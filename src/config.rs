//! Run configuration: positional priors, shrinkage constants and projection settings. Loaded once
//! at startup; any missing or invalid value fails the run before a single player is processed.

use serde::{Deserialize, Serialize};

use crate::data::{Position, PositionPolicy};
use crate::error::ConfigError;
use crate::market::Over;
use crate::pace::PaceMode;
use crate::toi::ToiTable;

/// Expected per-60 rates for an average forward and an average defenseman.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Priors {
    pub sog_per60_forward: f64,
    pub sog_per60_defense: f64,
    pub g_per60_forward: f64,
    pub g_per60_defense: f64,
    pub a1_per60_forward: f64,
    pub a1_per60_defense: f64,
    pub a2_per60_forward: f64,
    pub a2_per60_defense: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionPrior {
    pub sog60: f64,
    pub g60: f64,
    pub a1_60: f64,
    pub a2_60: f64,
}

impl Priors {
    pub fn for_position(&self, position: Position) -> PositionPrior {
        match position {
            Position::Forward => PositionPrior {
                sog60: self.sog_per60_forward,
                g60: self.g_per60_forward,
                a1_60: self.a1_per60_forward,
                a2_60: self.a2_per60_forward,
            },
            Position::Defense => PositionPrior {
                sog60: self.sog_per60_defense,
                g60: self.g_per60_defense,
                a1_60: self.a1_per60_defense,
                a2_60: self.a2_per60_defense,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("sog_per60_forward", self.sog_per60_forward),
            ("sog_per60_defense", self.sog_per60_defense),
            ("g_per60_forward", self.g_per60_forward),
            ("g_per60_defense", self.g_per60_defense),
            ("a1_per60_forward", self.a1_per60_forward),
            ("a1_per60_defense", self.a1_per60_defense),
            ("a2_per60_forward", self.a2_per60_forward),
            ("a2_per60_defense", self.a2_per60_defense),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidPrior { name, value });
            }
        }
        Ok(())
    }
}

/// Minutes at which the observed rate and the prior carry equal weight, for even strength and the
/// power play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shrinkage {
    pub tau_ev: f64,
    pub tau_pp: f64,
}
impl Shrinkage {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("tau_ev", self.tau_ev), ("tau_pp", self.tau_pp)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidShrinkage { name, value });
            }
        }
        Ok(())
    }
}

pub const DEFAULT_BETA_GSAX: f64 = -0.35;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Sensitivity of expected goals to the opposing starter's GSAx/60. Negative, so that a goalie
    /// saving more than expected suppresses scoring.
    #[serde(default = "default_beta_gsax")]
    pub beta_gsax: f64,

    #[serde(default)]
    pub pace_mode: PaceMode,

    /// Shots-on-goal line to price.
    #[serde(default)]
    pub shots_over: Over,
}

fn default_beta_gsax() -> f64 {
    DEFAULT_BETA_GSAX
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            beta_gsax: DEFAULT_BETA_GSAX,
            pace_mode: PaceMode::default(),
            shots_over: Over::default(),
        }
    }
}

impl ProjectionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.beta_gsax.is_finite() {
            return Err(ConfigError::InvalidBetaGsax(self.beta_gsax));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub priors: Priors,
    pub shrinkage: Shrinkage,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub toi: ToiTable,
    #[serde(default)]
    pub position_policy: PositionPolicy,
}
impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.priors.validate()?;
        self.shrinkage.validate()?;
        self.projection.validate()?;
        self.toi.validate()?;
        Ok(())
    }
}
