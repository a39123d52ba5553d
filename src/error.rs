//! Error taxonomy. Record-level errors ([ValidationError], [MissingTeamDataError]) exclude only the
//! affected rows and are collected into a [Batch](crate::data::Batch); [ConfigError] and
//! [SlateError] abort the run before any player is processed.

use thiserror::Error;

use crate::data::{PlayerId, Team};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid position '{0}'")]
pub struct InvalidPosition(pub String);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("negative minutes {0}")]
    NegativeMinutes(f64),

    #[error("negative {name} {value}")]
    NegativeValue { name: &'static str, value: f64 },

    #[error("non-finite {name} {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("probability {0} outside [0, 1]")]
    ProbabilityOutOfRange(f64),

    #[error("no expected time on ice")]
    MissingToi,

    #[error("{0}")]
    InvalidPosition(#[from] InvalidPosition),
}

pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite { name, value })
    }
}

pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64, ValidationError> {
    require_finite(name, value)?;
    if value < 0.0 {
        Err(ValidationError::NegativeValue { name, value })
    } else {
        Ok(value)
    }
}

pub(crate) fn require_probability(value: f64) -> Result<f64, ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::ProbabilityOutOfRange(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissingTeamDataError {
    #[error("no team rates for {0}")]
    TeamRate(Team),

    #[error("no starting goalie for {0}")]
    Goalie(Team),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("player {player_id}: {source}")]
    Player {
        player_id: PlayerId,
        source: ValidationError,
    },

    #[error("team {team} excluded: {source}")]
    Team {
        team: Team,
        source: MissingTeamDataError,
    },

    #[error("{table} row for {team} rejected: {source}")]
    TeamRow {
        table: &'static str,
        team: Team,
        source: ValidationError,
    },

    #[error("observation {index}: {source}")]
    Observation {
        index: usize,
        source: ValidationError,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("prior {name} must be a non-negative number, got {value}")]
    InvalidPrior { name: &'static str, value: f64 },

    #[error("shrinkage constant {name} must be positive, got {value}")]
    InvalidShrinkage { name: &'static str, value: f64 },

    #[error("{name} must be a non-negative number, got {value}")]
    InvalidToi { name: &'static str, value: f64 },

    #[error("beta_gsax must be finite, got {0}")]
    InvalidBetaGsax(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlateError {
    #[error("{0} is paired with itself")]
    SelfPairing(Team),

    #[error("{team} is paired with {opponent}, but {opponent} is paired with {reciprocal:?}")]
    AsymmetricPairing {
        team: Team,
        opponent: Team,
        reciprocal: Option<Team>,
    },

    #[error("duplicate team rates for {0}")]
    DuplicateTeamRate(Team),

    #[error("duplicate starting goalie for {0}")]
    DuplicateGoalie(Team),

    #[error("no usable team rates in slate")]
    EmptyTeamRates,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Slate(#[from] SlateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_error_display() {
        let err = RecordError::Player {
            player_id: "8478402".into(),
            source: ValidationError::NegativeMinutes(-3.0),
        };
        assert_eq!("player 8478402: negative minutes -3", err.to_string());

        let err = RecordError::Team {
            team: "BOS".into(),
            source: MissingTeamDataError::Goalie("NYI".into()),
        };
        assert_eq!("team BOS excluded: no starting goalie for NYI", err.to_string());
    }

    #[test]
    fn requirements() {
        assert_eq!(Ok(0.0), require_non_negative("rate", 0.0));
        assert_eq!(
            Err(ValidationError::NegativeValue { name: "rate", value: -0.1 }),
            require_non_negative("rate", -0.1)
        );
        assert!(matches!(
            require_non_negative("rate", f64::NAN),
            Err(ValidationError::NonFinite { name: "rate", .. })
        ));
        assert_eq!(Ok(1.0), require_probability(1.0));
        assert_eq!(
            Err(ValidationError::ProbabilityOutOfRange(1.01)),
            require_probability(1.01)
        );
    }
}
