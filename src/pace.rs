//! Matchup pace and opponent-strength scaling, both relative to the league averages of the slate
//! being projected.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::data::TeamRate;
use crate::error::SlateError;
use crate::probs::SliceExt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceMode {
    /// Symmetric under a swap of teams, and damps outliers multiplicatively.
    #[default]
    Geometric,
    Arithmetic,
}

/// Column means over the slate's team table, recomputed for every run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeagueAverages {
    pub ev_cf60: f64,
    pub ev_sog_against60: f64,
    pub pk_sog_against60: f64,
    pub ev_xga60: f64,
    pub pk_xga60: f64,
}
impl LeagueAverages {
    pub fn compute(team_rates: &[TeamRate]) -> Result<Self, SlateError> {
        if team_rates.is_empty() {
            return Err(SlateError::EmptyTeamRates);
        }
        let column = |f: fn(&TeamRate) -> f64| team_rates.iter().map(f).collect::<Vec<_>>().mean();
        Ok(Self {
            ev_cf60: column(|team| team.ev_cf60),
            ev_sog_against60: column(|team| team.ev_sog_against60),
            pk_sog_against60: column(|team| team.pk_sog_against60),
            ev_xga60: column(|team| team.ev_xga60),
            pk_xga60: column(|team| team.pk_xga60),
        })
    }
}

/// `value` relative to the league average. A degenerate (non-positive) average carries no
/// information, so the ratio is taken as neutral.
#[inline]
pub fn relative(value: f64, league: f64) -> f64 {
    if league > 0.0 {
        value / league
    } else {
        1.0
    }
}

pub fn pace_factor(team: &TeamRate, opponent: &TeamRate, league: &LeagueAverages, mode: PaceMode) -> f64 {
    let a = relative(team.ev_cf60, league.ev_cf60);
    let b = relative(opponent.ev_cf60, league.ev_cf60);
    match mode {
        PaceMode::Geometric => f64::sqrt(a * b),
        PaceMode::Arithmetic => (a + b) / 2.0,
    }
}
