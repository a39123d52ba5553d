//! Shots on goal.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::ProjectionConfig;
use crate::data::{Batch, PlayerId, Team};
use crate::market::Over;
use crate::pace;
use crate::pace::LeagueAverages;
use crate::poisson;
use crate::probs;
use crate::project::{project_by_team, Matchup, Slate, MIN_MEAN};
use crate::stabilize::StabilizedRate;
use crate::toi::ExpectedToi;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotProjection {
    pub player_id: PlayerId,
    pub team: Team,
    pub opponent: Team,
    pub mean: f64,
    pub over: Over,
    pub prob_over: f64,
    pub fair_odds_over: f64,
}

/// Expected shots on goal: the even-strength rate scaled by pace and the opponent's shot
/// suppression, plus the power-play rate scaled by the opponent's penalty kill.
pub fn mean_shots(
    rate: &StabilizedRate,
    toi: &ExpectedToi,
    matchup: &Matchup,
    league: &LeagueAverages,
) -> f64 {
    let ev = rate.ev_sog60
        * (toi.ev / 60.0)
        * matchup.pace
        * pace::relative(matchup.opponent.ev_sog_against60, league.ev_sog_against60);
    let pp = rate.pp_sog60
        * (toi.pp / 60.0)
        * pace::relative(matchup.opponent.pk_sog_against60, league.pk_sog_against60);
    f64::max(MIN_MEAN, ev + pp)
}

pub fn project(
    players: &[StabilizedRate],
    toi: &FxHashMap<PlayerId, ExpectedToi>,
    slate: &Slate,
    config: &ProjectionConfig,
) -> Batch<ShotProjection> {
    let over = config.shots_over;
    project_by_team(
        players,
        toi,
        slate,
        |team, opponent| slate.matchup(team, opponent, config.pace_mode),
        |rate, toi, opponent, matchup| {
            let mean = mean_shots(rate, toi, matchup, slate.league());
            let prob_over = probs::clamp_prob(poisson::prob_at_least(over.line(), mean));
            ShotProjection {
                player_id: rate.player_id.clone(),
                team: rate.team.clone(),
                opponent: opponent.to_string(),
                mean,
                over,
                prob_over,
                fair_odds_over: probs::fair_odds(prob_over),
            }
        },
    )
}
