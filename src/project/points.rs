//! Points (goals plus primary and secondary assists).

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::ProjectionConfig;
use crate::data::{Batch, Goalie, PlayerId, Team};
use crate::pace;
use crate::pace::LeagueAverages;
use crate::poisson;
use crate::probs;
use crate::project::{project_by_team, Matchup, Slate, MIN_MEAN};
use crate::stabilize::StabilizedRate;
use crate::toi::ExpectedToi;

/// Weight of a power-play minute, relative to an even-strength minute, as an assist opportunity.
pub const PP_ASSIST_WEIGHT: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointProjection {
    pub player_id: PlayerId,
    pub team: Team,
    pub opponent: Team,
    pub mean_goals: f64,
    pub mean_assists: f64,
    pub mean: f64,
    pub prob_1p: f64,
    pub prob_2p: f64,
    pub fair_odds_1p: f64,
    pub fair_odds_2p: f64,
}

/// Multiplier on expected goals for the opposing starter. With a negative `beta_gsax`, a goalie
/// saving more than expected suppresses scoring.
#[inline]
pub fn goalie_factor(beta_gsax: f64, gsax60: f64) -> f64 {
    f64::exp(beta_gsax * gsax60)
}

pub fn mean_goals(
    rate: &StabilizedRate,
    toi: &ExpectedToi,
    matchup: &Matchup,
    league: &LeagueAverages,
    goalie_factor: f64,
) -> f64 {
    let ev = rate.ev_g60
        * (toi.ev / 60.0)
        * pace::relative(matchup.opponent.ev_xga60, league.ev_xga60)
        * matchup.pace
        * goalie_factor;
    let pp = rate.pp_g60
        * (toi.pp / 60.0)
        * pace::relative(matchup.opponent.pk_xga60, league.pk_xga60)
        * goalie_factor;
    ev + pp
}

pub fn mean_assists(rate: &StabilizedRate, toi: &ExpectedToi) -> f64 {
    (rate.a1_60 + rate.a2_60) * ((toi.ev + PP_ASSIST_WEIGHT * toi.pp) / 60.0)
}

struct Context<'a> {
    matchup: Matchup<'a>,
    opponent_goalie: &'a Goalie,
}

pub fn project(
    players: &[StabilizedRate],
    toi: &FxHashMap<PlayerId, ExpectedToi>,
    slate: &Slate,
    config: &ProjectionConfig,
) -> Batch<PointProjection> {
    project_by_team(
        players,
        toi,
        slate,
        |team, opponent| {
            Ok(Context {
                matchup: slate.matchup(team, opponent, config.pace_mode)?,
                opponent_goalie: slate.goalie(opponent)?,
            })
        },
        |rate, toi, opponent, context| {
            let goalie_factor = goalie_factor(config.beta_gsax, context.opponent_goalie.gsax60);
            let mean_goals = mean_goals(rate, toi, &context.matchup, slate.league(), goalie_factor);
            let mean_assists = mean_assists(rate, toi);
            let mean = f64::max(MIN_MEAN, mean_goals + mean_assists);
            let prob_1p = probs::clamp_prob(poisson::prob_at_least(0.5, mean));
            let prob_2p = probs::clamp_prob(poisson::prob_at_least(1.5, mean));
            PointProjection {
                player_id: rate.player_id.clone(),
                team: rate.team.clone(),
                opponent: opponent.to_string(),
                mean_goals,
                mean_assists,
                mean,
                prob_1p,
                prob_2p,
                fair_odds_1p: probs::fair_odds(prob_1p),
                fair_odds_2p: probs::fair_odds(prob_2p),
            }
        },
    )
}
