//! First goalscorer. Each side of a matchup is given a first-goal rate; the two rates are split
//! as competing risks into the probability of scoring first, which is then shared among the team's
//! players by their goal rate and early-game usage.

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::warn;

use crate::config::ProjectionConfig;
use crate::data::{Batch, Goalie, PlayerId, Team, TeamRate};
use crate::error::{MissingTeamDataError, RecordError};
use crate::pace;
use crate::pace::LeagueAverages;
use crate::probs;
use crate::probs::SliceExt;
use crate::project::Slate;
use crate::stabilize::StabilizedRate;

/// Decay of a team's first-goal rate per unit of the opposing starter's GSAx/60.
pub const GSAX_DECAY: f64 = 0.3;

/// Approximate even-strength minutes played in the first ten minutes of a game.
pub const EARLY_EV_MINUTES: f64 = 8.0;

/// Additional early minutes for a first-unit power-play player.
pub const EARLY_PP1_MINUTES: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstGoalProjection {
    pub player_id: PlayerId,
    pub team: Team,
    pub opponent: Team,
    pub team_prob: f64,
    pub share: f64,
    pub prob: f64,
    pub fair_odds: f64,
}

pub fn team_rate(
    team: &TeamRate,
    opponent: &TeamRate,
    opponent_goalie: &Goalie,
    league: &LeagueAverages,
    pace: f64,
) -> f64 {
    team.ev_gf60
        * pace::relative(opponent.ev_xga60, league.ev_xga60)
        * f64::exp(-GSAX_DECAY * opponent_goalie.gsax60)
        * pace
}

/// Probability of each side scoring first; an even split when neither side is expected to score.
pub fn split(rate: f64, opponent_rate: f64) -> (f64, f64) {
    let total = rate + opponent_rate;
    if total > 0.0 {
        let prob = probs::clamp_prob(rate / total);
        (prob, 1.0 - prob)
    } else {
        (0.5, 0.5)
    }
}

#[inline]
pub fn early_minutes(is_pp1: bool) -> f64 {
    if is_pp1 {
        EARLY_EV_MINUTES + EARLY_PP1_MINUTES
    } else {
        EARLY_EV_MINUTES
    }
}

/// Each player's share of the team's first goal, proportional to `ev_g60 × early minutes`. If no
/// player carries any weight, the share is spread evenly.
pub fn shares(players: &[&StabilizedRate]) -> Vec<f64> {
    let mut weights: Vec<_> = players
        .iter()
        .map(|player| player.ev_g60 * early_minutes(player.is_pp1))
        .collect();
    if weights.sum() > 0.0 {
        weights.normalise(1.0);
        weights
    } else {
        vec![1.0 / players.len() as f64; players.len()]
    }
}

fn team_probs(slate: &Slate, team: &str, opponent: &str, config: &ProjectionConfig) -> Result<(f64, f64), MissingTeamDataError> {
    let matchup = slate.matchup(team, opponent, config.pace_mode)?;
    let goalie = slate.goalie(team)?;
    let opponent_goalie = slate.goalie(opponent)?;
    let rate = team_rate(matchup.team, matchup.opponent, opponent_goalie, slate.league(), matchup.pace);
    let opponent_rate = team_rate(matchup.opponent, matchup.team, goalie, slate.league(), matchup.pace);
    Ok(split(rate, opponent_rate))
}

pub fn project(players: &[StabilizedRate], slate: &Slate, config: &ProjectionConfig) -> Batch<FirstGoalProjection> {
    let mut by_team: FxHashMap<&str, Vec<&StabilizedRate>> = FxHashMap::default();
    for player in players {
        by_team.entry(player.team.as_str()).or_default().push(player);
    }

    let mut batch = Batch::with_capacity(players.len());
    for (team, opponent) in slate.opponents().pairs() {
        let (prob, opponent_prob) = match team_probs(slate, team, opponent, config) {
            Ok(probs) => probs,
            Err(source) => {
                for excluded in [team, opponent] {
                    if by_team.contains_key(excluded) {
                        warn!("excluding {excluded} from first goal: {source}");
                        batch.errors.push(RecordError::Team {
                            team: excluded.to_string(),
                            source: source.clone(),
                        });
                    }
                }
                continue;
            }
        };

        for (team, opponent, team_prob) in [(team, opponent, prob), (opponent, team, opponent_prob)] {
            let Some(team_players) = by_team.get(team) else {
                continue;
            };
            for (player, share) in team_players.iter().zip(shares(team_players)) {
                let prob = team_prob * share;
                batch.rows.push(FirstGoalProjection {
                    player_id: player.player_id.clone(),
                    team: team.to_string(),
                    opponent: opponent.to_string(),
                    team_prob,
                    share,
                    prob,
                    fair_odds: probs::fair_odds(prob),
                });
            }
        }
    }
    batch
}
