//! Synthetic history. Outcomes are drawn from the projected distributions themselves over a run of
//! dated slates, producing settled [Observation]s on which the calibration evaluator can be
//! exercised end to end.

use chrono::{Duration, NaiveDate};
use rustc_hash::FxHashMap;
use tinyrand::{Rand, Seeded, StdRand};
use tracing::debug;

use crate::calibration::Observation;
use crate::market::Market;
use crate::poisson;
use crate::project::first_goal::FirstGoalProjection;
use crate::project::Projections;

/// Upper bound on a sampled count.
pub const MAX_COUNT: u32 = 60;

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub days: u32,
    pub seed: u64,
    /// Date of the last simulated slate.
    pub end: NaiveDate,
}

#[inline]
fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}

/// Draws a Poisson count with mean `lambda` by inversion.
pub fn sample_poisson(lambda: f64, rand: &mut impl Rand) -> u32 {
    let random = random_f64(rand);
    let mut cumulative = poisson::univariate(0, lambda);
    let mut count = 0;
    while random > cumulative && count < MAX_COUNT {
        count += 1;
        cumulative += poisson::univariate(count, lambda);
    }
    count
}

/// Picks at most one row; none if the draw lands in the probability mass not covered by `rows`.
fn pick_first_scorer(rows: &[&FirstGoalProjection], rand: &mut impl Rand) -> Option<usize> {
    let random = random_f64(rand);
    let mut cumulative = 0.0;
    for (index, row) in rows.iter().enumerate() {
        cumulative += row.prob;
        if cumulative >= random {
            return Some(index);
        }
    }
    None
}

fn matchups(rows: &[FirstGoalProjection]) -> Vec<Vec<&FirstGoalProjection>> {
    let mut by_matchup: FxHashMap<(&str, &str), Vec<&FirstGoalProjection>> = FxHashMap::default();
    for row in rows {
        let key = if row.team < row.opponent {
            (row.team.as_str(), row.opponent.as_str())
        } else {
            (row.opponent.as_str(), row.team.as_str())
        };
        by_matchup.entry(key).or_default().push(row);
    }
    let mut matchups: Vec<_> = by_matchup.into_iter().collect();
    matchups.sort_by(|(a, _), (b, _)| a.cmp(b));
    matchups.into_iter().map(|(_, rows)| rows).collect()
}

/// Replays the same slate for `config.days` consecutive days, settling every projected market.
pub fn simulate(projections: &Projections, config: &SimulationConfig) -> Vec<Observation> {
    let mut rand = StdRand::seed(config.seed);
    let matchups = matchups(&projections.first_goal);
    let per_day = projections.shots.len() + 2 * projections.points.len() + projections.first_goal.len();
    let mut observations = Vec::with_capacity(config.days as usize * per_day);

    for day in 0..config.days {
        let date = config.end - Duration::days(i64::from(config.days - 1 - day));

        for row in &projections.shots {
            let shots = sample_poisson(row.mean, &mut rand);
            observations.push(Observation {
                date,
                market: Market::ShotsOver(row.over),
                player_id: row.player_id.clone(),
                predicted: row.prob_over,
                hit: shots >= row.over.threshold(),
            });
        }

        for row in &projections.points {
            let points = sample_poisson(row.mean, &mut rand);
            for (market, predicted, hit) in [
                (Market::OnePlusPoints, row.prob_1p, points >= 1),
                (Market::TwoPlusPoints, row.prob_2p, points >= 2),
            ] {
                observations.push(Observation {
                    date,
                    market,
                    player_id: row.player_id.clone(),
                    predicted,
                    hit,
                });
            }
        }

        for rows in &matchups {
            let scorer = pick_first_scorer(rows, &mut rand);
            for (index, row) in rows.iter().enumerate() {
                observations.push(Observation {
                    date,
                    market: Market::FirstGoal,
                    player_id: row.player_id.clone(),
                    predicted: row.prob,
                    hit: scorer == Some(index),
                });
            }
        }
    }
    debug!("simulated {} observations over {} days", observations.len(), config.days);
    observations
}
