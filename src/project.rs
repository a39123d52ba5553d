//! The projection engine. Each projector is a pure function of the stabilised player rates, the
//! expected ice time and the read-only [Slate]; nothing is carried between runs.
//!
//! A team whose own (or whose opponent's) rates or starting goalie are missing is excluded from
//! the affected market and reported as a [RecordError::Team]; the rest of the slate is unaffected.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::data::{Batch, Goalie, OpponentMap, SlateInput, Team, TeamRate};
use crate::error::{MissingTeamDataError, RecordError, RunError, SlateError, ValidationError};
use crate::pace;
use crate::pace::{LeagueAverages, PaceMode};
use crate::stabilize;
use crate::stabilize::StabilizedRate;
use crate::toi;
use crate::toi::ExpectedToi;

pub mod first_goal;
pub mod points;
pub mod shots;


/// Floor on every projected Poisson mean; a mean of exactly zero is degenerate.
pub const MIN_MEAN: f64 = 0.01;

/// Team-level tables for one slate.
#[derive(Debug, Clone)]
pub struct Slate {
    team_rates: FxHashMap<Team, TeamRate>,
    goalies: FxHashMap<Team, Goalie>,
    opponents: OpponentMap,
    league: LeagueAverages,

    /// Team and goalie rows that failed validation and were left out of the slate.
    pub rejected: Vec<RecordError>,
}
impl Slate {
    pub fn new(team_rates: Vec<TeamRate>, goalies: Vec<Goalie>, opponents: OpponentMap) -> Result<Self, SlateError> {
        let mut rejected = vec![];

        let mut seen = FxHashSet::default();
        let mut team_rates_by_team = FxHashMap::default();
        for team_rate in team_rates {
            if !seen.insert(team_rate.team.clone()) {
                return Err(SlateError::DuplicateTeamRate(team_rate.team));
            }
            if let Err(source) = team_rate.validate() {
                warn!("rejecting team rates for {}: {source}", team_rate.team);
                rejected.push(RecordError::TeamRow {
                    table: "team_rates",
                    team: team_rate.team,
                    source,
                });
                continue;
            }
            team_rates_by_team.insert(team_rate.team.clone(), team_rate);
        }

        seen.clear();
        let mut goalies_by_team = FxHashMap::default();
        for goalie in goalies {
            if !seen.insert(goalie.team.clone()) {
                return Err(SlateError::DuplicateGoalie(goalie.team));
            }
            if let Err(source) = goalie.validate() {
                warn!("rejecting goalie {} for {}: {source}", goalie.starter_name, goalie.team);
                rejected.push(RecordError::TeamRow {
                    table: "goalies",
                    team: goalie.team,
                    source,
                });
                continue;
            }
            goalies_by_team.insert(goalie.team.clone(), goalie);
        }

        let league = LeagueAverages::compute(&team_rates_by_team.values().cloned().collect::<Vec<_>>())?;
        debug!("league averages: {league:?}");
        Ok(Self {
            team_rates: team_rates_by_team,
            goalies: goalies_by_team,
            opponents,
            league,
            rejected,
        })
    }

    pub fn team_rate(&self, team: &str) -> Result<&TeamRate, MissingTeamDataError> {
        self.team_rates
            .get(team)
            .ok_or_else(|| MissingTeamDataError::TeamRate(team.to_string()))
    }

    pub fn goalie(&self, team: &str) -> Result<&Goalie, MissingTeamDataError> {
        self.goalies
            .get(team)
            .ok_or_else(|| MissingTeamDataError::Goalie(team.to_string()))
    }

    pub fn opponents(&self) -> &OpponentMap {
        &self.opponents
    }

    pub fn league(&self) -> &LeagueAverages {
        &self.league
    }

    /// Rates of both teams and the pace of their game.
    pub fn matchup(&self, team: &str, opponent: &str, mode: PaceMode) -> Result<Matchup, MissingTeamDataError> {
        let team = self.team_rate(team)?;
        let opponent = self.team_rate(opponent)?;
        let pace = pace::pace_factor(team, opponent, &self.league, mode);
        Ok(Matchup { team, opponent, pace })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Matchup<'a> {
    pub team: &'a TeamRate,
    pub opponent: &'a TeamRate,
    pub pace: f64,
}

/// Runs `project` over every player whose team has an opponent on the slate. The team-level
/// context is resolved once per team; a team whose context cannot be resolved is excluded
/// wholesale.
pub(crate) fn project_by_team<'a, C, T>(
    players: &'a [StabilizedRate],
    toi: &FxHashMap<String, ExpectedToi>,
    slate: &'a Slate,
    mut context: impl FnMut(&'a str, &'a str) -> Result<C, MissingTeamDataError>,
    mut project: impl FnMut(&StabilizedRate, &ExpectedToi, &'a str, &C) -> T,
) -> Batch<T> {
    let mut batch = Batch::with_capacity(players.len());
    let mut contexts: FxHashMap<&str, Option<(&str, C)>> = FxHashMap::default();
    for player in players {
        let team = player.team.as_str();
        let resolved = contexts.entry(team).or_insert_with(|| {
            let opponent = slate.opponents().opponent(team)?;
            match context(team, opponent) {
                Ok(resolved) => Some((opponent, resolved)),
                Err(source) => {
                    warn!("excluding {team}: {source}");
                    batch.errors.push(RecordError::Team {
                        team: team.to_string(),
                        source,
                    });
                    None
                }
            }
        });
        let Some((opponent, team_context)) = resolved.as_ref() else {
            continue;
        };
        match toi.get(&player.player_id) {
            None => batch.errors.push(RecordError::Player {
                player_id: player.player_id.clone(),
                source: ValidationError::MissingToi,
            }),
            Some(expected_toi) => batch.rows.push(project(player, expected_toi, *opponent, team_context)),
        }
    }
    batch
}

/// The three projection tables for a slate, plus every record that was left out along the way.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Projections {
    pub shots: Vec<shots::ShotProjection>,
    pub points: Vec<points::PointProjection>,
    pub first_goal: Vec<first_goal::FirstGoalProjection>,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<RecordError>,
}
impl Projections {
    fn absorb_errors(&mut self, errors: Vec<RecordError>) {
        for error in errors {
            if !self.errors.contains(&error) {
                self.errors.push(error);
            }
        }
    }
}

fn serialize_errors<S: serde::Serializer>(errors: &[RecordError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

/// Projects every market for a slate. Configuration and slate-level problems are fatal; anything
/// wrong with an individual player or team only removes the affected rows.
pub fn run(input: SlateInput, config: &Config) -> Result<Projections, RunError> {
    config.validate()?;
    let tables = input.adapt(config.position_policy)?;
    let slate = Slate::new(tables.team_rates, tables.goalies, tables.opponents)?;

    let stabilized = stabilize::stabilize_all(&tables.players.rows, &tables.lineups, &config.priors, &config.shrinkage);
    let toi = toi::estimate_all(&tables.players.rows, &tables.lineups, &config.toi);

    let shots = shots::project(&stabilized.rows, &toi, &slate, &config.projection);
    let points = points::project(&stabilized.rows, &toi, &slate, &config.projection);
    let first_goal = first_goal::project(&stabilized.rows, &slate, &config.projection);

    let mut projections = Projections::default();
    projections.absorb_errors(tables.players.errors);
    projections.absorb_errors(slate.rejected.clone());
    projections.absorb_errors(stabilized.errors);
    projections.absorb_errors(shots.errors);
    projections.absorb_errors(points.errors);
    projections.absorb_errors(first_goal.errors);
    projections.shots = shots.rows;
    projections.points = points.rows;
    projections.first_goal = first_goal.rows;
    info!(
        "projected {} shot, {} point and {} first-goal rows; {} records excluded",
        projections.shots.len(),
        projections.points.len(),
        projections.first_goal.len(),
        projections.errors.len()
    );
    Ok(projections)
}
