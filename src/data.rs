//! The canonical slate tables and the adapter that validates raw input rows before they reach the
//! projection core.

use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use tracing::warn;

use crate::error::{
    require_finite, require_non_negative, require_probability, InvalidPosition, RecordError,
    SlateError, ValidationError,
};

pub type PlayerId = String;
pub type Team = String;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "F")]
    Forward,
    #[serde(rename = "D")]
    Defense,
}

impl FromStr for Position {
    type Err = InvalidPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "F" | "FORWARD" => Ok(Position::Forward),
            "D" | "DEFENSE" | "DEFENCE" => Ok(Position::Defense),
            _ => Err(InvalidPosition(s.to_string())),
        }
    }
}

/// What to do with a position that is neither forward nor defense.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionPolicy {
    /// Reject the player.
    #[default]
    Strict,

    /// Treat the player as a forward, logging every substitution.
    DefaultToForward,
}
impl PositionPolicy {
    pub fn resolve(&self, player_id: &str, raw: &str) -> Result<Position, InvalidPosition> {
        match Position::from_str(raw) {
            Ok(position) => Ok(position),
            Err(err) => match self {
                PositionPolicy::Strict => Err(err),
                PositionPolicy::DefaultToForward => {
                    warn!("player {player_id}: unrecognised position '{raw}', treating as forward");
                    Ok(Position::Forward)
                }
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Display, EnumIter, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "top6")]
    TopSix,
    #[serde(rename = "bottom6")]
    BottomSix,
    #[serde(rename = "top4D")]
    TopFour,
    #[serde(rename = "bottom_pair")]
    BottomPair,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum PowerPlayUnit {
    #[serde(rename = "PP1")]
    First,
    #[serde(rename = "PP2")]
    Second,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupSlot {
    pub player_id: PlayerId,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub pp_unit: Option<PowerPlayUnit>,
}
impl LineupSlot {
    pub fn is_pp1(&self) -> bool {
        self.pp_unit == Some(PowerPlayUnit::First)
    }
}

/// A player row as supplied by the ingestion collaborator, before its position is resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub team: Team,
    pub pos: String,
    pub ev_minutes: f64,
    pub pp_minutes: f64,
    pub ev_sog60: f64,
    pub pp_sog60: f64,
    pub ev_g60: f64,
    pub pp_g60: f64,
    pub a1_60: f64,
    pub a2_60: f64,
}
impl PlayerRecord {
    pub fn adapt(self, policy: PositionPolicy) -> Result<PlayerRate, ValidationError> {
        let position = policy.resolve(&self.player_id, &self.pos)?;
        let rate = PlayerRate {
            player_id: self.player_id,
            team: self.team,
            position,
            ev_minutes: self.ev_minutes,
            pp_minutes: self.pp_minutes,
            ev_sog60: self.ev_sog60,
            pp_sog60: self.pp_sog60,
            ev_g60: self.ev_g60,
            pp_g60: self.pp_g60,
            a1_60: self.a1_60,
            a2_60: self.a2_60,
        };
        rate.validate()?;
        Ok(rate)
    }
}

/// Observed per-60 rates and the minutes they were observed over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerRate {
    pub player_id: PlayerId,
    pub team: Team,
    pub position: Position,
    pub ev_minutes: f64,
    pub pp_minutes: f64,
    pub ev_sog60: f64,
    pub pp_sog60: f64,
    pub ev_g60: f64,
    pub pp_g60: f64,
    pub a1_60: f64,
    pub a2_60: f64,
}
impl PlayerRate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for minutes in [self.ev_minutes, self.pp_minutes] {
            require_finite("minutes", minutes)?;
            if minutes < 0.0 {
                return Err(ValidationError::NegativeMinutes(minutes));
            }
        }
        require_non_negative("ev_sog60", self.ev_sog60)?;
        require_non_negative("pp_sog60", self.pp_sog60)?;
        require_non_negative("ev_g60", self.ev_g60)?;
        require_non_negative("pp_g60", self.pp_g60)?;
        require_non_negative("a1_60", self.a1_60)?;
        require_non_negative("a2_60", self.a2_60)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamRate {
    pub team: Team,
    pub ev_cf60: f64,
    pub ev_sog_for60: f64,
    pub ev_sog_against60: f64,
    pub ev_gf60: f64,
    pub ev_xga60: f64,
    pub pk_sog_against60: f64,
    pub pk_xga60: f64,
}
impl TeamRate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_negative("ev_cf60", self.ev_cf60)?;
        require_non_negative("ev_sog_for60", self.ev_sog_for60)?;
        require_non_negative("ev_sog_against60", self.ev_sog_against60)?;
        require_non_negative("ev_gf60", self.ev_gf60)?;
        require_non_negative("ev_xga60", self.ev_xga60)?;
        require_non_negative("pk_sog_against60", self.pk_sog_against60)?;
        require_non_negative("pk_xga60", self.pk_xga60)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Goalie {
    pub team: Team,
    pub starter_name: String,
    pub gsax60: f64,
    pub sv: f64,
}
impl Goalie {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_finite("gsax60", self.gsax60)?;
        require_probability(self.sv)?;
        Ok(())
    }
}

/// Symmetric pairing of every team on the slate with its opponent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpponentMap {
    pairings: FxHashMap<Team, Team>,
}
impl OpponentMap {
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, SlateError>
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<Team>,
    {
        let mut pairings = FxHashMap::default();
        for (team, opponent) in pairs {
            let (team, opponent) = (team.into(), opponent.into());
            insert_pairing(&mut pairings, team.clone(), opponent.clone())?;
            insert_pairing(&mut pairings, opponent, team)?;
        }
        Ok(Self { pairings })
    }

    pub fn opponent(&self, team: &str) -> Option<&str> {
        self.pairings.get(team).map(String::as_str)
    }

    /// Each matchup once, with the lexicographically lower team first, in sorted order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self
            .pairings
            .iter()
            .filter(|(team, opponent)| team < opponent)
            .map(|(team, opponent)| (team.as_str(), opponent.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    pub fn len(&self) -> usize {
        self.pairings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }
}

fn insert_pairing(
    pairings: &mut FxHashMap<Team, Team>,
    team: Team,
    opponent: Team,
) -> Result<(), SlateError> {
    if team == opponent {
        return Err(SlateError::SelfPairing(team));
    }
    match pairings.get(&team) {
        Some(existing) if *existing != opponent => Err(SlateError::AsymmetricPairing {
            team: opponent,
            opponent: team,
            reciprocal: Some(existing.clone()),
        }),
        _ => {
            pairings.insert(team, opponent);
            Ok(())
        }
    }
}

impl TryFrom<FxHashMap<Team, Team>> for OpponentMap {
    type Error = SlateError;

    fn try_from(pairings: FxHashMap<Team, Team>) -> Result<Self, Self::Error> {
        let mut teams: Vec<_> = pairings.keys().collect();
        teams.sort_unstable();
        for team in teams {
            let opponent = &pairings[team];
            if team == opponent {
                return Err(SlateError::SelfPairing(team.clone()));
            }
            match pairings.get(opponent) {
                Some(reciprocal) if reciprocal == team => {}
                reciprocal => {
                    return Err(SlateError::AsymmetricPairing {
                        team: team.clone(),
                        opponent: opponent.clone(),
                        reciprocal: reciprocal.cloned(),
                    })
                }
            }
        }
        Ok(Self { pairings })
    }
}

/// Rows that survived processing, alongside the records that were excluded.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch<T> {
    pub rows: Vec<T>,
    pub errors: Vec<RecordError>,
}
impl<T> Batch<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            errors: vec![],
        }
    }
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self {
            rows: vec![],
            errors: vec![],
        }
    }
}

/// The raw slate, as handed over by the ingestion collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlateInput {
    pub players: Vec<PlayerRecord>,
    #[serde(default)]
    pub lineups: Vec<LineupSlot>,
    pub team_rates: Vec<TeamRate>,
    pub goalies: Vec<Goalie>,
    pub opponents: FxHashMap<Team, Team>,
}

/// Input tables in canonical form.
#[derive(Clone, Debug, PartialEq)]
pub struct Tables {
    pub players: Batch<PlayerRate>,
    pub lineups: FxHashMap<PlayerId, LineupSlot>,
    pub team_rates: Vec<TeamRate>,
    pub goalies: Vec<Goalie>,
    pub opponents: OpponentMap,
}

impl SlateInput {
    pub fn adapt(self, policy: PositionPolicy) -> Result<Tables, SlateError> {
        let opponents = OpponentMap::try_from(self.opponents)?;

        let mut players = Batch::with_capacity(self.players.len());
        for record in self.players {
            let player_id = record.player_id.clone();
            match record.adapt(policy) {
                Ok(rate) => players.rows.push(rate),
                Err(source) => {
                    warn!("rejecting player {player_id}: {source}");
                    players.errors.push(RecordError::Player { player_id, source });
                }
            }
        }

        let mut lineups = FxHashMap::default();
        for slot in self.lineups {
            if let Some(previous) = lineups.insert(slot.player_id.clone(), slot) {
                warn!("duplicate lineup slot for {}, keeping the last", previous.player_id);
            }
        }

        Ok(Tables {
            players,
            lineups,
            team_rates: self.team_rates,
            goalies: self.goalies,
            opponents,
        })
    }
}
