//! Expected ice time for the upcoming game, from a player's role in the lineup and power-play
//! deployment. The minutes are heuristic point estimates rather than measurements; every value in
//! [ToiTable] may be tuned through configuration.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{LineupSlot, PlayerId, PlayerRate, Position, PowerPlayUnit, Role};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToiTable {
    pub forward_top_six_ev: f64,
    pub forward_ev: f64,
    pub defense_top_four_ev: f64,
    pub defense_ev: f64,
    pub pp1: f64,
    pub forward_pp: f64,
    pub defense_pp: f64,
}

impl Default for ToiTable {
    fn default() -> Self {
        Self {
            forward_top_six_ev: 15.5,
            forward_ev: 12.0,
            defense_top_four_ev: 18.0,
            defense_ev: 14.0,
            pp1: 3.2,
            forward_pp: 1.2,
            defense_pp: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedToi {
    pub player_id: PlayerId,
    pub ev: f64,
    pub pp: f64,
}

impl ToiTable {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("forward_top_six_ev", self.forward_top_six_ev),
            ("forward_ev", self.forward_ev),
            ("defense_top_four_ev", self.defense_top_four_ev),
            ("defense_ev", self.defense_ev),
            ("pp1", self.pp1),
            ("forward_pp", self.forward_pp),
            ("defense_pp", self.defense_pp),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidToi { name, value });
            }
        }
        Ok(())
    }

    /// Even-strength minutes. A role that does not apply to the position (or no role at all) falls
    /// back to the positional default.
    pub fn even_strength(&self, position: Position, role: Option<Role>) -> f64 {
        match (position, role) {
            (Position::Forward, Some(Role::TopSix)) => self.forward_top_six_ev,
            (Position::Forward, _) => self.forward_ev,
            (Position::Defense, Some(Role::TopFour)) => self.defense_top_four_ev,
            (Position::Defense, _) => self.defense_ev,
        }
    }

    pub fn power_play(&self, position: Position, pp_unit: Option<PowerPlayUnit>) -> f64 {
        match (position, pp_unit) {
            (_, Some(PowerPlayUnit::First)) => self.pp1,
            (Position::Forward, _) => self.forward_pp,
            (Position::Defense, _) => self.defense_pp,
        }
    }

    pub fn estimate(&self, player_id: &str, position: Position, slot: Option<&LineupSlot>) -> ExpectedToi {
        let (role, pp_unit) = match slot {
            None => {
                debug!("no lineup slot for {player_id}, using {position} defaults");
                (None, None)
            }
            Some(slot) => (slot.role, slot.pp_unit),
        };
        ExpectedToi {
            player_id: player_id.to_string(),
            ev: self.even_strength(position, role),
            pp: self.power_play(position, pp_unit),
        }
    }
}

/// Expected ice time for every player, keyed by player ID. Never fails: players missing from the
/// lineup receive their positional defaults.
pub fn estimate_all(
    players: &[PlayerRate],
    lineups: &FxHashMap<PlayerId, LineupSlot>,
    table: &ToiTable,
) -> FxHashMap<PlayerId, ExpectedToi> {
    players
        .iter()
        .map(|player| {
            let toi = table.estimate(&player.player_id, player.position, lineups.get(&player.player_id));
            (player.player_id.clone(), toi)
        })
        .collect()
}
