//! Testing helpers and fixtures.

use assert_float_eq::*;
use rustc_hash::FxHashMap;

use crate::config::{Config, Priors, ProjectionConfig, Shrinkage};
use crate::data::{
    Goalie, LineupSlot, PlayerRate, PlayerRecord, Position, PositionPolicy, PowerPlayUnit, Role,
    SlateInput, TeamRate,
};
use crate::stabilize::StabilizedRate;
use crate::toi::{ExpectedToi, ToiTable};

pub fn assert_slice_f64_near(expected: &[f64], actual: &[f64], distance: u32) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_f64_near!(expected, actual, distance);
        }
    }
}

pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_relative_eq!(expected, actual, epsilon);
        }
    }
}

pub fn priors() -> Priors {
    Priors {
        sog_per60_forward: 7.2,
        sog_per60_defense: 4.1,
        g_per60_forward: 1.0,
        g_per60_defense: 0.4,
        a1_per60_forward: 0.9,
        a1_per60_defense: 0.5,
        a2_per60_forward: 0.5,
        a2_per60_defense: 0.3,
    }
}

pub fn shrinkage() -> Shrinkage {
    Shrinkage {
        tau_ev: 400.0,
        tau_pp: 120.0,
    }
}

pub fn config() -> Config {
    Config {
        priors: priors(),
        shrinkage: shrinkage(),
        projection: ProjectionConfig::default(),
        toi: ToiTable::default(),
        position_policy: PositionPolicy::Strict,
    }
}

pub fn player(player_id: &str, team: &str, position: Position) -> PlayerRate {
    PlayerRate {
        player_id: player_id.into(),
        team: team.into(),
        position,
        ev_minutes: 600.0,
        pp_minutes: 100.0,
        ev_sog60: 8.0,
        pp_sog60: 12.0,
        ev_g60: 1.0,
        pp_g60: 2.0,
        a1_60: 0.8,
        a2_60: 0.5,
    }
}

pub fn stabilized(player_id: &str, team: &str, is_pp1: bool) -> StabilizedRate {
    StabilizedRate {
        player_id: player_id.into(),
        team: team.into(),
        position: Position::Forward,
        is_pp1,
        ev_minutes: 600.0,
        pp_minutes: 100.0,
        ev_sog60: 8.0,
        pp_sog60: 12.0,
        ev_g60: 1.0,
        pp_g60: 2.0,
        a1_60: 0.8,
        a2_60: 0.5,
    }
}

pub fn expected_toi(players: &[StabilizedRate], ev: f64, pp: f64) -> FxHashMap<String, ExpectedToi> {
    players
        .iter()
        .map(|player| {
            (
                player.player_id.clone(),
                ExpectedToi {
                    player_id: player.player_id.clone(),
                    ev,
                    pp,
                },
            )
        })
        .collect()
}

pub fn pp1_slot(player_id: &str) -> LineupSlot {
    LineupSlot {
        player_id: player_id.into(),
        role: Some(Role::TopSix),
        pp_unit: Some(PowerPlayUnit::First),
    }
}

pub fn team_rate(team: &str) -> TeamRate {
    TeamRate {
        team: team.into(),
        ev_cf60: 56.0,
        ev_sog_for60: 30.0,
        ev_sog_against60: 30.0,
        ev_gf60: 2.6,
        ev_xga60: 2.5,
        pk_sog_against60: 50.0,
        pk_xga60: 7.0,
    }
}

pub fn goalie(team: &str, gsax60: f64) -> Goalie {
    Goalie {
        team: team.into(),
        starter_name: format!("{team} starter"),
        gsax60,
        sv: 0.905,
    }
}

fn record(player_id: &str, team: &str, pos: &str, ev_minutes: f64, ev_sog60: f64, ev_g60: f64) -> PlayerRecord {
    PlayerRecord {
        player_id: player_id.into(),
        team: team.into(),
        pos: pos.into(),
        ev_minutes,
        pp_minutes: ev_minutes / 6.0,
        ev_sog60,
        pp_sog60: ev_sog60 * 1.4,
        ev_g60,
        pp_g60: ev_g60 * 1.8,
        a1_60: 0.8,
        a2_60: 0.4,
    }
}

/// Two games (BOS–NYI, COL–TBL) with three players a side.
pub fn slate_input() -> SlateInput {
    let mut players = vec![];
    let mut lineups = vec![];
    for (index, team) in ["BOS", "NYI", "COL", "TBL"].into_iter().enumerate() {
        let scale = 1.0 + index as f64 * 0.1;
        players.push(record(&format!("{team}-F1"), team, "F", 900.0, 9.0 * scale, 1.2 * scale));
        players.push(record(&format!("{team}-F2"), team, "F", 250.0, 6.0 * scale, 0.6 * scale));
        players.push(record(&format!("{team}-D1"), team, "D", 1_100.0, 5.0 * scale, 0.3 * scale));
        lineups.push(pp1_slot(&format!("{team}-F1")));
        lineups.push(LineupSlot {
            player_id: format!("{team}-D1"),
            role: Some(Role::TopFour),
            pp_unit: Some(PowerPlayUnit::Second),
        });
    }
    let team_rates = vec![
        TeamRate {
            ev_cf60: 60.0,
            ..team_rate("BOS")
        },
        TeamRate {
            ev_cf60: 52.0,
            ev_xga60: 2.8,
            ..team_rate("NYI")
        },
        TeamRate {
            ev_cf60: 58.0,
            ev_gf60: 3.1,
            ..team_rate("COL")
        },
        TeamRate {
            ev_cf60: 54.0,
            pk_sog_against60: 46.0,
            ..team_rate("TBL")
        },
    ];
    let goalies = vec![
        goalie("BOS", 0.4),
        goalie("NYI", -0.2),
        goalie("COL", 0.0),
        goalie("TBL", 0.6),
    ];
    let mut opponents = FxHashMap::default();
    for (team, opponent) in [("BOS", "NYI"), ("NYI", "BOS"), ("COL", "TBL"), ("TBL", "COL")] {
        opponents.insert(team.to_string(), opponent.to_string());
    }
    SlateInput {
        players,
        lineups,
        team_rates,
        goalies,
        opponents,
    }
}
