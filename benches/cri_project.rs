use criterion::{criterion_group, criterion_main, Criterion};
use rustc_hash::FxHashMap;

use nhl_picks::config::{Config, Priors, Shrinkage};
use nhl_picks::data::{Goalie, LineupSlot, PlayerRecord, PowerPlayUnit, Role, SlateInput, TeamRate};
use nhl_picks::project;

const TEAMS: usize = 32;
const SKATERS: usize = 18;

fn slate() -> SlateInput {
    let teams: Vec<_> = (0..TEAMS).map(|index| format!("T{index:02}")).collect();
    let mut players = vec![];
    let mut lineups = vec![];
    let mut team_rates = vec![];
    let mut goalies = vec![];
    let mut opponents = FxHashMap::default();
    for (team_index, team) in teams.iter().enumerate() {
        let scale = 0.8 + 0.4 * team_index as f64 / TEAMS as f64;
        for skater in 0..SKATERS {
            let player_id = format!("{team}-{skater:02}");
            let forward = skater < 12;
            players.push(PlayerRecord {
                player_id: player_id.clone(),
                team: team.clone(),
                pos: (if forward { "F" } else { "D" }).into(),
                ev_minutes: 100.0 + 60.0 * skater as f64,
                pp_minutes: 10.0 * (SKATERS - skater) as f64,
                ev_sog60: (if forward { 7.5 } else { 4.0 }) * scale,
                pp_sog60: 11.0 * scale,
                ev_g60: (if forward { 1.0 } else { 0.35 }) * scale,
                pp_g60: 2.2 * scale,
                a1_60: 0.8,
                a2_60: 0.5,
            });
            lineups.push(LineupSlot {
                player_id,
                role: Some(match (forward, skater % 12 < 6) {
                    (true, true) => Role::TopSix,
                    (true, false) => Role::BottomSix,
                    (false, true) => Role::TopFour,
                    (false, false) => Role::BottomPair,
                }),
                pp_unit: match skater {
                    0..=4 => Some(PowerPlayUnit::First),
                    5..=9 => Some(PowerPlayUnit::Second),
                    _ => None,
                },
            });
        }
        team_rates.push(TeamRate {
            team: team.clone(),
            ev_cf60: 50.0 + 10.0 * scale,
            ev_sog_for60: 28.0 * scale,
            ev_sog_against60: 31.0 / scale,
            ev_gf60: 2.5 * scale,
            ev_xga60: 2.6 / scale,
            pk_sog_against60: 50.0,
            pk_xga60: 7.0,
        });
        goalies.push(Goalie {
            team: team.clone(),
            starter_name: format!("{team} starter"),
            gsax60: scale - 1.0,
            sv: 0.905,
        });
        opponents.insert(team.clone(), teams[team_index ^ 1].clone());
    }
    SlateInput {
        players,
        lineups,
        team_rates,
        goalies,
        opponents,
    }
}

fn config() -> Config {
    Config {
        priors: Priors {
            sog_per60_forward: 7.2,
            sog_per60_defense: 4.1,
            g_per60_forward: 1.0,
            g_per60_defense: 0.4,
            a1_per60_forward: 0.9,
            a1_per60_defense: 0.5,
            a2_per60_forward: 0.5,
            a2_per60_defense: 0.3,
        },
        shrinkage: Shrinkage {
            tau_ev: 400.0,
            tau_pp: 120.0,
        },
        projection: Default::default(),
        toi: Default::default(),
        position_policy: Default::default(),
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let input = slate();
    let config = config();

    // sanity check
    let projections = project::run(input.clone(), &config).unwrap();
    assert_eq!(TEAMS * SKATERS, projections.shots.len());
    assert!(projections.errors.is_empty());

    c.bench_function("cri_project_full_slate", |b| {
        b.iter(|| project::run(input.clone(), &config).unwrap());
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
