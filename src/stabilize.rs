//! Shrinkage of observed per-60 rates toward positional priors. A player's observed rate is
//! weighted by `minutes / (minutes + τ)`, so small samples lean on the prior and large samples
//! converge on what was observed.

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{PositionPrior, Priors, Shrinkage};
use crate::data::{Batch, LineupSlot, PlayerId, PlayerRate, Position, Team};
use crate::error::{RecordError, ValidationError};

/// Floor on the power-play shot prior; shot rates with the man advantage run structurally higher
/// than at even strength.
pub const PP_SOG_PRIOR_FLOOR: f64 = 6.5;

/// Power-play goal prior as a multiple of the even-strength goal prior.
pub const PP_GOAL_PRIOR_MULTIPLIER: f64 = 1.5;

/// Shrinkage-adjusted ('starred') rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilizedRate {
    pub player_id: PlayerId,
    pub team: Team,
    pub position: Position,
    pub is_pp1: bool,
    pub ev_minutes: f64,
    pub pp_minutes: f64,
    pub ev_sog60: f64,
    pub pp_sog60: f64,
    pub ev_g60: f64,
    pub pp_g60: f64,
    pub a1_60: f64,
    pub a2_60: f64,
}

/// Weight of the observed rate, in `[0, 1]`. `tau` is assumed positive, as enforced by
/// [Shrinkage::validate].
pub fn compute_weight(minutes: f64, tau: f64) -> Result<f64, ValidationError> {
    if !minutes.is_finite() {
        return Err(ValidationError::NonFinite {
            name: "minutes",
            value: minutes,
        });
    }
    if minutes < 0.0 {
        return Err(ValidationError::NegativeMinutes(minutes));
    }
    Ok((minutes / (minutes + tau)).clamp(0.0, 1.0))
}

#[inline]
pub fn blend(weight: f64, observed: f64, prior: f64) -> f64 {
    weight * observed + (1.0 - weight) * prior
}

impl PositionPrior {
    pub fn pp_sog60(&self) -> f64 {
        f64::max(self.sog60, PP_SOG_PRIOR_FLOOR)
    }

    pub fn pp_g60(&self) -> f64 {
        self.g60 * PP_GOAL_PRIOR_MULTIPLIER
    }
}

pub fn stabilize(
    player: &PlayerRate,
    is_pp1: bool,
    priors: &Priors,
    shrinkage: &Shrinkage,
) -> Result<StabilizedRate, ValidationError> {
    player.validate()?;
    let prior = priors.for_position(player.position);
    let w_ev = compute_weight(player.ev_minutes, shrinkage.tau_ev)?;
    let w_pp = compute_weight(player.pp_minutes, shrinkage.tau_pp)?;
    Ok(StabilizedRate {
        player_id: player.player_id.clone(),
        team: player.team.clone(),
        position: player.position,
        is_pp1,
        ev_minutes: player.ev_minutes,
        pp_minutes: player.pp_minutes,
        ev_sog60: blend(w_ev, player.ev_sog60, prior.sog60),
        pp_sog60: blend(w_pp, player.pp_sog60, prior.pp_sog60()),
        ev_g60: blend(w_ev, player.ev_g60, prior.g60),
        pp_g60: blend(w_pp, player.pp_g60, prior.pp_g60()),
        a1_60: blend(w_ev, player.a1_60, prior.a1_60),
        a2_60: blend(w_ev, player.a2_60, prior.a2_60),
    })
}

/// Stabilises every player, taking power-play unit membership from the lineup. Invalid players
/// are excluded and reported.
pub fn stabilize_all(
    players: &[PlayerRate],
    lineups: &FxHashMap<PlayerId, LineupSlot>,
    priors: &Priors,
    shrinkage: &Shrinkage,
) -> Batch<StabilizedRate> {
    let mut batch = Batch::with_capacity(players.len());
    for player in players {
        let is_pp1 = lineups
            .get(&player.player_id)
            .map(LineupSlot::is_pp1)
            .unwrap_or(false);
        match stabilize(player, is_pp1, priors, shrinkage) {
            Ok(rate) => batch.rows.push(rate),
            Err(source) => {
                warn!("cannot stabilise rates for {}: {source}", player.player_id);
                batch.errors.push(RecordError::Player {
                    player_id: player.player_id.clone(),
                    source,
                });
            }
        }
    }
    debug!("stabilised {} of {} players", batch.rows.len(), players.len());
    batch
}
