//! Projections of NHL player output (shots on goal, points, first goalscorer) from team- and
//! player-level rate statistics. Observed per-60 rates are stabilised by shrinking them toward
//! positional priors, scaled by expected ice time, matchup pace and opponent strength, and finally
//! converted into probabilities and fair prices using Poisson models.

#![allow(clippy::too_many_arguments)]

pub mod backtest;
pub mod calibration;
pub mod config;
pub mod data;
pub mod error;
pub mod file;
pub mod market;
pub mod pace;
pub mod poisson;
pub mod print;
pub mod probs;
pub mod project;
pub mod stabilize;
pub mod toi;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
