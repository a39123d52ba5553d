//! Calibration of predicted probabilities against realised outcomes.
//!
//! Predictions are bucketed by quantile, so that every bucket holds roughly the same number of
//! samples; a well-calibrated model has each bucket's hit rate close to its mean prediction.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::PlayerId;
use crate::error::{require_finite, require_probability, RecordError, ValidationError};
use crate::market::Market;
use crate::probs::SliceExt;

pub const DEFAULT_BINS: usize = 10;

/// Predictions are kept this far from 0 and 1 when placing edges and taking logarithms.
pub const CLIP: f64 = 1e-6;

/// A settled prediction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub market: Market,
    pub player_id: PlayerId,
    pub predicted: f64,
    pub hit: bool,
}
impl Observation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_finite("predicted", self.predicted)?;
        require_probability(self.predicted)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bucket {
    pub lower: f64,
    pub upper: f64,
    pub mean_pred: f64,
    pub hit_rate: f64,
    pub samples: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub samples: usize,
    pub brier: f64,
    pub log_loss: f64,
    pub hit_rate: f64,
    pub mean_pred: f64,
}
impl Summary {
    fn compute(accepted: &[&Observation]) -> Option<Self> {
        if accepted.is_empty() {
            return None;
        }
        let brier = accepted
            .iter()
            .map(|observation| (observation.predicted - outcome(observation)).powi(2))
            .collect::<Vec<_>>()
            .mean();
        let log_loss = -accepted
            .iter()
            .map(|observation| {
                let predicted = clip(observation.predicted);
                if observation.hit {
                    predicted.ln()
                } else {
                    (1.0 - predicted).ln()
                }
            })
            .collect::<Vec<_>>()
            .mean();
        let hit_rate = accepted.iter().map(|observation| outcome(observation)).collect::<Vec<_>>().mean();
        let mean_pred = accepted.iter().map(|observation| observation.predicted).collect::<Vec<_>>().mean();
        Some(Self {
            samples: accepted.len(),
            brier,
            log_loss,
            hit_rate,
            mean_pred,
        })
    }
}

#[inline]
fn outcome(observation: &Observation) -> f64 {
    if observation.hit {
        1.0
    } else {
        0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Calibration {
    pub buckets: Vec<Bucket>,
    pub summary: Option<Summary>,
    #[serde(skip)]
    pub rejected: Vec<RecordError>,
}

#[inline]
fn clip(predicted: f64) -> f64 {
    predicted.clamp(CLIP, 1.0 - CLIP)
}

/// The `q`-quantile of `sorted`, interpolating linearly between the two nearest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (sorted.len() - 1) as f64 * q;
    let below = rank.floor() as usize;
    let above = usize::min(below + 1, sorted.len() - 1);
    let fraction = rank - below as f64;
    sorted[below] + fraction * (sorted[above] - sorted[below])
}

/// Edges at the `i / bins` quantiles of `sorted`, with repeated edges removed.
pub fn quantile_edges(sorted: &[f64], bins: usize) -> Vec<f64> {
    let mut edges: Vec<f64> = Vec::with_capacity(bins + 1);
    for i in 0..=bins {
        let edge = quantile(sorted, i as f64 / bins as f64);
        if edges.last() != Some(&edge) {
            edges.push(edge);
        }
    }
    edges
}

/// Index of the bucket holding `value`. Buckets are closed on the right; the first also includes
/// its lower edge.
fn bucket_index(edges: &[f64], value: f64) -> usize {
    let buckets = usize::max(1, edges.len() - 1);
    (0..buckets)
        .find(|&index| value <= edges[usize::min(index + 1, edges.len() - 1)])
        .unwrap_or(buckets - 1)
}

pub fn calibrate(observations: &[Observation], bins: usize) -> Calibration {
    assert!(bins > 0, "at least one bin is required");

    let mut accepted = Vec::with_capacity(observations.len());
    let mut rejected = vec![];
    for (index, observation) in observations.iter().enumerate() {
        match observation.validate() {
            Ok(()) => accepted.push(observation),
            Err(source) => {
                warn!("rejecting observation {index} ({}): {source}", observation.player_id);
                rejected.push(RecordError::Observation { index, source });
            }
        }
    }
    if accepted.is_empty() {
        return Calibration {
            buckets: vec![],
            summary: None,
            rejected,
        };
    }

    let clipped: Vec<_> = accepted.iter().map(|observation| clip(observation.predicted)).collect();
    let mut sorted = clipped.clone();
    sorted.sort_by(f64::total_cmp);
    let edges = quantile_edges(&sorted, bins);
    debug!("calibration edges: {edges:?}");

    let buckets = usize::max(1, edges.len() - 1);
    let mut predicted = vec![vec![]; buckets];
    let mut hits = vec![0_usize; buckets];
    for (observation, &value) in accepted.iter().zip(&clipped) {
        let index = bucket_index(&edges, value);
        predicted[index].push(observation.predicted);
        if observation.hit {
            hits[index] += 1;
        }
    }

    let buckets = predicted
        .iter()
        .zip(hits)
        .enumerate()
        .filter(|(_, (predicted, _))| !predicted.is_empty())
        .map(|(index, (predicted, hits))| Bucket {
            lower: edges[index],
            upper: edges[usize::min(index + 1, edges.len() - 1)],
            mean_pred: predicted.mean(),
            hit_rate: hits as f64 / predicted.len() as f64,
            samples: predicted.len(),
        })
        .collect();

    Calibration {
        buckets,
        summary: Summary::compute(&accepted),
        rejected,
    }
}

/// Calibration of each market separately, ordered by market.
pub fn by_market(observations: &[Observation], bins: usize) -> Vec<(Market, Calibration)> {
    let mut grouped: FxHashMap<Market, Vec<Observation>> = FxHashMap::default();
    for observation in observations {
        grouped.entry(observation.market).or_default().push(observation.clone());
    }
    let mut markets: Vec<_> = grouped.into_iter().collect();
    markets.sort_by_key(|(market, _)| *market);
    markets
        .into_iter()
        .map(|(market, observations)| (market, calibrate(&observations, bins)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Over;
    use crate::testing;
    use assert_float_eq::*;

    fn observation(predicted: f64, hit: bool) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            market: Market::OnePlusPoints,
            player_id: "8478402".into(),
            predicted,
            hit,
        }
    }

    #[test]
    fn quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(1.0, quantile(&sorted, 0.0));
        assert_eq!(4.0, quantile(&sorted, 1.0));
        assert_float_relative_eq!(2.5, quantile(&sorted, 0.5));
        assert_float_relative_eq!(1.3, quantile(&sorted, 0.1));
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn edges_deduplicated() {
        let sorted = [0.2, 0.2, 0.2, 0.2, 0.8];
        testing::assert_slice_f64_relative(&[0.2, 0.32, 0.8], &quantile_edges(&sorted, 5), 1e-12);
        assert_eq!(vec![0.4], quantile_edges(&[0.4, 0.4], 3));
    }

    #[test]
    fn perfect_calibration_reproduced() {
        let mut observations = vec![];
        for group in 0..10 {
            let predicted = 0.05 + 0.1 * group as f64;
            let hits = (20.0 * predicted).round() as usize;
            for sample in 0..20 {
                observations.push(observation(predicted, sample < hits));
            }
        }
        let calibration = calibrate(&observations, DEFAULT_BINS);
        assert!(calibration.rejected.is_empty());
        assert_eq!(10, calibration.buckets.len());
        let mean_preds: Vec<_> = calibration.buckets.iter().map(|bucket| bucket.mean_pred).collect();
        let hit_rates: Vec<_> = calibration.buckets.iter().map(|bucket| bucket.hit_rate).collect();
        testing::assert_slice_f64_relative(&mean_preds, &hit_rates, 1e-9);
        for bucket in &calibration.buckets {
            assert_eq!(20, bucket.samples);
            assert!(bucket.lower <= bucket.mean_pred && bucket.mean_pred <= bucket.upper, "{bucket:?}");
        }
        assert_float_relative_eq!(0.05, calibration.buckets[0].mean_pred);
        assert_float_relative_eq!(0.95, calibration.buckets[9].mean_pred);

        let summary = calibration.summary.unwrap();
        assert_eq!(200, summary.samples);
        assert_float_relative_eq!(0.5, summary.hit_rate);
        assert_float_relative_eq!(0.5, summary.mean_pred);
    }

    #[test]
    fn identical_predictions_share_one_bucket() {
        let observations = vec![observation(0.3, true), observation(0.3, false), observation(0.3, false)];
        let calibration = calibrate(&observations, DEFAULT_BINS);
        assert_eq!(1, calibration.buckets.len());
        let bucket = &calibration.buckets[0];
        assert_eq!(3, bucket.samples);
        assert_float_relative_eq!(0.3, bucket.mean_pred);
        assert_float_relative_eq!(1.0 / 3.0, bucket.hit_rate);
    }

    #[test]
    fn extremes_clipped_for_edges_but_not_means() {
        let observations = vec![observation(0.0, false), observation(1.0, true)];
        let calibration = calibrate(&observations, 2);
        assert_eq!(2, calibration.buckets.len());
        assert_eq!(CLIP, calibration.buckets[0].lower);
        assert_eq!(1.0 - CLIP, calibration.buckets[1].upper);
        assert_eq!(0.0, calibration.buckets[0].mean_pred);
        assert_eq!(1.0, calibration.buckets[1].mean_pred);

        let summary = calibration.summary.unwrap();
        assert_eq!(0.0, summary.brier);
        assert!(summary.log_loss.is_finite());
        assert!(summary.log_loss > 0.0);
    }

    #[test]
    fn invalid_predictions_rejected() {
        let observations = vec![
            observation(0.4, true),
            observation(1.2, true),
            observation(f64::NAN, false),
            observation(0.6, false),
        ];
        let calibration = calibrate(&observations, DEFAULT_BINS);
        assert_eq!(2, calibration.rejected.len());
        assert_eq!(
            RecordError::Observation {
                index: 1,
                source: ValidationError::ProbabilityOutOfRange(1.2)
            },
            calibration.rejected[0]
        );
        assert!(matches!(
            calibration.rejected[1],
            RecordError::Observation {
                index: 2,
                source: ValidationError::NonFinite { .. }
            }
        ));
        assert_eq!(2, calibration.summary.unwrap().samples);
    }

    #[test]
    fn empty_history() {
        let calibration = calibrate(&[], DEFAULT_BINS);
        assert!(calibration.buckets.is_empty());
        assert_eq!(None, calibration.summary);
    }

    #[test]
    fn summary_scores() {
        let observations = vec![observation(0.8, true), observation(0.4, false)];
        let summary = calibrate(&observations, DEFAULT_BINS).summary.unwrap();
        assert_float_relative_eq!((0.04 + 0.16) / 2.0, summary.brier);
        assert_float_relative_eq!(-(f64::ln(0.8) + f64::ln(0.6)) / 2.0, summary.log_loss);
        assert_float_relative_eq!(0.5, summary.hit_rate);
        assert_float_relative_eq!(0.6, summary.mean_pred);
    }

    #[test]
    fn grouped_by_market() {
        let observations = vec![
            Observation {
                market: Market::FirstGoal,
                ..observation(0.05, false)
            },
            observation(0.6, true),
            Observation {
                market: Market::ShotsOver(Over(2)),
                ..observation(0.55, true)
            },
            observation(0.5, false),
        ];
        let calibrations = by_market(&observations, DEFAULT_BINS);
        let markets: Vec<_> = calibrations.iter().map(|(market, _)| *market).collect();
        assert_eq!(
            vec![Market::ShotsOver(Over(2)), Market::OnePlusPoints, Market::FirstGoal],
            markets
        );
        assert_eq!(2, calibrations[1].1.summary.as_ref().unwrap().samples);
    }
}
