//! Utilities for working with probabilities and prices.

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn mean(&self) -> f64;
    fn normalise(&mut self, target: f64) -> f64;
    fn scale(&mut self, factor: f64);
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// Arithmetic mean; `NaN` for an empty slice.
    fn mean(&self) -> f64 {
        self.sum() / self.len() as f64
    }

    fn normalise(&mut self, target: f64) -> f64 {
        let sum = self.sum();
        self.scale(target / sum);
        sum
    }

    fn scale(&mut self, factor: f64) {
        for element in self {
            *element *= factor;
        }
    }
}

#[inline]
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    f64::max(lo, f64::min(hi, value))
}

#[inline]
pub fn clamp_prob(prob: f64) -> f64 {
    clamp(prob, 0.0, 1.0)
}

/// Decimal odds at which a bet on an outcome of probability `prob` breaks even. Outcomes that
/// cannot occur are priced at [f64::INFINITY].
#[inline]
pub fn fair_odds(prob: f64) -> f64 {
    if prob <= 0.0 {
        f64::INFINITY
    } else {
        1.0 / prob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;
    use crate::testing::assert_slice_f64_near;

    #[test]
    fn sum() {
        let data = [0.0, 0.1, 0.2];
        assert_f64_near!(0.3, data.sum(), 1);
    }

    #[test]
    fn mean() {
        let data = [3.0, 4.0, 8.0];
        assert_f64_near!(5.0, data.mean());
        let empty: [f64; 0] = [];
        assert!(empty.mean().is_nan());
    }

    #[test]
    fn normalise() {
        let mut data = [0.05, 0.1, 0.15, 0.2];
        let sum = data.normalise(1.0);
        assert_f64_near!(0.5, sum, 1);
        assert_slice_f64_near(&[0.1, 0.2, 0.3, 0.4], &data, 1);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(0.0, clamp_prob(-1e-12));
        assert_eq!(1.0, clamp_prob(1.0 + 1e-12));
        assert_eq!(0.25, clamp_prob(0.25));
        assert_eq!(5.0, clamp(7.0, 1.0, 5.0));
        assert_eq!(1.0, clamp(-7.0, 1.0, 5.0));
    }

    #[test]
    fn fair_odds_sentinel() {
        assert_eq!(2.0, fair_odds(0.5));
        assert_f64_near!(4.0, fair_odds(0.25));
        assert_eq!(1.0, fair_odds(1.0));
        assert_eq!(f64::INFINITY, fair_odds(0.0));
        assert_eq!(f64::INFINITY, fair_odds(-0.1));
    }
}
