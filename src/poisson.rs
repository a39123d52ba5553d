//! Poisson probabilities, accumulated term by term from `e^-λ`. Adequate for the means seen in
//! per-game player counts (λ up to about 20, k up to about 30).

/// P(X = k).
pub fn univariate(k: u32, lambda: f64) -> f64 {
    let mut term = f64::exp(-lambda);
    for i in 1..=k {
        term *= lambda / i as f64;
    }
    term
}

/// P(X ≤ k).
pub fn cdf(k: u32, lambda: f64) -> f64 {
    let mut term = f64::exp(-lambda);
    let mut sum = term;
    for i in 1..=k {
        term *= lambda / i as f64;
        sum += term;
    }
    sum.clamp(0.0, 1.0)
}

/// P(X ≥ ⌊line⌋ + 1); for an 'over _N_.5' line this is the probability that the over lands.
pub fn prob_at_least(line: f64, lambda: f64) -> f64 {
    let floor = line.floor();
    if floor < 0.0 {
        return 1.0;
    }
    (1.0 - cdf(floor as u32, lambda)).clamp(0.0, 1.0)
}
