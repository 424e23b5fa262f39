// =============================================================================
// Score Analytics — smoothing, anomalies, standardisation, sampling
// =============================================================================
//
// Works on a plain series of composite scores in insertion order (see
// `SignalScorer::scores`). Nothing here mutates the store.
//
// Formulas:
//   moving average  MA_i = mean(x_i .. x_{i+window-1})
//   smoothing       S_0  = x_0,  S_i = alpha * x_i + (1 - alpha) * S_{i-1}
//   z-score         z_i  = (x_i - mean) / s      (s = sample std dev, n - 1)
//   anomaly         |x_i - mean| > threshold * s
//
// Degenerate input never panics: too-short series give empty output, and a
// zero standard deviation gives no anomalies and all-zero z-scores.
// =============================================================================

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::types::Metrics;

/// Standard deviations from the mean beyond which a score is an outlier.
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 2.0;

/// Smoothed views of a score series, all aligned to insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTrend {
    pub window: usize,
    pub alpha: f64,
    pub moving_average: Vec<f64>,
    pub smoothed: Vec<f64>,
    pub z_scores: Vec<f64>,
}

impl ScoreTrend {
    pub fn compute(series: &[f64], window: usize, alpha: f64) -> Self {
        Self {
            window,
            alpha,
            moving_average: moving_average(series, window),
            smoothed: exponential_smoothing(series, alpha),
            z_scores: standardize(series),
        }
    }
}

pub fn mean(series: &[f64]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    Some(series.iter().sum::<f64>() / series.len() as f64)
}

/// Sample standard deviation (Bessel-corrected). `None` below two points.
pub fn sample_std_dev(series: &[f64]) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let m = mean(series)?;
    let variance =
        series.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (series.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Simple moving average over every full window.
///
/// Returns `len - window + 1` values, or an empty `Vec` when `window` is zero
/// or longer than the series.
pub fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || series.len() < window {
        return Vec::new();
    }
    series
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Exponential smoothing seeded with the first value. One output per input;
/// empty input gives empty output. `alpha` is not clamped.
pub fn exponential_smoothing(series: &[f64], alpha: f64) -> Vec<f64> {
    let Some((&first, rest)) = series.split_first() else {
        return Vec::new();
    };

    let mut result = Vec::with_capacity(series.len());
    result.push(first);
    let mut prev = first;
    for &x in rest {
        prev = alpha * x + (1.0 - alpha) * prev;
        result.push(prev);
    }
    result
}

/// Indices whose distance from the mean exceeds `threshold` sample standard
/// deviations.
///
/// # Edge cases
/// - fewer than two points => no anomalies (std dev undefined)
/// - zero std dev => no anomalies
pub fn detect_anomalies(series: &[f64], threshold: f64) -> Vec<usize> {
    let (Some(m), Some(sd)) = (mean(series), sample_std_dev(series)) else {
        return Vec::new();
    };
    if sd == 0.0 || !sd.is_finite() {
        return Vec::new();
    }
    series
        .iter()
        .enumerate()
        .filter(|(_, x)| (*x - m).abs() > threshold * sd)
        .map(|(i, _)| i)
        .collect()
}

/// Z-scores of the series. All zeros when the std dev is zero or undefined.
pub fn standardize(series: &[f64]) -> Vec<f64> {
    match (mean(series), sample_std_dev(series)) {
        (Some(m), Some(sd)) if sd != 0.0 => series.iter().map(|x| (x - m) / sd).collect(),
        _ => vec![0.0; series.len()],
    }
}

/// `true` for every value strictly above `threshold`.
pub fn binarize(series: &[f64], threshold: f64) -> Vec<bool> {
    series.iter().map(|&x| x > threshold).collect()
}

/// Cosine of the angle between two vectors, compared up to the shorter
/// length. `0.0` when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

/// Similarity of two telemetry profiles, ignoring their magnitude.
pub fn metrics_similarity(a: &Metrics, b: &Metrics) -> f64 {
    cosine_similarity(&a.as_array(), &b.as_array())
}

/// `n` draws with replacement. Empty when `data` is empty.
pub fn bootstrap_sample<R: Rng + ?Sized>(rng: &mut R, data: &[f64], n: usize) -> Vec<f64> {
    if data.is_empty() {
        return Vec::new();
    }
    (0..n).filter_map(|_| data.choose(rng).copied()).collect()
}

/// One draw from each of `strata` equal-width slices of the sorted data.
/// Leftover values past the last full stratum are never drawn. Empty when
/// `strata` is zero or exceeds the number of values.
pub fn stratified_sample<R: Rng + ?Sized>(rng: &mut R, data: &[f64], strata: usize) -> Vec<f64> {
    if strata == 0 || data.len() < strata {
        return Vec::new();
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let size = sorted.len() / strata;
    sorted
        .chunks_exact(size)
        .take(strata)
        .filter_map(|chunk| chunk.choose(rng).copied())
        .collect()
}
