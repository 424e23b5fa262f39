// =============================================================================
// Weighted Composite Scorer — fixed-weight linear risk combination
// =============================================================================
//
//   score = 0.30 * volatility
//         + 0.25 * liquidity
//         + 0.20 * tx_rate
//         + 0.15 * wallet_distribution
//         + 0.10 * social_sentiment
//
// Weights sum to 1.0, so inputs in [0, 1] produce a score in [0, 1].

use serde::{Deserialize, Serialize};

use crate::types::Metrics;

/// The contribution of a single metric to the composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricContribution {
    pub name: &'static str,
    pub value: f64,
    pub weight: f64,
    pub contribution: f64,
}

/// Per-metric weights of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskWeights {
    pub volatility: f64,
    pub liquidity: f64,
    pub tx_rate: f64,
    pub wallet_distribution: f64,
    pub social_sentiment: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            volatility: 0.3,
            liquidity: 0.25,
            tx_rate: 0.2,
            wallet_distribution: 0.15,
            social_sentiment: 0.1,
        }
    }
}

impl RiskWeights {
    /// `(name, value, weight)` triples in scoring order.
    fn terms(&self, metrics: &Metrics) -> [(&'static str, f64, f64); 5] {
        [
            ("volatility", metrics.volatility, self.volatility),
            ("liquidity", metrics.liquidity, self.liquidity),
            ("txRate", metrics.tx_rate, self.tx_rate),
            ("walletDistribution", metrics.wallet_distribution, self.wallet_distribution),
            ("socialSentiment", metrics.social_sentiment, self.social_sentiment),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.volatility
            + self.liquidity
            + self.tx_rate
            + self.wallet_distribution
            + self.social_sentiment
    }

    /// Weighted sum of the metrics. NaN inputs count as zero.
    pub fn composite(&self, metrics: &Metrics) -> f64 {
        let mut score = 0.0;
        for (_, value, weight) in self.terms(metrics) {
            score += or_zero(value) * weight;
        }
        score
    }

    /// Per-metric breakdown of [`RiskWeights::composite`].
    pub fn breakdown(&self, metrics: &Metrics) -> Vec<MetricContribution> {
        self.terms(metrics)
            .into_iter()
            .map(|(name, value, weight)| MetricContribution {
                name,
                value,
                weight,
                contribution: or_zero(value) * weight,
            })
            .collect()
    }
}

fn or_zero(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Composite score under the default weights.
pub fn calculate_composite_score(metrics: &Metrics) -> f64 {
    RiskWeights::default().composite(metrics)
}

/// Min-max normalisation: `(value - min) / (max - min)`.
///
/// Not guarded: when `max == min` the result is non-finite (`NaN` if
/// `value == min`, otherwise +/- infinity). The result is not clamped.
pub fn normalize_signal(value: f64, min: f64, max: f64) -> f64 {
    (value - min) / (max - min)
}

/// Linear interpolation between two risk levels. `factor` is not clamped.
pub fn interpolate_risk(low: f64, high: f64, factor: f64) -> f64 {
    low + (high - low) * factor
}
