// =============================================================================
// Shared types used across the Aurora signal scorer
// =============================================================================

use serde::{Deserialize, Serialize};

/// Raw per-transaction telemetry fed into the composite score.
///
/// Every field is expected in `[0, 1]` but nothing enforces it. Missing
/// fields deserialise as `0.0`, so a partial JSON object scores the same way
/// as one with explicit zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    #[serde(default)]
    pub volatility: f64,
    #[serde(default)]
    pub liquidity: f64,
    #[serde(default)]
    pub tx_rate: f64,
    #[serde(default)]
    pub wallet_distribution: f64,
    #[serde(default)]
    pub social_sentiment: f64,
}

impl Metrics {
    /// Fields in weight order: volatility, liquidity, tx rate, wallet
    /// distribution, social sentiment.
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.volatility,
            self.liquidity,
            self.tx_rate,
            self.wallet_distribution,
            self.social_sentiment,
        ]
    }
}

/// Discrete risk band derived from a composite score.
///
/// Serialises as its canonical label ("High Risk", ...) so exported signals
/// carry plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Very Low Risk")]
    VeryLow,
}

impl RiskBand {
    /// All bands, most severe first.
    pub const ALL: [RiskBand; 4] = [Self::High, Self::Medium, Self::Low, Self::VeryLow];

    /// Canonical label used for serialisation, filtering and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High Risk",
            Self::Medium => "Medium Risk",
            Self::Low => "Low Risk",
            Self::VeryLow => "Very Low Risk",
        }
    }

    /// Decorative marker for human-facing output only.
    pub fn badge(&self) -> &'static str {
        match self {
            Self::High => "🔴",
            Self::Medium => "🟠",
            Self::Low => "🟡",
            Self::VeryLow => "🟢",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One scored, classified, timestamped record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub id: String,
    /// ISO 8601 UTC timestamp with millisecond precision.
    pub timestamp: String,
    pub composite_score: f64,
    pub classification: RiskBand,
}

/// Aggregate statistics over the stored signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    /// Mean composite score, fixed to 4 decimal places.
    pub average: String,
    pub high_risk_txs: usize,
    pub total: usize,
}
