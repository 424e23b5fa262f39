// =============================================================================
// Signals Module
// =============================================================================
//
// Transaction risk scoring:
// - Fixed-weight composite score over five telemetry metrics
// - Ordered in-memory store of scored, classified signals
// - Series analytics over stored scores (smoothing, anomalies, sampling)

pub mod analytics;
pub mod scorer;
pub mod weighted_score;

pub use analytics::ScoreTrend;
pub use scorer::{SignalScorer, DEFAULT_RECENT_COUNT};
pub use weighted_score::{
    calculate_composite_score, interpolate_risk, normalize_signal, MetricContribution,
    RiskWeights,
};
