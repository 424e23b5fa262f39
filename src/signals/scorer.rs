// =============================================================================
// Signal Scorer — ordered, append-only store of scored transactions
// =============================================================================
//
// Scores metrics with the fixed composite weights, classifies the result on
// the threshold ladder, stamps it, and keeps every signal in insertion order.
// All read operations are total: an empty store yields 0 / "[]" / empty
// sequences, never an error.
//
// The scorer is single-owner (`&mut self` to mutate). Callers that share it
// across tasks wrap it in a lock (see `AppState`).

use chrono::{SecondsFormat, Utc};
use tracing::{debug, error, info};

use crate::format::to_fixed;
use crate::risk::RiskThresholds;
use crate::signals::analytics::{self, ScoreTrend};
use crate::signals::weighted_score::{self, RiskWeights};
use crate::types::{Metrics, RiskBand, RiskReport, Signal};

/// Number of signals returned by `recent_signals` when the caller has no
/// preference.
pub const DEFAULT_RECENT_COUNT: usize = 5;

pub struct SignalScorer {
    thresholds: RiskThresholds,
    weights: RiskWeights,
    signals: Vec<Signal>,
}

impl SignalScorer {
    pub fn new() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            weights: RiskWeights::default(),
            signals: Vec::new(),
        }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    pub fn weights(&self) -> &RiskWeights {
        &self.weights
    }

    /// Every stored signal, oldest first.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    // -------------------------------------------------------------------------
    // Pure scoring
    // -------------------------------------------------------------------------

    /// See [`weighted_score::normalize_signal`]; non-finite when `max == min`.
    pub fn normalize_signal(&self, value: f64, min: f64, max: f64) -> f64 {
        weighted_score::normalize_signal(value, min, max)
    }

    pub fn calculate_composite_score(&self, metrics: &Metrics) -> f64 {
        self.weights.composite(metrics)
    }

    pub fn classify_score(&self, score: f64) -> RiskBand {
        self.thresholds.classify(score)
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Score, classify and timestamp `metrics`, append the result, and return
    /// a copy of the stored signal.
    pub fn register_signal(&mut self, id: impl Into<String>, metrics: &Metrics) -> Signal {
        let composite_score = self.calculate_composite_score(metrics);
        let signal = Signal {
            id: id.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            composite_score,
            classification: self.classify_score(composite_score),
        };

        debug!(
            id = %signal.id,
            score = signal.composite_score,
            classification = %signal.classification,
            "signal registered"
        );

        self.signals.push(signal.clone());
        signal
    }

    /// Drop every stored signal.
    pub fn clear_signals(&mut self) {
        let dropped = self.signals.len();
        self.signals.clear();
        info!(dropped, "signals cleared");
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Pretty-printed JSON array of all signals in insertion order.
    pub fn export_signals(&self) -> String {
        match serde_json::to_string_pretty(&self.signals) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to serialise signals");
                "[]".to_string()
            }
        }
    }

    /// Signals whose classification label contains `level`.
    pub fn filter_signals(&self, level: &str) -> Vec<Signal> {
        self.signals
            .iter()
            .filter(|s| s.classification.label().contains(level))
            .cloned()
            .collect()
    }

    /// Mean composite score, or `0.0` when nothing is stored.
    pub fn average_score(&self) -> f64 {
        if self.signals.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.signals.iter().map(|s| s.composite_score).sum();
        sum / self.signals.len() as f64
    }

    /// The last `count` signals, oldest first.
    pub fn recent_signals(&self, count: usize) -> Vec<Signal> {
        let start = self.signals.len().saturating_sub(count);
        self.signals[start..].to_vec()
    }

    /// A sorted copy of the signals; the stored order is left untouched.
    /// Equal scores keep their insertion order.
    pub fn sort_signals_by_score(&self, descending: bool) -> Vec<Signal> {
        let mut sorted = self.signals.clone();
        sorted.sort_by(|a, b| {
            let ord = a
                .composite_score
                .partial_cmp(&b.composite_score)
                .unwrap_or(std::cmp::Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
        sorted
    }

    /// Composite scores in insertion order.
    pub fn scores(&self) -> Vec<f64> {
        self.signals.iter().map(|s| s.composite_score).collect()
    }

    /// Signals whose score lies more than `threshold` sample standard
    /// deviations from the mean score, in insertion order.
    pub fn anomalous_signals(&self, threshold: f64) -> Vec<Signal> {
        analytics::detect_anomalies(&self.scores(), threshold)
            .into_iter()
            .map(|i| self.signals[i].clone())
            .collect()
    }

    pub fn score_trend(&self, window: usize, alpha: f64) -> ScoreTrend {
        ScoreTrend::compute(&self.scores(), window, alpha)
    }

    pub fn report(&self) -> RiskReport {
        RiskReport {
            average: to_fixed(self.average_score(), 4),
            high_risk_txs: self.filter_signals("High").len(),
            total: self.signals.len(),
        }
    }
}

impl Default for SignalScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignalScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalScorer")
            .field("thresholds", &self.thresholds)
            .field("weights", &self.weights)
            .field("signals", &self.signals.len())
            .finish()
    }
}
