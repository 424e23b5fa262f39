// =============================================================================
// Simulation — synthetic transaction metrics for the scorer
// =============================================================================
//
// Every metric is drawn uniformly from [0, 1). A fixed seed reproduces the
// same sequence of metrics, which the CLI exposes for repeatable runs.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::signals::SignalScorer;
use crate::types::Metrics;

/// Number of transactions simulated when the caller does not say.
pub const DEFAULT_SAMPLE_COUNT: usize = 50;

/// Source of uniformly random [`Metrics`].
pub struct MetricsGenerator {
    rng: SmallRng,
}

impl MetricsGenerator {
    /// Seeded generator when `seed` is set, OS entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn next_metrics(&mut self) -> Metrics {
        Metrics {
            volatility: self.rng.gen(),
            liquidity: self.rng.gen(),
            tx_rate: self.rng.gen(),
            wallet_distribution: self.rng.gen(),
            social_sentiment: self.rng.gen(),
        }
    }
}

/// Register `count` random transactions named `tx_1` .. `tx_{count}`.
///
/// Ids restart at `tx_1` on every call; the scorer does not enforce
/// uniqueness.
pub fn simulate_input(scorer: &mut SignalScorer, generator: &mut MetricsGenerator, count: usize) {
    for i in 0..count {
        let metrics = generator.next_metrics();
        scorer.register_signal(format!("tx_{}", i + 1), &metrics);
    }
    info!(count, total = scorer.len(), "simulated transactions registered");
}
