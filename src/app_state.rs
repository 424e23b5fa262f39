// =============================================================================
// Central Application State — Aurora Signal Scorer
// =============================================================================
//
// Owns the one scorer instance of the process once the HTTP API is serving.
// Handlers reach it through `Arc<AppState>`.
//
// Thread safety:
//   - parking_lot::RwLock around the scorer: many readers or one writer.
//   - parking_lot::Mutex around the RNG used by `/simulate`.
//   - Atomic counter for lock-free version tracking.
//   - No guard is ever held across an `.await`.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::{Mutex, RwLock};

use crate::runtime_config::RuntimeConfig;
use crate::signals::SignalScorer;
use crate::simulation::MetricsGenerator;

/// State shared across all request handlers via `Arc<AppState>`.
pub struct AppState {
    /// Incremented on every mutation of the scorer so clients can detect
    /// changes cheaply.
    pub state_version: AtomicU64,

    /// Settings the process was started with. Read-only after startup.
    pub runtime_config: RuntimeConfig,

    pub scorer: RwLock<SignalScorer>,

    pub generator: Mutex<MetricsGenerator>,

    /// Bearer token required by mutating routes. `None` rejects them all.
    pub admin_token: Option<String>,

    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: RuntimeConfig,
        scorer: SignalScorer,
        generator: MetricsGenerator,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            state_version: AtomicU64::new(0),
            runtime_config: config,
            scorer: RwLock::new(scorer),
            generator: Mutex::new(generator),
            admin_token: admin_token.filter(|t| !t.is_empty()),
            start_time: Instant::now(),
        }
    }

    /// Bump the state version. Returns the previous value.
    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    /// Read the current state version without modifying it.
    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metrics;

    fn state(token: Option<&str>) -> AppState {
        AppState::new(
            RuntimeConfig::default(),
            SignalScorer::new(),
            MetricsGenerator::new(Some(1)),
            token.map(str::to_string),
        )
    }

    #[test]
    fn version_starts_at_zero_and_increments() {
        let s = state(None);
        assert_eq!(s.current_state_version(), 0);
        assert_eq!(s.increment_version(), 0);
        assert_eq!(s.current_state_version(), 1);
    }

    #[test]
    fn empty_token_means_no_token() {
        assert!(state(Some("")).admin_token.is_none());
        assert_eq!(state(Some("abc")).admin_token.as_deref(), Some("abc"));
    }

    #[test]
    fn scorer_is_shared_through_lock() {
        let s = state(None);
        s.scorer.write().register_signal("t1", &Metrics::default());
        assert_eq!(s.scorer.read().len(), 1);
    }
}
