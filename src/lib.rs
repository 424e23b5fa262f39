// =============================================================================
// Aurora Signal Scorer — library root
// =============================================================================
//
// Core: `signals` (composite scoring + ordered signal store) and `risk`
// (threshold classification). Everything else consumes the core: the
// simulation feeds it, `report` renders it, `api` serves it.

pub mod api;
pub mod app_state;
pub mod format;
pub mod report;
pub mod risk;
pub mod runtime_config;
pub mod signals;
pub mod simulation;
pub mod types;

pub use risk::{classify_score, RiskThresholds};
pub use signals::{RiskWeights, SignalScorer};
pub use types::{Metrics, RiskBand, RiskReport, Signal};
