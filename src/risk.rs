// =============================================================================
// Risk Classification — threshold ladder over the composite score
// =============================================================================
//
// Bands, evaluated top-down with strict comparisons:
//   1. High        — score >  0.85
//   2. Medium      — score >  0.60
//   3. Low         — score >  0.30
//   4. Very Low    — everything else (including NaN)
//
// A score sitting exactly on a threshold belongs to the band below it.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::RiskBand;

/// Lower (exclusive) bounds of the three upper risk bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskThresholds {
    pub high_risk: f64,
    pub medium_risk: f64,
    pub low_risk: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high_risk: 0.85,
            medium_risk: 0.6,
            low_risk: 0.3,
        }
    }
}

impl RiskThresholds {
    /// Map a composite score onto its risk band.
    pub fn classify(&self, score: f64) -> RiskBand {
        if score > self.high_risk {
            RiskBand::High
        } else if score > self.medium_risk {
            RiskBand::Medium
        } else if score > self.low_risk {
            RiskBand::Low
        } else {
            RiskBand::VeryLow
        }
    }
}

/// Classify under the default thresholds.
pub fn classify_score(score: f64) -> RiskBand {
    RiskThresholds::default().classify(score)
}
