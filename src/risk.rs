//! Risk tier thresholds. Every on-screen and exported label goes through here.

use serde::Serialize;

use crate::models::{NormalizedResult, RiskLevel};

/// Fractions strictly above this are High.
pub const HIGH_THRESHOLD: f64 = 0.7;
/// Fractions strictly above this (and not High) are Moderate.
pub const MODERATE_THRESHOLD: f64 = 0.4;

/// Map a probability (or an already-scaled percentage) to a risk tier.
///
/// Boundaries are exclusive on the lower side: 0.7 is Moderate, 0.4 is Low.
/// Percentages are compared against the scaled thresholds directly so that
/// `70.0` lands on the same side as `0.7`. NaN falls through to Low.
pub fn classify(value: f64, is_percentage: bool) -> RiskLevel {
    let (high, moderate) = if is_percentage {
        (HIGH_THRESHOLD * 100.0, MODERATE_THRESHOLD * 100.0)
    } else {
        (HIGH_THRESHOLD, MODERATE_THRESHOLD)
    };

    if value > high {
        RiskLevel::High
    } else if value > moderate {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Tier partition over a result set. `high + moderate + low == results.len()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskSummary {
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
}

impl RiskSummary {
    pub fn from_results(results: &[NormalizedResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            match r.risk_level() {
                RiskLevel::High => acc.high += 1,
                RiskLevel::Moderate => acc.moderate += 1,
                RiskLevel::Low => acc.low += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.high + self.moderate + self.low
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::Low => self.low,
        }
    }

    /// True when every result is Low (including the empty set).
    pub fn all_low(&self) -> bool {
        self.low == self.total()
    }
}
