//! Canonical per-condition record consumed by every renderer and exporter.

use serde::Serialize;

use super::enums::RiskLevel;
use crate::risk::classify;

/// One normalized condition.
///
/// Fields are read-only outside the crate: records are built by the
/// normalizer (or [`NormalizedResult::from_probability`]) so that
/// `risk_level` always comes from the classifier or the source payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResult {
    #[serde(rename = "name")]
    key: String,
    probability: f64,
    percentage: f64,
    risk_level: RiskLevel,
}

impl NormalizedResult {
    /// Build a record from a probability, deriving percentage and tier.
    pub fn from_probability(key: impl Into<String>, probability: f64) -> Self {
        Self {
            key: key.into(),
            probability,
            percentage: probability * 100.0,
            risk_level: classify(probability, false),
        }
    }

    /// Build a record from an already-scaled percentage.
    pub fn from_percentage(key: impl Into<String>, percentage: f64) -> Self {
        Self {
            key: key.into(),
            probability: percentage / 100.0,
            percentage,
            risk_level: classify(percentage, true),
        }
    }

    /// Keep source-supplied values verbatim.
    pub(crate) fn supplied(
        key: impl Into<String>,
        probability: f64,
        percentage: f64,
        risk_level: RiskLevel,
    ) -> Self {
        Self {
            key: key.into(),
            probability,
            percentage,
            risk_level,
        }
    }

    /// Raw condition key as sent by the inference API.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    /// Human-readable condition name ("pleural_effusion" → "Pleural Effusion").
    pub fn display_name(&self) -> String {
        humanize_key(&self.key)
    }
}

/// Replace `_`/`-` separators with spaces and upper-case the first letter of each word.
pub fn humanize_key(key: &str) -> String {
    key.split(['_', '-'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Results ordered by descending percentage. Ties keep input order.
pub fn sorted_by_percentage(results: &[NormalizedResult]) -> Vec<&NormalizedResult> {
    let mut sorted: Vec<&NormalizedResult> = results.iter().collect();
    sorted.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    sorted
}
