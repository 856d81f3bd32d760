//! Raw payload → canonical results.
//!
//! Best-effort by policy: unrecognized values become the neutral default
//! instead of failing, so a malformed payload still renders.

use serde_json::{Map, Value};

use crate::models::{NormalizedResult, RawPayload, RiskLevel};
use crate::risk::classify;

/// Probability assigned to values we cannot interpret.
pub const NEUTRAL_PROBABILITY: f64 = 0.5;
/// Probability assigned to an affirmative string ("Yes").
pub const AFFIRMATIVE_PROBABILITY: f64 = 0.7;

/// Normalize any raw payload. Never fails; non-object payloads yield nothing.
pub fn normalize(raw: &Value) -> Vec<NormalizedResult> {
    normalize_payload(&RawPayload::detect(raw))
}

/// Normalize an already-detected payload, preserving entry order.
pub fn normalize_payload(payload: &RawPayload<'_>) -> Vec<NormalizedResult> {
    let results: Vec<NormalizedResult> = payload
        .entries()
        .map(|(key, value)| normalize_entry(key, value))
        .collect();
    tracing::debug!(
        count = results.len(),
        structured = payload.is_structured(),
        "Normalized prediction payload"
    );
    results
}

/// Coerce a single condition value.
pub fn normalize_entry(key: &str, value: &Value) -> NormalizedResult {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(x) => from_number(key, x),
            None => neutral(key),
        },
        Value::String(s) => from_text(key, s),
        Value::Object(obj) => from_object(key, obj),
        _ => neutral(key),
    }
}

fn neutral(key: &str) -> NormalizedResult {
    tracing::debug!(condition = key, "Unrecognized prediction value, using neutral default");
    NormalizedResult::from_probability(key, NEUTRAL_PROBABILITY)
}

/// Values in [0, 1] are probabilities; anything else is an already-scaled
/// percentage, clamped to [0, 100].
fn from_number(key: &str, x: f64) -> NormalizedResult {
    if !x.is_finite() {
        return neutral(key);
    }
    if (0.0..=1.0).contains(&x) {
        NormalizedResult::from_probability(key, x)
    } else {
        NormalizedResult::from_percentage(key, x.clamp(0.0, 100.0))
    }
}

fn from_text(key: &str, s: &str) -> NormalizedResult {
    let s = s.trim();
    if s.eq_ignore_ascii_case("yes") {
        return NormalizedResult::from_probability(key, AFFIRMATIVE_PROBABILITY);
    }
    match s.parse::<f64>() {
        Ok(x) => from_number(key, x),
        Err(_) => neutral(key),
    }
}

/// Pass through whatever the source already computed; derive the rest.
fn from_object(key: &str, obj: &Map<String, Value>) -> NormalizedResult {
    let probability = obj.get("probability").and_then(Value::as_f64);
    let percentage = obj.get("percentage").and_then(Value::as_f64);
    let supplied_level = obj
        .get("risk_level")
        .and_then(Value::as_str)
        .and_then(RiskLevel::from_label);

    // A lone probability above 1 was sent on the percentage scale.
    let (probability, percentage) = match (probability, percentage) {
        (Some(p), Some(pct)) => (p.clamp(0.0, 1.0), pct.clamp(0.0, 100.0)),
        (Some(p), None) if (0.0..=1.0).contains(&p) => (p, p * 100.0),
        (Some(p), None) => {
            let pct = p.clamp(0.0, 100.0);
            (pct / 100.0, pct)
        }
        (None, Some(pct)) => {
            let pct = pct.clamp(0.0, 100.0);
            (pct / 100.0, pct)
        }
        (None, None) if supplied_level.is_none() => return neutral(key),
        (None, None) => (NEUTRAL_PROBABILITY, NEUTRAL_PROBABILITY * 100.0),
    };

    let risk_level = supplied_level.unwrap_or_else(|| classify(probability, false));
    NormalizedResult::supplied(key, probability, percentage, risk_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn structured_values_pass_through_unchanged() {
        let raw = json!({"results": {"A": {"probability": 0.8, "percentage": 80, "risk_level": "High"}}});
        let results = normalize(&raw);
        assert_eq!(results.len(), 1);
        let a = &results[0];
        assert_eq!(a.key(), "A");
        assert!(approx(a.probability(), 0.8));
        assert!(approx(a.percentage(), 80.0));
        assert_eq!(a.risk_level(), RiskLevel::High);
    }

    #[test]
    fn supplied_risk_level_is_not_rederived() {
        let raw = json!({"results": {"A": {"probability": 0.1, "percentage": 10, "risk_level": "High"}}});
        assert_eq!(normalize(&raw)[0].risk_level(), RiskLevel::High);
    }

    #[test]
    fn legacy_values_are_coerced() {
        let raw = json!({"A": 0.85, "B": 0.5, "C": "Yes"});
        let results = normalize(&raw);
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].key(), "A");
        assert!(approx(results[0].probability(), 0.85));
        assert!(approx(results[0].percentage(), 85.0));
        assert_eq!(results[0].risk_level(), RiskLevel::High);

        assert_eq!(results[1].key(), "B");
        assert!(approx(results[1].probability(), 0.5));
        assert!(approx(results[1].percentage(), 50.0));
        assert_eq!(results[1].risk_level(), RiskLevel::Moderate);

        assert_eq!(results[2].key(), "C");
        assert!(approx(results[2].probability(), 0.7));
        assert!(approx(results[2].percentage(), 70.0));
        assert_eq!(results[2].risk_level(), RiskLevel::Moderate);
    }

    #[test]
    fn out_of_range_numbers_are_percentages() {
        let raw = json!({"A": 85, "B": 250, "C": -3});
        let results = normalize(&raw);
        assert!(approx(results[0].probability(), 0.85));
        assert!(approx(results[0].percentage(), 85.0));
        assert_eq!(results[0].risk_level(), RiskLevel::High);
        assert!(approx(results[1].percentage(), 100.0));
        assert!(approx(results[2].percentage(), 0.0));
        assert_eq!(results[2].risk_level(), RiskLevel::Low);
    }

    #[test]
    fn unrecognized_values_get_neutral_default() {
        let raw = json!({"A": "No", "B": null, "C": true, "D": [0.9], "E": {"score": 3}});
        for r in normalize(&raw) {
            assert!(approx(r.probability(), 0.5), "{}", r.key());
            assert!(approx(r.percentage(), 50.0));
            assert_eq!(r.risk_level(), RiskLevel::Moderate);
        }
    }

    #[test]
    fn numeric_strings_are_parsed() {
        let raw = json!({"A": "0.2", "B": " yes "});
        let results = normalize(&raw);
        assert_eq!(results[0].risk_level(), RiskLevel::Low);
        assert!(approx(results[1].probability(), 0.7));
    }

    #[test]
    fn partial_objects_derive_missing_fields() {
        let raw = json!({"results": {
            "only_prob": {"probability": 0.45},
            "only_pct": {"percentage": 72.5},
            "only_level": {"risk_level": "low"}
        }});
        let results = normalize(&raw);
        assert!(approx(results[0].percentage(), 45.0));
        assert_eq!(results[0].risk_level(), RiskLevel::Moderate);
        assert!(approx(results[1].probability(), 0.725));
        assert_eq!(results[1].risk_level(), RiskLevel::High);
        assert!(approx(results[2].probability(), 0.5));
        assert_eq!(results[2].risk_level(), RiskLevel::Low);
    }

    #[test]
    fn duplicate_display_names_are_kept() {
        let raw = json!({"lung_opacity": 0.3, "Lung Opacity": 0.6});
        let results = normalize(&raw);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].display_name(), results[1].display_name());
    }

    #[test]
    fn model_without_results_is_empty() {
        let raw = json!({"model": "DenseNet121", "pneumonia": 0.9});
        assert!(normalize(&raw).is_empty());
    }

    #[test]
    fn non_object_payloads_are_empty() {
        assert!(normalize(&json!(null)).is_empty());
        assert!(normalize(&json!("oops")).is_empty());
        assert!(normalize(&json!(42)).is_empty());
    }

    #[test]
    fn object_probability_on_percentage_scale() {
        let raw = json!({"results": {"Pneumonia": {"probability": 85}}});
        let r = &normalize(&raw)[0];
        assert!(approx(r.percentage(), 85.0));
        assert!(approx(r.probability(), 0.85));
        assert_eq!(r.risk_level(), RiskLevel::High);
    }

    #[test]
    fn object_values_stay_in_range() {
        let raw = json!({"results": {
            "A": {"probability": 250},
            "B": {"percentage": -5},
            "C": {"probability": 1.4, "percentage": 140}
        }});
        let results = normalize(&raw);
        for r in &results {
            assert!((0.0..=1.0).contains(&r.probability()));
            assert!((0.0..=100.0).contains(&r.percentage()));
        }
        assert!(approx(results[0].percentage(), 100.0));
        assert!(approx(results[1].percentage(), 0.0));
    }
}
