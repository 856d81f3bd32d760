//! Shape detection for raw inference payloads.
//!
//! The inference API has shipped two payload shapes:
//! - structured: `{ model, type, disclaimer, results: { condition: value } }`
//! - legacy: a flat `{ condition: value }` map
//!
//! Detection happens once here; everything downstream works on
//! [`NormalizedResult`](super::NormalizedResult).

use serde_json::{Map, Value};

/// Borrowed view over a raw payload, tagged by detected shape.
#[derive(Debug, Clone, Copy)]
pub enum RawPayload<'a> {
    /// Object carrying `results` and/or `model`. `results` is `None` when the
    /// key is absent or not an object.
    Structured {
        model: Option<&'a str>,
        analysis_type: Option<&'a str>,
        disclaimer: Option<&'a str>,
        results: Option<&'a Map<String, Value>>,
    },
    /// Flat condition map with neither `model` nor `results` keys.
    Legacy(&'a Map<String, Value>),
    /// Anything that is not a JSON object.
    Unrecognized,
}

impl<'a> RawPayload<'a> {
    pub fn detect(value: &'a Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::Unrecognized;
        };

        let has_results = obj.contains_key("results");
        let has_model = obj.contains_key("model");

        if !has_results && !has_model {
            return Self::Legacy(obj);
        }

        Self::Structured {
            model: obj.get("model").and_then(Value::as_str),
            analysis_type: obj.get("type").and_then(Value::as_str),
            disclaimer: obj.get("disclaimer").and_then(Value::as_str),
            // A `model` without `results` yields no conditions.
            results: obj.get("results").and_then(Value::as_object),
        }
    }

    /// Condition entries in payload order.
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, &'a Value)> {
        let map = match *self {
            Self::Structured { results, .. } => results,
            Self::Legacy(map) => Some(map),
            Self::Unrecognized => None,
        };
        map.into_iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn model(&self) -> Option<&'a str> {
        match *self {
            Self::Structured { model, .. } => model,
            _ => None,
        }
    }

    pub fn analysis_type(&self) -> Option<&'a str> {
        match *self {
            Self::Structured { analysis_type, .. } => analysis_type,
            _ => None,
        }
    }

    pub fn disclaimer(&self) -> Option<&'a str> {
        match *self {
            Self::Structured { disclaimer, .. } => disclaimer,
            _ => None,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_structured_payload() {
        let raw = json!({
            "model": "DenseNet121",
            "type": "multi-label",
            "disclaimer": "Not a diagnosis",
            "results": {"pneumonia": {"probability": 0.91}}
        });
        let payload = RawPayload::detect(&raw);
        assert!(payload.is_structured());
        assert_eq!(payload.model(), Some("DenseNet121"));
        assert_eq!(payload.analysis_type(), Some("multi-label"));
        assert_eq!(payload.disclaimer(), Some("Not a diagnosis"));
        assert_eq!(payload.entries().count(), 1);
    }

    #[test]
    fn detects_legacy_payload_in_key_order() {
        let raw = json!({"Mass": 0.1, "Atelectasis": 0.6, "Edema": 0.2});
        let payload = RawPayload::detect(&raw);
        assert!(matches!(payload, RawPayload::Legacy(_)));
        let keys: Vec<&str> = payload.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Mass", "Atelectasis", "Edema"]);
    }

    #[test]
    fn model_without_results_yields_nothing() {
        let raw = json!({"model": "DenseNet121", "pneumonia": 0.9});
        let payload = RawPayload::detect(&raw);
        assert!(payload.is_structured());
        assert_eq!(payload.entries().count(), 0);
    }

    #[test]
    fn results_key_without_model_is_structured() {
        let raw = json!({"results": {"edema": 0.3}});
        let payload = RawPayload::detect(&raw);
        assert!(payload.is_structured());
        assert_eq!(payload.model(), None);
        assert_eq!(payload.entries().count(), 1);
    }

    #[test]
    fn non_object_results_yield_nothing() {
        let raw = json!({"results": null});
        assert_eq!(RawPayload::detect(&raw).entries().count(), 0);
        let raw = json!({"results": [0.1, 0.2]});
        assert_eq!(RawPayload::detect(&raw).entries().count(), 0);
    }

    #[test]
    fn non_objects_are_unrecognized() {
        for raw in [json!(null), json!("pneumonia"), json!(0.4), json!([1, 2])] {
            let payload = RawPayload::detect(&raw);
            assert!(matches!(payload, RawPayload::Unrecognized));
            assert_eq!(payload.entries().count(), 0);
        }
    }
}
