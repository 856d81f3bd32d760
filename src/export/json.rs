//! JSON export: summary counts plus the raw payload, untouched.

use serde::Serialize;
use serde_json::Value;

use super::{ExportArtifact, ExportError, MIME_JSON};
use crate::models::{NormalizedResult, RawPayload, ReportMetadata};
use crate::risk::RiskSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_conditions: usize,
    pub high_risk: usize,
    pub moderate_risk: usize,
    pub low_risk: usize,
}

impl From<&RiskSummary> for ExportSummary {
    fn from(summary: &RiskSummary) -> Self {
        Self {
            total_conditions: summary.total(),
            high_risk: summary.high,
            moderate_risk: summary.moderate,
            low_risk: summary.low,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    patient_name: Option<&'a str>,
    timestamp: String,
    patient_id: &'a str,
    summary: ExportSummary,
    /// Source payload as received, not the normalized form.
    predictions: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a Value>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    analysis_type: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disclaimer: Option<&'a Value>,
}

pub fn export_json(
    results: &[NormalizedResult],
    raw: &Value,
    metadata: &ReportMetadata,
) -> Result<ExportArtifact, ExportError> {
    // Model info is hoisted only from structured payloads, and copied verbatim.
    let hoist = |key: &str| {
        if RawPayload::detect(raw).is_structured() {
            raw.get(key)
        } else {
            None
        }
    };

    let report = JsonReport {
        patient_name: metadata.patient_name.as_deref(),
        timestamp: metadata.timestamp_iso(),
        patient_id: &metadata.patient_id,
        summary: ExportSummary::from(&RiskSummary::from_results(results)),
        predictions: raw,
        model: hoist("model"),
        analysis_type: hoist("type"),
        disclaimer: hoist("disclaimer"),
    };

    let body = serde_json::to_string_pretty(&report)?;
    Ok(ExportArtifact::new(
        format!("medical-report-{}.json", metadata.epoch_millis()),
        MIME_JSON,
        body.into_bytes(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn metadata() -> ReportMetadata {
        ReportMetadata::at(Utc.timestamp_millis_opt(1_760_886_245_123).unwrap())
    }

    fn parse(artifact: &ExportArtifact) -> Value {
        serde_json::from_slice(&artifact.bytes).unwrap()
    }

    #[test]
    fn empty_results_give_zero_summary() {
        let raw = json!({"model": "DenseNet121", "results": {}});
        let results = normalize(&raw);
        let doc = parse(&export_json(&results, &raw, &metadata()).unwrap());

        assert_eq!(
            doc["summary"],
            json!({"totalConditions": 0, "highRisk": 0, "moderateRisk": 0, "lowRisk": 0})
        );
        assert_eq!(doc["predictions"], raw);
    }

    #[test]
    fn structured_payload_hoists_model_info() {
        let raw = json!({
            "model": "DenseNet121",
            "type": "multi-label",
            "disclaimer": "Research use only.",
            "results": {
                "pneumonia": {"probability": 0.91, "percentage": 91, "risk_level": "High"},
                "edema": {"probability": 0.3, "percentage": 30, "risk_level": "Low"}
            }
        });
        let results = normalize(&raw);
        let meta = metadata().with_patient_name(Some("Jane Doe"));
        let artifact = export_json(&results, &raw, &meta).unwrap();
        let doc = parse(&artifact);

        assert_eq!(doc["patientName"], "Jane Doe");
        assert_eq!(doc["patientId"], "PAT-86245123");
        assert_eq!(doc["timestamp"], "2025-10-19T15:04:05.123Z");
        assert_eq!(doc["model"], "DenseNet121");
        assert_eq!(doc["type"], "multi-label");
        assert_eq!(doc["disclaimer"], "Research use only.");
        assert_eq!(doc["summary"]["totalConditions"], 2);
        assert_eq!(doc["summary"]["highRisk"], 1);
        assert_eq!(doc["summary"]["lowRisk"], 1);
        assert_eq!(artifact.filename, "medical-report-1760886245123.json");
    }

    #[test]
    fn legacy_payload_has_no_model_fields() {
        let raw = json!({"Pneumonia": 0.85, "Edema": 0.2});
        let doc = parse(&export_json(&normalize(&raw), &raw, &metadata()).unwrap());
        let obj = doc.as_object().unwrap();
        assert!(!obj.contains_key("model"));
        assert!(!obj.contains_key("type"));
        assert!(!obj.contains_key("patientName"));
        assert_eq!(doc["summary"]["highRisk"], 1);
        assert_eq!(doc["predictions"]["Pneumonia"], 0.85);
    }

    #[test]
    fn unrecognized_payload_still_exports() {
        let raw = Value::Null;
        let doc = parse(&export_json(&normalize(&raw), &raw, &metadata()).unwrap());
        assert_eq!(doc["summary"]["totalConditions"], 0);
        assert!(doc["predictions"].is_null());
    }

    #[test]
    fn output_is_pretty_printed() {
        let raw = json!({"results": {}});
        let artifact = export_json(&[], &raw, &metadata()).unwrap();
        let body = String::from_utf8(artifact.bytes).unwrap();
        assert!(body.starts_with("{\n  \"timestamp\""));
    }

    #[test]
    fn bytes_repeat_for_same_report() {
        let raw = json!({"Pneumonia": 0.85, "Edema": 0.2});
        let results = normalize(&raw);
        let first = export_json(&results, &raw, &metadata()).unwrap();
        let second = export_json(&results, &raw, &metadata()).unwrap();
        assert_eq!(first.bytes, second.bytes);
    }
}
