use chrono::{DateTime, SecondsFormat, Utc};

use super::payload::RawPayload;

/// Per-export metadata. Built fresh for every export call, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMetadata {
    pub patient_id: String,
    pub report_id: String,
    pub issued_at: DateTime<Utc>,
    pub patient_name: Option<String>,
    pub model_name: Option<String>,
    pub analysis_type: Option<String>,
    pub disclaimer_text: Option<String>,
}

impl ReportMetadata {
    /// Metadata stamped with the current time.
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Metadata stamped with a fixed instant. IDs are derived from its epoch millis.
    pub fn at(issued_at: DateTime<Utc>) -> Self {
        let millis = issued_at.timestamp_millis();
        Self {
            patient_id: format!("PAT-{:08}", millis.rem_euclid(100_000_000)),
            report_id: format!("RPT-{:010}", millis.rem_euclid(10_000_000_000)),
            issued_at,
            patient_name: None,
            model_name: None,
            analysis_type: None,
            disclaimer_text: None,
        }
    }

    /// Blank names are treated as absent.
    pub fn with_patient_name(mut self, name: Option<&str>) -> Self {
        self.patient_name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        self
    }

    /// Copy model info from a structured payload.
    pub fn with_payload(mut self, payload: &RawPayload<'_>) -> Self {
        self.model_name = payload.model().map(str::to_string);
        self.analysis_type = payload.analysis_type().map(str::to_string);
        self.disclaimer_text = payload.disclaimer().map(str::to_string);
        self
    }

    pub fn epoch_millis(&self) -> i64 {
        self.issued_at.timestamp_millis()
    }

    /// Long date, e.g. "October 19, 2026".
    pub fn generated_date(&self) -> String {
        self.issued_at.format("%B %-d, %Y").to_string()
    }

    /// Date and time for tabular exports, e.g. "10/19/2026, 3:04:05 PM".
    pub fn generated_date_time(&self) -> String {
        self.issued_at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
    }

    /// ISO-8601 with millisecond precision, e.g. "2026-10-19T15:04:05.123Z".
    pub fn timestamp_iso(&self) -> String {
        self.issued_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_760_886_245_123).unwrap()
    }

    #[test]
    fn ids_use_trailing_millis_digits() {
        let meta = ReportMetadata::at(fixed());
        assert_eq!(meta.patient_id, "PAT-86245123");
        assert_eq!(meta.report_id, "RPT-0886245123");
        assert_eq!(meta.epoch_millis(), 1_760_886_245_123);
    }

    #[test]
    fn ids_keep_leading_zeros() {
        let meta = ReportMetadata::at(Utc.timestamp_millis_opt(1_700_000_000_042).unwrap());
        assert_eq!(meta.patient_id, "PAT-00000042");
        assert_eq!(meta.report_id, "RPT-0000000042");
    }

    #[test]
    fn dates_are_formatted() {
        let meta = ReportMetadata::at(fixed());
        assert_eq!(meta.generated_date(), "October 19, 2025");
        assert_eq!(meta.timestamp_iso(), "2025-10-19T15:04:05.123Z");
        assert_eq!(meta.generated_date_time(), "10/19/2025, 3:04:05 PM");
    }

    #[test]
    fn blank_patient_name_is_dropped() {
        let meta = ReportMetadata::at(fixed()).with_patient_name(Some("   "));
        assert_eq!(meta.patient_name, None);
        let meta = ReportMetadata::at(fixed()).with_patient_name(Some(" Jane Doe "));
        assert_eq!(meta.patient_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn payload_model_info_is_copied() {
        let raw = json!({"model": "DenseNet121", "type": "multi-label", "results": {}});
        let meta = ReportMetadata::at(fixed()).with_payload(&RawPayload::detect(&raw));
        assert_eq!(meta.model_name.as_deref(), Some("DenseNet121"));
        assert_eq!(meta.analysis_type.as_deref(), Some("multi-label"));
        assert_eq!(meta.disclaimer_text, None);
    }
}
