//! At-a-glance views over a result set: dashboard statistics and a
//! plain-language summary for patients.

use serde::Serialize;

use crate::models::{sorted_by_percentage, NormalizedResult, RiskLevel};
use crate::risk::RiskSummary;

const TOP_RISKS: usize = 3;
const SUMMARY_CONDITIONS: usize = 5;

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
    /// Mean percentage across all results, 0 when empty.
    pub average_percentage: f64,
    pub top_risks: Vec<NormalizedResult>,
}

impl DashboardStats {
    pub fn from_results(results: &[NormalizedResult]) -> Self {
        let summary = RiskSummary::from_results(results);
        let average_percentage = if results.is_empty() {
            0.0
        } else {
            results.iter().map(NormalizedResult::percentage).sum::<f64>() / results.len() as f64
        };

        Self {
            total: summary.total(),
            high: summary.high,
            moderate: summary.moderate,
            low: summary.low,
            average_percentage,
            top_risks: sorted_by_percentage(results)
                .into_iter()
                .take(TOP_RISKS)
                .cloned()
                .collect(),
        }
    }

    /// Share of results in a tier, as a percentage of the total.
    pub fn share(&self, level: RiskLevel) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let count = match level {
            RiskLevel::High => self.high,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::Low => self.low,
        };
        count as f64 / self.total as f64 * 100.0
    }
}

// ─── Plain-language summary ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlainSummary {
    pub summary: String,
    pub recommendations: Vec<String>,
}

impl PlainSummary {
    /// Built from the five highest results only. English text.
    pub fn generate(
        results: &[NormalizedResult],
        patient_name: Option<&str>,
        model: Option<&str>,
    ) -> Self {
        let top: Vec<&NormalizedResult> = sorted_by_percentage(results)
            .into_iter()
            .take(SUMMARY_CONDITIONS)
            .collect();
        let in_tier = |level: RiskLevel| -> Vec<&NormalizedResult> {
            top.iter().copied().filter(|r| r.risk_level() == level).collect()
        };
        let high = in_tier(RiskLevel::High);
        let moderate = in_tier(RiskLevel::Moderate);
        let low = in_tier(RiskLevel::Low);

        let subject = match patient_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => format!("{name}'s"),
            None => "your".to_string(),
        };
        let mut summary = format!(
            "This analysis of {subject} chest X-ray was performed using {}. ",
            model.filter(|m| !m.is_empty()).unwrap_or("AI technology")
        );

        if !high.is_empty() {
            let names: Vec<String> = high.iter().map(|r| r.display_name()).collect();
            summary.push_str(&format!(
                "The analysis detected {} condition{} with high risk levels: {}. ",
                high.len(),
                if high.len() > 1 { "s" } else { "" },
                names.join(", ")
            ));
            summary.push_str(
                "These findings require immediate medical attention and consultation with a healthcare professional. ",
            );
        }

        if !moderate.is_empty() {
            summary.push_str(&format!(
                "Additionally, {} condition{} detected with moderate risk levels. ",
                moderate.len(),
                if moderate.len() > 1 { "s were" } else { " was" }
            ));
        }

        if !low.is_empty() && high.is_empty() && moderate.is_empty() {
            summary.push_str(
                "The analysis shows mostly low-risk findings, which is generally positive. \
                 However, it's important to note that this is an AI-assisted analysis and should be \
                 reviewed by a qualified healthcare professional. ",
            );
        }

        summary.push_str(
            "This report is for informational purposes only and does not constitute a medical diagnosis. \
             Please consult with a qualified healthcare provider for proper evaluation and treatment recommendations.",
        );

        let mut recommendations: Vec<String> = Vec::new();
        if !high.is_empty() {
            recommendations.push("Schedule an appointment with a healthcare professional as soon as possible for further evaluation.".into());
            recommendations.push("Consider bringing this report to your doctor for review.".into());
        } else if !moderate.is_empty() {
            recommendations.push("Consider scheduling a follow-up appointment with your healthcare provider.".into());
            recommendations.push("Monitor any symptoms and report them to your doctor.".into());
        } else {
            recommendations.push("Continue routine monitoring and regular check-ups.".into());
        }
        recommendations.push("Keep this report for your medical records.".into());
        recommendations.push("Always consult with qualified healthcare professionals for medical decisions.".into());

        Self {
            summary,
            recommendations,
        }
    }
}
