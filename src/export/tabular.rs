//! CSV and XLSX exports. Both share one logical grid; labels are English only.

use rust_xlsxwriter::{DocProperties, ExcelDateTime, Workbook};

use super::{ExportArtifact, ExportError, MIME_CSV, MIME_XLSX};
use crate::models::{NormalizedResult, ReportMetadata};

pub const WORKSHEET_NAME: &str = "Analysis";
pub const HEADER: [&str; 4] = ["Condition", "Probability", "Percentage", "Risk Level"];

/// The shared grid. An empty row renders as a blank line / blank sheet row.
pub fn tabular_rows(results: &[NormalizedResult], metadata: &ReportMetadata) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(results.len() + 7);

    if let Some(name) = &metadata.patient_name {
        rows.push(vec!["Patient Name".into(), name.clone()]);
        rows.push(vec!["Date".into(), metadata.generated_date_time()]);
        rows.push(Vec::new());
    }

    if let Some(model) = &metadata.model_name {
        rows.push(vec!["AI Model".into(), model.clone()]);
        if let Some(kind) = &metadata.analysis_type {
            rows.push(vec!["Analysis Type".into(), kind.clone()]);
        }
        rows.push(Vec::new());
    }

    rows.push(HEADER.iter().map(|h| h.to_string()).collect());
    for result in results {
        rows.push(vec![
            result.display_name(),
            format!("{:.2}%", result.probability() * 100.0),
            format!("{:.2}%", result.percentage()),
            result.risk_level().as_str().to_string(),
        ]);
    }
    rows
}

/// Every field is quoted; embedded quotes are doubled.
fn escape_csv(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn build_csv(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|field| escape_csv(field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn export_csv(
    results: &[NormalizedResult],
    metadata: &ReportMetadata,
) -> Result<ExportArtifact, ExportError> {
    let csv = build_csv(&tabular_rows(results, metadata));
    Ok(ExportArtifact::new(
        format!("medical-report-{}.csv", metadata.epoch_millis()),
        MIME_CSV,
        csv.into_bytes(),
    ))
}

pub fn export_xlsx(
    results: &[NormalizedResult],
    metadata: &ReportMetadata,
) -> Result<ExportArtifact, ExportError> {
    let rows = tabular_rows(results, metadata);
    let created = ExcelDateTime::from_timestamp(metadata.issued_at.timestamp())?;
    let mut workbook = Workbook::new();
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(WORKSHEET_NAME)?;
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                worksheet.write_string(r as u32, c as u16, cell)?;
            }
        }
        worksheet.set_column_width(0, 30)?;
        worksheet.set_column_width(1, 14)?;
        worksheet.set_column_width(2, 14)?;
        worksheet.set_column_width(3, 12)?;
    }
    let bytes = workbook.save_to_buffer()?;
    Ok(ExportArtifact::new(
        format!("medical-report-{}.xlsx", metadata.epoch_millis()),
        MIME_XLSX,
        bytes,
    ))
}
