//! Report artifacts: PDF, CSV, XLSX and JSON.
//!
//! Every exporter is a pure function of `(results, metadata)`. CSV, XLSX and
//! JSON repeat byte for byte for the same inputs; PDF output differs only in
//! the instance id printpdf draws for each save. Saving to disk is a separate
//! step.

pub mod json;
pub mod layout;
pub mod pdf;
pub mod tabular;

pub use json::export_json;
pub use pdf::export_pdf;
pub use tabular::{export_csv, export_xlsx};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::i18n::Language;
use crate::models::enums::{str_enum, InvalidEnum};
use crate::models::{NormalizedResult, ReportMetadata};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("PDF generation error: {0}")]
    Pdf(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_CSV: &str = "text/csv;charset=utf-8";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_JSON: &str = "application/json";

str_enum!(ExportFormat {
    Pdf => "pdf",
    Csv => "csv",
    Xlsx => "xlsx",
    Json => "json",
});

/// Produce one artifact. Only the PDF is localized; the JSON export embeds
/// `raw` verbatim.
pub fn export_format(
    format: ExportFormat,
    results: &[NormalizedResult],
    raw: &Value,
    metadata: &ReportMetadata,
    lang: Language,
) -> Result<ExportArtifact, ExportError> {
    match format {
        ExportFormat::Pdf => export_pdf(results, metadata, lang),
        ExportFormat::Csv => export_csv(results, metadata),
        ExportFormat::Xlsx => export_xlsx(results, metadata),
        ExportFormat::Json => export_json(results, raw, metadata),
    }
}

/// A finished export, ready to hand to whatever saves files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn new(filename: String, mime_type: &'static str, bytes: Vec<u8>) -> Self {
        tracing::info!(
            filename = %filename,
            size = bytes.len(),
            "Export artifact generated"
        );
        Self {
            filename,
            mime_type,
            bytes,
        }
    }
}

/// Writes an artifact into `dir` (created if missing) under its own filename.
pub fn save_artifact(artifact: &ExportArtifact, dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&artifact.filename);
    std::fs::write(&path, &artifact.bytes)?;
    tracing::info!(path = %path.display(), "Export artifact saved");
    Ok(path)
}
