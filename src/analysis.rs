//! One paid analysis: upload an image, record it, then charge one credit.
//!
//! The balance is checked before the upload but only spent once the server
//! returned a payload, so a failed upload costs nothing.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::inference::{InferenceClient, InferenceError};
use crate::models::{NormalizedResult, RawPayload};
use crate::normalize::normalize_payload;
use crate::store::{CreditLedger, HistoryItem, HistoryStore, NewHistoryItem, StoreError};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("no credits left for user {0}")]
    NoCredits(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A completed analysis and the balance left after paying for it.
#[derive(Debug)]
pub struct Analysis {
    pub item: HistoryItem,
    pub raw: Value,
    pub results: Vec<NormalizedResult>,
    pub credits_remaining: u32,
}

pub fn analyze_image(
    client: &dyn InferenceClient,
    ledger: &CreditLedger<'_>,
    history: &HistoryStore<'_>,
    image: &Path,
    patient_name: Option<String>,
) -> Result<Analysis, AnalysisError> {
    if ledger.balance()? == 0 {
        return Err(AnalysisError::NoCredits(ledger.user_id().to_string()));
    }

    let raw = client.predict_file(image)?;
    let results = normalize_payload(&RawPayload::detect(&raw));

    let item = history.add(NewHistoryItem {
        patient_name,
        file_name: file_name_of(image),
        predictions: raw.clone(),
    })?;
    if !ledger.use_credit()? {
        return Err(AnalysisError::NoCredits(ledger.user_id().to_string()));
    }
    let credits_remaining = ledger.balance()?;

    tracing::info!(
        analysis = %item.id,
        conditions = results.len(),
        credits_remaining,
        "Analysis complete"
    );
    Ok(Analysis {
        item,
        raw,
        results,
        credits_remaining,
    })
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
