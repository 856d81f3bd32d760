use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{ENV_API_URL, ENV_DATA_DIR};
use crate::export::ExportFormat;

#[derive(Debug, Parser)]
#[command(
    name = "xray-report",
    version,
    about = "Chest X-ray prediction reports (PDF, CSV, XLSX, JSON)"
)]
pub struct Cli {
    #[arg(long, global = true, env = ENV_DATA_DIR, help = "Data directory for exports and local stores")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize a saved prediction payload and write report files.
    Export(ExportArgs),
    /// Upload an image to the inference API, then summarize and optionally export.
    Predict(PredictArgs),
    /// List saved analyses, newest first.
    History(HistoryArgs),
    /// Show or top up a user's credit balance.
    Credits(CreditsArgs),
    /// Leave a rating on a saved analysis.
    Review(ReviewArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[arg(long, help = "Patient name shown in the reports")]
    pub patient_name: Option<String>,

    #[arg(long, default_value = "en", help = "Report language: en|fr|ar (unknown codes fall back to en)")]
    pub lang: String,

    #[arg(long, help = "Output directory (default: <data-dir>/exports)")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(long, help = "Prediction payload (JSON file)")]
    pub input: PathBuf,

    #[arg(long, value_enum, default_value_t = FormatArg::All)]
    pub format: FormatArg,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    #[arg(long, help = "Chest X-ray image to analyze")]
    pub image: PathBuf,

    #[arg(long, env = ENV_API_URL, help = "Inference endpoint")]
    pub url: Option<String>,

    #[arg(long, value_enum, help = "Also export the result in this format")]
    pub format: Option<FormatArg>,

    #[arg(long, default_value = "local", help = "User whose credits are charged")]
    pub user: String,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct CreditsArgs {
    #[arg(long, default_value = "local")]
    pub user: String,

    #[arg(long, help = "Package to purchase, e.g. 15-credits")]
    pub buy: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReviewArgs {
    #[arg(long, help = "History entry id")]
    pub analysis: String,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub rating: u8,

    #[arg(long, default_value = "")]
    pub comment: String,

    #[arg(long)]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Pdf,
    Csv,
    Xlsx,
    Json,
    All,
}

impl FormatArg {
    pub fn formats(self) -> Vec<ExportFormat> {
        match self {
            FormatArg::Pdf => vec![ExportFormat::Pdf],
            FormatArg::Csv => vec![ExportFormat::Csv],
            FormatArg::Xlsx => vec![ExportFormat::Xlsx],
            FormatArg::Json => vec![ExportFormat::Json],
            FormatArg::All => ExportFormat::ALL.to_vec(),
        }
    }
}
