use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use xray_report_lib::analysis::{analyze_image, AnalysisError};
use xray_report_lib::cli::{Cli, Commands, ExportArgs, PredictArgs, ReportArgs};
use xray_report_lib::config::AppConfig;
use xray_report_lib::export::{export_format, save_artifact, ExportFormat};
use xray_report_lib::i18n::Language;
use xray_report_lib::inference::HttpInferenceClient;
use xray_report_lib::models::{RawPayload, ReportMetadata};
use xray_report_lib::normalize::normalize_payload;
use xray_report_lib::store::{
    CreditLedger, HistoryStore, ReviewStore, SqliteStore, CREDIT_PACKAGES,
};
use xray_report_lib::summary::{DashboardStats, PlainSummary};

fn main() -> Result<()> {
    xray_report_lib::init_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    tracing::info!(
        version = xray_report_lib::config::APP_VERSION,
        data_dir = %config.data_dir.display(),
        "xray-report starting"
    );

    match cli.command {
        Commands::Export(args) => run_export(&config, args),
        Commands::Predict(args) => run_predict(&config, args),
        Commands::History(args) => {
            let store = open_store(&config)?;
            let items = HistoryStore::new(&store).list()?;
            if items.is_empty() {
                println!("No saved analyses.");
            }
            for item in items.iter().take(args.limit) {
                let conditions = normalize_payload(&RawPayload::detect(&item.predictions)).len();
                println!(
                    "{}  {}  {}  {}  ({} conditions)",
                    item.id,
                    item.date,
                    item.patient_name.as_deref().unwrap_or("-"),
                    item.file_name,
                    conditions
                );
            }
            Ok(())
        }
        Commands::Credits(args) => {
            let store = open_store(&config)?;
            let ledger = CreditLedger::new(&store, &args.user);
            if let Some(package) = args.buy.as_deref() {
                let balance = ledger
                    .purchase(package)
                    .with_context(|| format!("available packages: {}", package_ids()))?;
                println!("Purchased {package}; balance is now {balance}.");
            } else {
                println!("Credits: {}", ledger.balance()?);
                println!("Free credits used: {}", ledger.free_credits_used()?);
                for entry in ledger.history()? {
                    println!("{}  {:+}  {}", entry.date, entry.amount, entry.description);
                }
            }
            Ok(())
        }
        Commands::Review(args) => {
            let store = open_store(&config)?;
            if HistoryStore::new(&store).get(&args.analysis)?.is_none() {
                anyhow::bail!("no saved analysis with id {}", args.analysis);
            }
            let review = ReviewStore::new(&store).add(
                &args.analysis,
                args.rating,
                &args.comment,
                args.user_name.as_deref(),
            )?;
            println!("Saved review {}", review.id);
            Ok(())
        }
    }
}

fn open_store(config: &AppConfig) -> Result<SqliteStore> {
    let path = config.database_path();
    SqliteStore::open(&path).with_context(|| format!("failed to open store at {}", path.display()))
}

fn package_ids() -> String {
    CREDIT_PACKAGES
        .iter()
        .map(|p| p.id)
        .collect::<Vec<_>>()
        .join(", ")
}

fn run_export(config: &AppConfig, args: ExportArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let raw: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", args.input.display()))?;

    let written = export_payload(config, &raw, &args.report, &args.format.formats())?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn run_predict(config: &AppConfig, args: PredictArgs) -> Result<()> {
    let store = open_store(config)?;
    let ledger = CreditLedger::new(&store, &args.user);
    let url = args.url.as_deref().unwrap_or(&config.api_url);
    let client = HttpInferenceClient::new(url, config.api_timeout_secs)?;

    let analysis = match analyze_image(
        &client,
        &ledger,
        &HistoryStore::new(&store),
        &args.image,
        args.report.patient_name.clone(),
    ) {
        Err(AnalysisError::NoCredits(user)) => anyhow::bail!(
            "no credits left for user {user}; purchase a package with `xray-report credits --buy <{}>`",
            package_ids()
        ),
        other => other?,
    };

    let stats = DashboardStats::from_results(&analysis.results);
    println!("Analysis {}", analysis.item.id);
    println!(
        "Conditions: {}  High: {}  Moderate: {}  Low: {}  Average: {:.1}%",
        stats.total, stats.high, stats.moderate, stats.low, stats.average_percentage
    );
    for result in &stats.top_risks {
        println!(
            "  {:<28} {:>7.2}%  {}",
            result.display_name(),
            result.percentage(),
            result.risk_level()
        );
    }

    let payload = RawPayload::detect(&analysis.raw);
    let plain = PlainSummary::generate(
        &analysis.results,
        args.report.patient_name.as_deref(),
        payload.model(),
    );
    println!("\n{}\n", plain.summary);
    for line in &plain.recommendations {
        println!("- {line}");
    }
    println!("Credits remaining: {}", analysis.credits_remaining);

    if let Some(format) = args.format {
        for path in export_payload(config, &analysis.raw, &args.report, &format.formats())? {
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn export_payload(
    config: &AppConfig,
    raw: &Value,
    report: &ReportArgs,
    formats: &[ExportFormat],
) -> Result<Vec<PathBuf>> {
    let payload = RawPayload::detect(raw);
    let results = normalize_payload(&payload);
    let metadata = ReportMetadata::now()
        .with_patient_name(report.patient_name.as_deref())
        .with_payload(&payload);
    let lang = Language::from_code(&report.lang);
    let out = report.out.clone().unwrap_or_else(|| config.exports_dir());

    formats
        .iter()
        .map(|format| {
            let artifact = export_format(*format, &results, raw, &metadata, lang)
                .with_context(|| format!("{format} export failed"))?;
            save_artifact(&artifact, &out)
                .with_context(|| format!("failed to write {}", artifact.filename))
        })
        .collect()
}
