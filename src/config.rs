use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "XrayReport";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_API_URL: &str = "http://localhost:8000/predict";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 120;

/// Upload history keeps only the most recent analyses.
pub const MAX_HISTORY_ITEMS: usize = 100;
/// Credits granted to a user on first use.
pub const INITIAL_FREE_CREDITS: u32 = 3;

pub const ENV_API_URL: &str = "XRAY_API_URL";
pub const ENV_API_TIMEOUT: &str = "XRAY_API_TIMEOUT_SECS";
pub const ENV_DATA_DIR: &str = "XRAY_DATA_DIR";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,xray_report_lib=info,xray_report=info"
}

/// ~/XrayReport/ when the home directory is known, otherwise the working directory.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from(APP_NAME))
}

/// Runtime settings, resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub api_timeout_secs: u64,
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            data_dir: default_data_dir(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup`; unset, blank or unparsable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(raw) = get(ENV_API_TIMEOUT) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.api_timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "Ignoring invalid {ENV_API_TIMEOUT}"),
            }
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        config
    }

    /// Where exported reports are written by default.
    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }

    /// SQLite file backing the local stores.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("xray-report.db")
    }
}
