pub mod analysis;
pub mod cli;
pub mod config;
pub mod export;
pub mod i18n;
pub mod inference;
pub mod models;
pub mod normalize;
pub mod risk;
pub mod store;
pub mod summary;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}
