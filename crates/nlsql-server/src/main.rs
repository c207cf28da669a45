//! nlsql HTTP server
//!
//! Translates natural-language questions into SQL and runs them against an
//! in-memory dataset.

use anyhow::Context;
use nlsql_ir::Dataset;
use nlsql_server::config::Config;
use nlsql_server::history::QueryHistory;
use nlsql_server::http::{self, AppState};
use nlsql_server::metrics::Metrics;
use nlsql_server::{logging, Converter};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config_path = Config::default_path();
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    logging::init(&config.logging).context("installing log subscriber")?;

    let dataset = match &config.dataset.path {
        Some(path) => Dataset::from_json_file(path)
            .with_context(|| format!("loading dataset {}", path.display()))?,
        None => Dataset::sample(),
    };
    info!(
        tables = ?dataset.table_names().collect::<Vec<_>>(),
        "dataset loaded"
    );

    let state = AppState::new(
        Converter::with_dataset(Arc::new(dataset)),
        QueryHistory::with_capacity(config.history.capacity),
        Metrics::new().context("registering metrics")?,
    );

    http::serve(&config.server.addr(), state).await?;

    Ok(())
}
