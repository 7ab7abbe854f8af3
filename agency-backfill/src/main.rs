//! # Agency Backfill
//!
//! Gives every non-privileged user without an agency an agency of their own,
//! then exits 0 if every user was handled and 1 otherwise.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://... cargo run -p agency-backfill
//! BACKFILL_DRY_RUN=true cargo run -p agency-backfill
//! ```

use std::process::ExitCode;

use agency_backfill::backfill::AgencyBackfill;
use agency_backfill::config::BackfillConfig;
use agency_backfill::error::{BackfillError, ConfigError};
use agency_backfill::report::RunReport;
use agency_backfill::store::PgAgencyStore;
use agency_shared::db::pool::{close_pool, create_pool};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agency_backfill=info,agency_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Agency backfill v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = run().await;
    if let Err(err) = &result {
        tracing::error!("Backfill failed: {:#}", err);
    }
    ExitCode::from(exit_status(&result))
}

/// 0 only when the run finished without any failure
fn exit_status(result: &anyhow::Result<RunReport>) -> u8 {
    match result {
        Ok(report) => report.exit_code(),
        Err(_) => 1,
    }
}

async fn run() -> anyhow::Result<RunReport> {
    let config = load_config(BackfillConfig::from_env())?;
    run_with(config).await
}

fn load_config(loaded: Result<BackfillConfig, ConfigError>) -> anyhow::Result<BackfillConfig> {
    loaded
        .map_err(BackfillError::from)
        .context("Failed to load configuration")
}

async fn run_with(config: BackfillConfig) -> anyhow::Result<RunReport> {
    tracing::info!(
        environment = %config.environment,
        require_tls = config.database.require_tls,
        dry_run = config.dry_run,
        "Configuration loaded"
    );

    let pool = create_pool(config.database.clone())
        .await
        .map_err(BackfillError::Connection)
        .context("Could not connect to the database")?;

    // From here on the pool is closed on every path before returning.
    let backfill = AgencyBackfill::new(PgAgencyStore::new(pool.clone()), config.failure_policy)
        .dry_run(config.dry_run);
    let report = backfill.run().await;

    close_pool(pool).await;

    report.log_summary();
    Ok(report)
}
