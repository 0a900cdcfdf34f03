use anyhow::Context;
use tracing::info;

use canteen_api as api;

/// Prepares the database for serving: applies pending migrations, runs the
/// data normalizer, and seeds demo data on a fresh installation. A migration
/// failure is fatal; no partial schema state survives it.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config().context("loading configuration")?;
    api::config::init_tracing(&cfg.log_level, cfg.log_json);

    let db = api::db::establish_connection(&(&cfg).into())
        .await
        .context("connecting to the database")?;

    if cfg.auto_migrate {
        api::db::run_migrations(&db)
            .await
            .context("applying schema migrations")?;
    }

    let report = api::normalizer::run(&db)
        .await
        .context("normalizing data")?;
    if report.legacy_requests_reconciled > 0 {
        info!(
            count = report.legacy_requests_reconciled,
            "legacy purchase requests were reconciled"
        );
    }

    api::seed::ensure_seed_data(&db)
        .await
        .context("seeding demo data")?;

    info!("database ready");
    Ok(())
}
