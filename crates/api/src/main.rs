use std::sync::Arc;

use anyhow::Context;

use stockfinder_api::app::{self, services::AppServices};
use stockfinder_infra::{AppConfig, CatalogSeed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockfinder_observability::init();

    let config = AppConfig::from_env();
    let services = Arc::new(AppServices::in_memory(config.clone()));

    match &config.seed_file {
        Some(path) => {
            CatalogSeed::load(path)
                .and_then(|seed| seed.apply(&services.catalog))
                .with_context(|| format!("failed to seed catalog from {}", path.display()))?;
        }
        None => tracing::warn!("STOCKFINDER_SEED_FILE not set; starting with an empty catalog"),
    }

    let app = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
