//! Storefront Variants - product variant generation and selection service

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_variants::api::{router, AppState};
use storefront_variants::cache::InMemoryCache;
use storefront_variants::config::Config;
use storefront_variants::domain::vocabulary::Vocabulary;
use storefront_variants::repository::{InMemoryProductRepository, PgProductRepository, ProductRepository};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let repo: Arc<dyn ProductRepository> = match &config.database_url {
        Some(url) => Arc::new(PgProductRepository::connect(url, config.database_max_connections).await?),
        None => {
            tracing::warn!("DATABASE_URL not set; products are kept in memory");
            Arc::new(InMemoryProductRepository::new())
        }
    };
    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable; events will not be published");
                None
            }
        },
        None => None,
    };
    let state = AppState {
        repo,
        cache: Arc::new(InMemoryCache::new(Some(config.cache_ttl))),
        vocabulary: Arc::new(Vocabulary::storefront()),
        nats,
    };

    let app = router(state);
    tracing::info!("🚀 Storefront variants listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
