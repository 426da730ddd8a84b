use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;

use super::{ProductRepository, RepositoryError};
use crate::domain::aggregates::Product;

/// Products stored as JSONB documents keyed by id.
#[derive(Clone)]
pub struct PgProductRepository {
    db: PgPool,
}

impl PgProductRepository {
    pub fn new(db: PgPool) -> Self { Self { db } }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let db = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
        sqlx::migrate!("./migrations").run(&db).await?;
        Ok(Self { db })
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn get(&self, id: &str) -> Result<Option<Product>, RepositoryError> {
        let row: Option<(Json<Product>,)> = sqlx::query_as("SELECT document FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(|(Json(product),)| product))
    }

    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO products (id, sku, document, updated_at) VALUES ($1, $2, $3, $4) ON CONFLICT (id) DO UPDATE SET sku = EXCLUDED.sku, document = EXCLUDED.document, updated_at = EXCLUDED.updated_at")
            .bind(product.id())
            .bind(product.sku().as_str())
            .bind(Json(product))
            .bind(product.updated_at())
            .execute(&self.db)
            .await?;
        tracing::debug!(product_id = product.id(), variants = product.variants().len(), "product saved");
        Ok(())
    }
}
