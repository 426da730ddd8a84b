//! Product storage. Products are stored whole, variants included; saving
//! replaces the stored document.

mod postgres;

pub use postgres::PgProductRepository;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::aggregates::Product;
use crate::domain::variants::Variant;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Product>, RepositoryError>;
    async fn save(&self, product: &Product) -> Result<(), RepositoryError>;

    async fn variants(&self, id: &str) -> Result<Option<Vec<Variant>>, RepositoryError> {
        Ok(self.get(id).await?.map(|p| p.variants().to_vec()))
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<String, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get(&self, id: &str) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut stored = product.clone();
        stored.take_events();
        self.products.write().await.insert(product.id().to_string(), stored);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Sku;
    use crate::domain::variants::fixtures::variant;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_save_replaces_variant_list() {
        let repo = InMemoryProductRepository::new();
        let mut p = Product::create(Sku::new("IP15").unwrap(), "iPhone 15", Decimal::new(20_000_000, 0));
        p.replace_variants(vec![variant("A", None, None, &[]), variant("B", None, None, &[])]).unwrap();
        repo.save(&p).await.unwrap();

        p.replace_variants(vec![variant("C", None, None, &[])]).unwrap();
        repo.save(&p).await.unwrap();

        let skus: Vec<String> = repo.variants(p.id()).await.unwrap().unwrap().into_iter().map(|v| v.sku).collect();
        assert_eq!(skus, vec!["C"]);
        assert!(repo.get("missing").await.unwrap().is_none());
        assert!(repo.variants("missing").await.unwrap().is_none());
    }
}
