//! Storefront Variants
//!
//! Product variant service for an electronics storefront.
//!
//! ## Features
//! - Attribute vocabulary (condition, model, storage, memory, color, size, chip)
//! - Cartesian variant generation that keeps admin edits on regeneration
//! - Variant resolution and option availability for the product page
//! - Variant lifecycle on the product document (add, edit, remove, disable)
//! - Cart lines priced from resolved variants

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod repository;

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::aggregates::CartError;
use crate::domain::value_objects::SkuError;
use crate::domain::variants::{SelectionError, VariantError};
use crate::domain::vocabulary::VocabularyError;
use crate::repository::RepositoryError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("product {0} not found")]
    ProductNotFound(String),

    #[error(transparent)]
    Variant(#[from] VariantError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("invalid SKU: {0}")]
    Sku(#[from] SkuError),

    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
