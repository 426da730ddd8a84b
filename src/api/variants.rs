use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{api_error, commit, load_product, validation_error, ApiError, AppState};
use crate::domain::aggregates::Product;
use crate::domain::value_objects::Sku;
use crate::domain::variants::{AttributeSelection, Picks, SelectionView, Variant, VariantPatch};

#[derive(Debug, Deserialize, Validate)]
pub struct AttributeValues {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Attributes in generation order, each with its chosen values.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateVariantsRequest {
    #[validate]
    pub attributes: Vec<AttributeValues>,
    pub base_sku: Option<String>,
    pub base_price: Option<Decimal>,
    /// Replace the stored variant list with the result.
    #[serde(default)]
    pub save: bool,
}

impl GenerateVariantsRequest {
    fn selection(&self) -> Result<AttributeSelection, ApiError> {
        let mut selection = AttributeSelection::new();
        for attr in &self.attributes {
            selection.select_attribute(&attr.name);
            for value in &attr.values {
                selection.add_value(attr.name.trim(), value.as_str()).map_err(api_error)?;
            }
        }
        Ok(selection)
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateVariantsResponse {
    pub count: usize,
    pub saved: bool,
    pub variants: Vec<Variant>,
}

pub(super) async fn generate_variants(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<GenerateVariantsRequest>) -> Result<Json<GenerateVariantsResponse>, ApiError> {
    r.validate().map_err(validation_error)?;
    let selection = r.selection()?;
    let base_sku = r.base_sku.as_deref().map(Sku::new).transpose().map_err(api_error)?;
    let mut product = load_product(&s, &id).await?;

    let variants = if r.save {
        let variants = product.regenerate_variants(&selection, &s.vocabulary, base_sku.as_ref(), r.base_price).map_err(api_error)?.to_vec();
        commit(&s, &mut product).await?;
        variants
    } else {
        product.preview_variants(&selection, &s.vocabulary, base_sku.as_ref(), r.base_price).map_err(api_error)?
    };
    tracing::info!(product_id = %id, count = variants.len(), saved = r.save, "variants generated");
    Ok(Json(GenerateVariantsResponse { count: variants.len(), saved: r.save, variants }))
}

pub(super) async fn replace_variants(State(s): State<AppState>, Path(id): Path<String>, Json(variants): Json<Vec<Variant>>) -> Result<Json<Product>, ApiError> {
    let mut product = load_product(&s, &id).await?;
    product.replace_variants(variants).map_err(api_error)?;
    commit(&s, &mut product).await?;
    Ok(Json(product))
}

pub(super) async fn add_variant(State(s): State<AppState>, Path(id): Path<String>, Json(variant): Json<Variant>) -> Result<(StatusCode, Json<Product>), ApiError> {
    let mut product = load_product(&s, &id).await?;
    product.add_variant(variant).map_err(api_error)?;
    commit(&s, &mut product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub(super) async fn update_variant(State(s): State<AppState>, Path((id, sku)): Path<(String, String)>, Json(patch): Json<VariantPatch>) -> Result<Json<Variant>, ApiError> {
    let mut product = load_product(&s, &id).await?;
    let updated = product.update_variant(&sku, patch).map_err(api_error)?.clone();
    commit(&s, &mut product).await?;
    Ok(Json(updated))
}

pub(super) async fn remove_variant(State(s): State<AppState>, Path((id, sku)): Path<(String, String)>) -> Result<StatusCode, ApiError> {
    let mut product = load_product(&s, &id).await?;
    product.remove_variant(&sku).map_err(api_error)?;
    commit(&s, &mut product).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn disable_variants(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let mut product = load_product(&s, &id).await?;
    let removed = product.disable_variants();
    commit(&s, &mut product).await?;
    Ok(Json(serde_json::json!({"removed": removed})))
}

pub(super) async fn resolve_query(State(s): State<AppState>, Path(id): Path<String>, Query(picks): Query<Picks>) -> Result<Json<SelectionView>, ApiError> {
    let product = load_product(&s, &id).await?;
    Ok(Json(product.selection_view(picks)))
}

pub(super) async fn resolve_body(State(s): State<AppState>, Path(id): Path<String>, Json(picks): Json<Picks>) -> Result<Json<SelectionView>, ApiError> {
    let product = load_product(&s, &id).await?;
    Ok(Json(product.selection_view(picks)))
}
