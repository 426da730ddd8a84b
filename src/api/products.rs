use axum::{extract::{Path, State}, http::StatusCode, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::{api_error, commit, load_product, validation_error, ApiError, AppState};
use crate::domain::aggregates::{Product, ProductDetails};
use crate::domain::value_objects::Sku;
use crate::domain::vocabulary::Vocabulary;

pub(super) async fn list_attributes(State(s): State<AppState>) -> Json<Vocabulary> {
    Json(s.vocabulary.as_ref().clone())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub stock: Option<u32>,
}

pub(super) async fn create_product(State(s): State<AppState>, Json(r): Json<CreateProductRequest>) -> Result<(StatusCode, Json<Product>), ApiError> {
    r.validate().map_err(validation_error)?;
    let sku = Sku::new(r.sku).map_err(api_error)?;
    let mut product = Product::create(sku, r.name, r.price);
    if r.description.is_some() || r.original_price.is_some() || r.stock.is_some() {
        product.update_details(ProductDetails { description: r.description, original_price: r.original_price, stock: r.stock, ..Default::default() });
    }
    commit(&s, &mut product).await?;
    tracing::info!(product_id = product.id(), sku = %product.sku(), "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub(super) async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>, ApiError> {
    load_product(&s, &id).await.map(Json)
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub stock: Option<u32>,
}

pub(super) async fn update_product(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<UpdateProductRequest>) -> Result<Json<Product>, ApiError> {
    r.validate().map_err(validation_error)?;
    let mut product = load_product(&s, &id).await?;
    product.update_details(ProductDetails { name: r.name, description: r.description, price: r.price, original_price: r.original_price, stock: r.stock });
    commit(&s, &mut product).await?;
    Ok(Json(product))
}
