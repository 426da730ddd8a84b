//! HTTP surface.

mod products;
mod variants;

use axum::{http::StatusCode, routing::{get, patch, post}, Json, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::Cache;
use crate::domain::aggregates::Product;
use crate::domain::events::DomainEvent;
use crate::domain::variants::VariantError;
use crate::domain::vocabulary::Vocabulary;
use crate::repository::ProductRepository;
use crate::CatalogError;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ProductRepository>,
    pub cache: Arc<dyn Cache>,
    pub vocabulary: Arc<Vocabulary>,
    pub nats: Option<async_nats::Client>,
}

pub type ApiError = (StatusCode, String);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-variants"})) }))
        .route("/api/v1/attributes", get(products::list_attributes))
        .route("/api/v1/products", post(products::create_product))
        .route("/api/v1/products/:id", get(products::get_product).put(products::update_product))
        .route("/api/v1/products/:id/variants", post(variants::add_variant).put(variants::replace_variants).delete(variants::disable_variants))
        .route("/api/v1/products/:id/variants/generate", post(variants::generate_variants))
        .route("/api/v1/products/:id/variants/:sku", patch(variants::update_variant).delete(variants::remove_variant))
        .route("/api/v1/products/:id/resolve", get(variants::resolve_query).post(variants::resolve_body))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

pub(crate) fn api_error(e: impl Into<CatalogError>) -> ApiError {
    let e = e.into();
    let status = match &e {
        CatalogError::ProductNotFound(_) | CatalogError::Variant(VariantError::NotFound(_)) => StatusCode::NOT_FOUND,
        CatalogError::Variant(VariantError::DuplicateSku(_)) => StatusCode::CONFLICT,
        CatalogError::Variant(_)
        | CatalogError::Selection(_)
        | CatalogError::Sku(_)
        | CatalogError::Vocabulary(_)
        | CatalogError::Cart(_)
        | CatalogError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::Storage(_) | CatalogError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %e, "request failed");
    }
    (status, e.to_string())
}

pub(crate) fn validation_error(e: validator::ValidationErrors) -> ApiError {
    api_error(CatalogError::Validation(e.to_string()))
}

fn cache_key(id: &str) -> String { format!("product:{id}") }

/// Loads a product through the cache.
pub(crate) async fn load_product(s: &AppState, id: &str) -> Result<Product, ApiError> {
    let key = cache_key(id);
    if let Some(cached) = s.cache.get(&key).await {
        match serde_json::from_value::<Product>(cached) {
            Ok(product) => {
                tracing::debug!(product_id = id, "product cache hit");
                return Ok(product);
            }
            Err(e) => {
                tracing::warn!(product_id = id, error = %e, "dropping unreadable cache entry");
                s.cache.delete(&key).await;
            }
        }
    }
    let product = s.repo.get(id).await.map_err(api_error)?.ok_or_else(|| api_error(CatalogError::ProductNotFound(id.to_string())))?;
    if let Ok(value) = serde_json::to_value(&product) {
        s.cache.set(&key, value, None).await;
    }
    Ok(product)
}

/// Saves the product, invalidates its cache entry and publishes its events.
pub(crate) async fn commit(s: &AppState, product: &mut Product) -> Result<(), ApiError> {
    s.repo.save(product).await.map_err(api_error)?;
    s.cache.delete(&cache_key(product.id())).await;
    for event in product.take_events() {
        publish(s, &event).await;
    }
    Ok(())
}

async fn publish(s: &AppState, event: &DomainEvent) {
    let subject = event.subject();
    let Some(client) = &s.nats else {
        tracing::debug!(%subject, "no broker configured; event not published");
        return;
    };
    match serde_json::to_vec(event) {
        Ok(payload) => {
            if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                tracing::warn!(%subject, error = %e, "failed to publish event");
            }
        }
        Err(e) => tracing::warn!(%subject, error = %e, "failed to encode event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::repository::InMemoryProductRepository;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState {
            repo: Arc::new(InMemoryProductRepository::new()),
            cache: Arc::new(InMemoryCache::default()),
            vocabulary: Arc::new(Vocabulary::storefront()),
            nats: None,
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
        let response = app
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).header("content-type", "application/json").body(body).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
        let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    async fn create_ipad(app: &Router) -> String {
        let (status, product) = send(app, Method::POST, "/api/v1/products", Some(json!({"sku": "ipad", "name": "iPad Air M2", "price": 1000}))).await;
        assert_eq!(status, StatusCode::CREATED);
        product["id"].as_str().expect("id").to_string()
    }

    fn ipad_generation(save: bool) -> Value {
        json!({
            "attributes": [
                {"name": "type", "values": ["nguyen-seal", "openbox"]},
                {"name": "storage", "values": ["128GB", "256GB"]},
                {"name": "color", "values": []}
            ],
            "save": save
        })
    }

    #[tokio::test]
    async fn test_health_and_attributes() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        let (_, body) = send(&app, Method::GET, "/api/v1/attributes", None).await;
        assert_eq!(body["attributes"][0]["name"], "type");
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let app = app();
        let (status, _) = send(&app, Method::POST, "/api/v1/products", Some(json!({"sku": "", "name": "x", "price": 1}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (status, _) = send(&app, Method::GET, "/api/v1/products/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_generate_preview_does_not_persist() {
        let app = app();
        let id = create_ipad(&app).await;
        let (status, body) = send(&app, Method::POST, &format!("/api/v1/products/{id}/variants/generate"), Some(ipad_generation(false))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 4);
        assert_eq!(body["saved"], false);
        assert_eq!(body["variants"][0]["sku"], "IPAD-NGUYEN-128GB");
        assert_eq!(body["variants"][0]["name"], "Nguyên Seal - 128GB");
        assert_eq!(body["variants"][0]["is_featured"], true);

        let (_, product) = send(&app, Method::GET, &format!("/api/v1/products/{id}"), None).await;
        assert_eq!(product["variants"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_selection() {
        let app = app();
        let id = create_ipad(&app).await;
        let body = json!({"attributes": [{"name": "type", "values": []}]});
        let (status, _) = send(&app, Method::POST, &format!("/api/v1/products/{id}/variants/generate"), Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (status, _) = send(&app, Method::POST, &format!("/api/v1/products/{id}/variants/generate"), Some(json!({"attributes": []}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_generate_rejects_oversized_selection() {
        let app = app();
        let id = create_ipad(&app).await;
        let values: Vec<String> = (0..40).map(|i| format!("v{i}")).collect();
        let attributes: Vec<Value> = (0..8).map(|i| json!({"name": format!("attr{i}"), "values": values})).collect();
        let (status, body) = send(&app, Method::POST, &format!("/api/v1/products/{id}/variants/generate"), Some(json!({"attributes": attributes}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.as_str().is_some_and(|msg| msg.contains("1000")));
    }

    #[tokio::test]
    async fn test_negative_variant_price_is_rejected() {
        let app = app();
        let id = create_ipad(&app).await;
        send(&app, Method::POST, &format!("/api/v1/products/{id}/variants/generate"), Some(ipad_generation(true))).await;
        let uri = format!("/api/v1/products/{id}/variants/IPAD-NGUYEN-128GB");
        let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({"price": -500, "cost_price": -1}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, product) = send(&app, Method::GET, &format!("/api/v1/products/{id}"), None).await;
        assert_eq!(product["variants"][0]["price"], "1000");
    }

    #[tokio::test]
    async fn test_regenerate_keeps_edited_stock() {
        let app = app();
        let id = create_ipad(&app).await;
        let uri = format!("/api/v1/products/{id}/variants/generate");
        let (status, _) = send(&app, Method::POST, &uri, Some(ipad_generation(true))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::PATCH, &format!("/api/v1/products/{id}/variants/IPAD-OPENBO-256GB"), Some(json!({"stock": 50}))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, Method::POST, &uri, Some(ipad_generation(true))).await;
        assert_eq!(body["variants"][3]["sku"], "IPAD-OPENBO-256GB");
        assert_eq!(body["variants"][3]["stock"], 50);
        assert_eq!(body["variants"][0]["stock"], 0);
    }

    #[tokio::test]
    async fn test_variant_lifecycle_endpoints() {
        let app = app();
        let id = create_ipad(&app).await;
        let base = format!("/api/v1/products/{id}/variants");
        let variant = json!({"sku": "IPAD-CPO", "name": "CPO", "type": "cpo", "price": 900, "stock": 3});

        let (status, _) = send(&app, Method::POST, &base, Some(variant.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, Method::POST, &base, Some(variant)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let replacement = json!([{"sku": "A", "name": "A"}, {"sku": "B", "name": "B", "is_active": false}]);
        let (status, product) = send(&app, Method::PUT, &base, Some(replacement)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(product["variants"].as_array().map(Vec::len), Some(2));

        let (status, _) = send(&app, Method::DELETE, &format!("{base}/A"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::DELETE, &format!("{base}/A"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::DELETE, &base, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["removed"], 1);
    }

    #[tokio::test]
    async fn test_resolve() {
        let app = app();
        let id = create_ipad(&app).await;
        send(&app, Method::POST, &format!("/api/v1/products/{id}/variants/generate"), Some(ipad_generation(true))).await;

        let (status, view) = send(&app, Method::GET, &format!("/api/v1/products/{id}/resolve?storage=256GB"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["picks"]["type"], "nguyen-seal");
        assert_eq!(view["variant"]["sku"], "IPAD-NGUYEN-256GB");
        assert_eq!(view["exact_match"], true);

        let (_, view) = send(&app, Method::POST, &format!("/api/v1/products/{id}/resolve"), Some(json!({"type": "cpo", "storage": "512GB"}))).await;
        assert_eq!(view["exact_match"], false);
        assert_eq!(view["variant"]["sku"], "IPAD-NGUYEN-128GB");
    }

    #[tokio::test]
    async fn test_resolve_zero_variant_product() {
        let app = app();
        let id = create_ipad(&app).await;
        let (status, _) = send(&app, Method::PUT, &format!("/api/v1/products/{id}"), Some(json!({"stock": 4}))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, view) = send(&app, Method::POST, &format!("/api/v1/products/{id}/resolve"), Some(json!({}))).await;
        assert_eq!(view["variant"]["name"], "Mặc định");
        assert_eq!(view["variant"]["stock"], 4);
        assert_eq!(view["options"], json!([]));
    }
}
