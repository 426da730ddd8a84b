//! Domain events
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Product(ProductEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: String, sku: String },
    DetailsUpdated { product_id: String },
    VariantsRegenerated { product_id: String, total: usize, preserved: usize },
    VariantsReplaced { product_id: String, total: usize },
    VariantAdded { product_id: String, sku: String },
    VariantUpdated { product_id: String, sku: String },
    VariantRemoved { product_id: String, sku: String },
    VariantsCleared { product_id: String, removed: usize },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> String {
        match self {
            DomainEvent::Product(e) => format!("catalog.product.{}", e.name()),
        }
    }
}

impl ProductEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ProductEvent::Created { .. } => "created",
            ProductEvent::DetailsUpdated { .. } => "details_updated",
            ProductEvent::VariantsRegenerated { .. } => "variants_regenerated",
            ProductEvent::VariantsReplaced { .. } => "variants_replaced",
            ProductEvent::VariantAdded { .. } => "variant_added",
            ProductEvent::VariantUpdated { .. } => "variant_updated",
            ProductEvent::VariantRemoved { .. } => "variant_removed",
            ProductEvent::VariantsCleared { .. } => "variants_cleared",
        }
    }
}
