//! Product variants: the persisted record, and the pure logic that generates
//! variant lists and resolves a shopper's picks against them.

pub mod builder;
pub mod generator;
pub mod matcher;
pub mod selection;

pub use builder::VariantBuilder;
pub use generator::{generate_variants, Combination, GenerateRequest, MAX_COMBINATIONS};
pub use matcher::{Availability, Dimension, DimensionOptions, Picks, Resolution, SelectionView, VariantMatcher};
pub use selection::{AttributeSelection, SelectionError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::vocabulary::{CHIP, COLOR, MEMORY, MODEL, SIZE, STORAGE, TYPE};

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;
pub const DEFAULT_VARIANT_NAME: &str = "Mặc định";

/// Attribute bag of a variant. Known dimensions are first-class fields,
/// anything else lands in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl VariantAttributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            STORAGE => self.storage.as_deref(),
            COLOR => self.color.as_deref(),
            MEMORY => self.memory.as_deref(),
            CHIP => self.chip.as_deref(),
            SIZE => self.size.as_deref(),
            other => self.extra.get(other).map(String::as_str),
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match name {
            STORAGE => self.storage = Some(value),
            COLOR => self.color = Some(value),
            MEMORY => self.memory = Some(value),
            CHIP => self.chip = Some(value),
            SIZE => self.size = Some(value),
            other => { self.extra.insert(other.to_string(), value); }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_none() && self.color.is_none() && self.memory.is_none()
            && self.chip.is_none() && self.size.is_none() && self.extra.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub sku: String,
    pub name: String,
    /// Condition / grade.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub variant_type: Option<String>,
    /// Connectivity / model variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub attributes: VariantAttributes,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Decimal,
    #[serde(default)]
    pub cost_price: Decimal,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub reserved: u32,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
}

fn default_low_stock_threshold() -> u32 { DEFAULT_LOW_STOCK_THRESHOLD }
fn default_true() -> bool { true }

impl Variant {
    /// Value of `attribute` on this variant, with `type` and `model` read from
    /// their top-level fields. Blank values count as absent.
    pub fn value(&self, attribute: &str) -> Option<&str> {
        let value = match attribute {
            TYPE => self.variant_type.as_deref(),
            MODEL => self.model.as_deref(),
            other => self.attributes.get(other),
        };
        value.filter(|v| !v.is_empty())
    }

    pub fn set_value(&mut self, attribute: &str, value: impl Into<String>) {
        match attribute {
            TYPE => self.variant_type = Some(value.into()),
            MODEL => self.model = Some(value.into()),
            other => self.attributes.set(other, value),
        }
    }

    /// View-layer stand-in for a product that has no variants. Never persisted.
    pub fn synthetic_default(sku: &str, price: Decimal, original_price: Decimal, stock: u32) -> Self {
        Self {
            sku: sku.to_string(),
            name: DEFAULT_VARIANT_NAME.to_string(),
            variant_type: None,
            model: None,
            attributes: VariantAttributes::default(),
            price,
            original_price,
            cost_price: Decimal::ZERO,
            stock,
            reserved: 0,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            image: None,
            images: vec![],
            is_active: true,
            is_featured: false,
        }
    }

    pub fn available_stock(&self) -> u32 { self.stock.saturating_sub(self.reserved) }
    pub fn is_low_stock(&self) -> bool { self.available_stock() <= self.low_stock_threshold }
    pub fn is_in_stock(&self) -> bool { self.available_stock() > 0 }

    /// Rejects negative prices; stored variants always carry non-negative ones.
    pub fn check_prices(&self) -> Result<(), VariantError> {
        non_negative(&self.sku, "price", self.price)?;
        non_negative(&self.sku, "original_price", self.original_price)?;
        non_negative(&self.sku, "cost_price", self.cost_price)
    }

    /// Applies `patch`, or leaves the variant untouched if a price in it is negative.
    pub fn apply(&mut self, patch: VariantPatch) -> Result<(), VariantError> {
        for (field, value) in [("price", patch.price), ("original_price", patch.original_price), ("cost_price", patch.cost_price)] {
            if let Some(value) = value { non_negative(&self.sku, field, value)?; }
        }
        if let Some(name) = patch.name { self.name = name; }
        if let Some(price) = patch.price { self.price = price; }
        if let Some(original_price) = patch.original_price { self.original_price = original_price; }
        if let Some(cost_price) = patch.cost_price { self.cost_price = cost_price; }
        if let Some(stock) = patch.stock { self.stock = stock; }
        if let Some(reserved) = patch.reserved { self.reserved = reserved; }
        if let Some(threshold) = patch.low_stock_threshold { self.low_stock_threshold = threshold; }
        if let Some(image) = patch.image { self.image = Some(image).filter(|i| !i.is_empty()); }
        if let Some(images) = patch.images { self.images = images; }
        if let Some(active) = patch.is_active { self.is_active = active; }
        if let Some(featured) = patch.is_featured { self.is_featured = featured; }
        Ok(())
    }
}

fn non_negative(sku: &str, field: &'static str, value: Decimal) -> Result<(), VariantError> {
    if value < Decimal::ZERO {
        return Err(VariantError::NegativePrice { sku: sku.to_string(), field });
    }
    Ok(())
}

/// Field-by-field edit of a variant. `None` leaves the field untouched; an
/// empty `image` clears it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VariantPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub stock: Option<u32>,
    pub reserved: Option<u32>,
    pub low_stock_threshold: Option<u32>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    #[error("no attribute values selected; nothing to generate")]
    EmptySelection,
    #[error("variant {0} not found")]
    NotFound(String),
    #[error("duplicate variant SKU {0}")]
    DuplicateSku(String),
    #[error("variant SKU is blank")]
    BlankSku,
    #[error("variant {sku}: {field} must not be negative")]
    NegativePrice { sku: String, field: &'static str },
    #[error("selection yields more than {max} combinations")]
    TooManyCombinations { max: usize },
}
