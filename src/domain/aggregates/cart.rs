//! Cart Aggregate
//!
//! Lines are keyed by product and variant SKU and priced from the variant the
//! product page resolved.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::Money;
use crate::domain::variants::Variant;

#[derive(Clone, Debug)]
pub struct Cart {
    id: String,
    customer_id: Option<String>,
    items: Vec<CartItem>,
    subtotal: Money,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CartItem {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl CartItem {
    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(), customer_id: None,
            items: vec![], subtotal: Money::zero(currency), currency: currency.to_string(),
            created_at: Utc::now(), updated_at: Utc::now(),
        }
    }

    pub fn for_customer(customer_id: impl Into<String>, currency: &str) -> Self {
        let mut cart = Self::new(currency);
        cart.customer_id = Some(customer_id.into());
        cart
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn customer_id(&self) -> Option<&str> { self.customer_id.as_deref() }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    /// Adds `quantity` of a resolved variant, merging with an existing line.
    /// The merged quantity may not exceed the variant's unreserved stock.
    pub fn add_variant(&mut self, product_id: &str, variant: &Variant, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 { return Err(CartError::InvalidQuantity); }
        if !variant.is_active { return Err(CartError::InactiveVariant(variant.sku.clone())); }
        let in_cart = self.find(product_id, &variant.sku).map(|i| i.quantity).unwrap_or(0);
        let requested = in_cart.saturating_add(quantity);
        let available = variant.available_stock();
        if requested > available {
            return Err(CartError::InsufficientStock { sku: variant.sku.clone(), requested, available });
        }
        match self.items.iter_mut().find(|i| i.product_id == product_id && i.sku == variant.sku) {
            Some(existing) => existing.quantity = requested,
            None => self.items.push(CartItem {
                product_id: product_id.to_string(),
                sku: variant.sku.clone(),
                name: variant.name.clone(),
                quantity,
                unit_price: Money::new(variant.price, &self.currency),
            }),
        }
        self.recalculate();
        Ok(())
    }

    /// Sets the line for `variant` to `quantity`; zero removes it. Raising a
    /// line is checked against the variant's unreserved stock like an add.
    pub fn update_quantity(&mut self, product_id: &str, variant: &Variant, quantity: u32) -> Result<(), CartError> {
        if self.find(product_id, &variant.sku).is_none() { return Err(CartError::ItemNotFound); }
        if quantity == 0 {
            self.items.retain(|i| !(i.product_id == product_id && i.sku == variant.sku));
        } else {
            if !variant.is_active { return Err(CartError::InactiveVariant(variant.sku.clone())); }
            let available = variant.available_stock();
            if quantity > available {
                return Err(CartError::InsufficientStock { sku: variant.sku.clone(), requested: quantity, available });
            }
            if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id && i.sku == variant.sku) {
                item.quantity = quantity;
            }
        }
        self.recalculate();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str, sku: &str) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| !(i.product_id == product_id && i.sku == sku));
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        self.recalculate();
        Ok(())
    }

    pub fn clear(&mut self) { self.items.clear(); self.recalculate(); }

    fn find(&self, product_id: &str, sku: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id && i.sku == sku)
    }

    fn recalculate(&mut self) {
        self.subtotal = self.items.iter().fold(Money::zero(&self.currency), |acc, i| acc.add(&i.line_total()).unwrap_or(acc));
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Item not found")]
    ItemNotFound,
    #[error("Invalid quantity")]
    InvalidQuantity,
    #[error("variant {0} is not for sale")]
    InactiveVariant(String),
    #[error("only {available} of {sku} available, {requested} requested")]
    InsufficientStock { sku: String, requested: u32, available: u32 },
}
