//! Product Aggregate
//!
//! The product exclusively owns its variant list. Every mutation of that list
//! goes through this aggregate so SKU uniqueness holds and an event is raised.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::Sku;
use crate::domain::variants::{
    generate_variants, AttributeSelection, GenerateRequest, Picks, SelectionView, Variant, VariantError,
    VariantMatcher, VariantPatch,
};
use crate::domain::vocabulary::Vocabulary;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    id: String,
    sku: Sku,
    name: String,
    #[serde(default)]
    description: String,
    price: Decimal,
    #[serde(default)]
    original_price: Decimal,
    #[serde(default)]
    stock: u32,
    #[serde(default)]
    variants: Vec<Variant>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// Editable top-level fields of a product.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub stock: Option<u32>,
}

impl Product {
    pub fn create(sku: Sku, name: impl Into<String>, price: Decimal) -> Self {
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();
        let mut product = Self {
            id: id.clone(), sku: sku.clone(), name: name.into(), description: String::new(),
            price: price.max(Decimal::ZERO), original_price: Decimal::ZERO, stock: 0, variants: vec![],
            created_at: now, updated_at: now, events: vec![],
        };
        product.raise_event(ProductEvent::Created { product_id: id, sku: sku.to_string() });
        product
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn sku(&self) -> &Sku { &self.sku }
    pub fn name(&self) -> &str { &self.name }
    pub fn description(&self) -> &str { &self.description }
    pub fn price(&self) -> Decimal { self.price }
    pub fn original_price(&self) -> Decimal { self.original_price }
    pub fn stock(&self) -> u32 { self.stock }
    pub fn variants(&self) -> &[Variant] { &self.variants }
    pub fn has_variants(&self) -> bool { !self.variants.is_empty() }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn variant(&self, sku: &str) -> Option<&Variant> { self.variants.iter().find(|v| v.sku == sku) }

    pub fn update_details(&mut self, details: ProductDetails) {
        if let Some(name) = details.name { self.name = name; }
        if let Some(description) = details.description { self.description = description; }
        if let Some(price) = details.price { self.price = price.max(Decimal::ZERO); }
        if let Some(original_price) = details.original_price { self.original_price = original_price.max(Decimal::ZERO); }
        if let Some(stock) = details.stock { self.stock = stock; }
        self.touch();
        self.raise_event(ProductEvent::DetailsUpdated { product_id: self.id.clone() });
    }

    /// Runs generation against the current variants and replaces the list
    /// with the result. Defaults to the product's own SKU and price.
    pub fn regenerate_variants(
        &mut self,
        selection: &AttributeSelection,
        vocabulary: &Vocabulary,
        base_sku: Option<&Sku>,
        base_price: Option<Decimal>,
    ) -> Result<&[Variant], VariantError> {
        let generated = self.preview_variants(selection, vocabulary, base_sku, base_price)?;
        let preserved = generated.iter().filter(|g| self.variants.contains(g)).count();
        let total = generated.len();
        self.variants = generated;
        self.touch();
        self.raise_event(ProductEvent::VariantsRegenerated { product_id: self.id.clone(), total, preserved });
        Ok(&self.variants)
    }

    /// Generation without touching the product; the editing form keeps the
    /// result until it is saved with [`Product::replace_variants`].
    pub fn preview_variants(
        &self,
        selection: &AttributeSelection,
        vocabulary: &Vocabulary,
        base_sku: Option<&Sku>,
        base_price: Option<Decimal>,
    ) -> Result<Vec<Variant>, VariantError> {
        let req = GenerateRequest {
            selection,
            existing: &self.variants,
            base_price: base_price.unwrap_or(self.price),
            base_sku: base_sku.unwrap_or(&self.sku),
        };
        generate_variants(&req, vocabulary)
    }

    /// Full replacement of the variant list.
    pub fn replace_variants(&mut self, variants: Vec<Variant>) -> Result<(), VariantError> {
        let mut seen = HashSet::new();
        for v in &variants {
            if v.sku.trim().is_empty() { return Err(VariantError::BlankSku); }
            if !seen.insert(v.sku.as_str()) { return Err(VariantError::DuplicateSku(v.sku.clone())); }
            v.check_prices()?;
        }
        let total = variants.len();
        self.variants = variants;
        self.touch();
        self.raise_event(ProductEvent::VariantsReplaced { product_id: self.id.clone(), total });
        Ok(())
    }

    pub fn add_variant(&mut self, variant: Variant) -> Result<(), VariantError> {
        if variant.sku.trim().is_empty() { return Err(VariantError::BlankSku); }
        if self.variant(&variant.sku).is_some() { return Err(VariantError::DuplicateSku(variant.sku)); }
        variant.check_prices()?;
        let sku = variant.sku.clone();
        self.variants.push(variant);
        self.touch();
        self.raise_event(ProductEvent::VariantAdded { product_id: self.id.clone(), sku });
        Ok(())
    }

    pub fn update_variant(&mut self, sku: &str, patch: VariantPatch) -> Result<&Variant, VariantError> {
        let idx = self.variants.iter().position(|v| v.sku == sku).ok_or_else(|| VariantError::NotFound(sku.to_string()))?;
        self.variants[idx].apply(patch)?;
        self.touch();
        self.raise_event(ProductEvent::VariantUpdated { product_id: self.id.clone(), sku: sku.to_string() });
        Ok(&self.variants[idx])
    }

    pub fn remove_variant(&mut self, sku: &str) -> Result<Variant, VariantError> {
        let idx = self.variants.iter().position(|v| v.sku == sku).ok_or_else(|| VariantError::NotFound(sku.to_string()))?;
        let removed = self.variants.remove(idx);
        self.touch();
        self.raise_event(ProductEvent::VariantRemoved { product_id: self.id.clone(), sku: sku.to_string() });
        Ok(removed)
    }

    /// Turns variant mode off: every variant is dropped.
    pub fn disable_variants(&mut self) -> usize {
        let removed = std::mem::take(&mut self.variants).len();
        self.touch();
        self.raise_event(ProductEvent::VariantsCleared { product_id: self.id.clone(), removed });
        removed
    }

    /// Variants as the product page sees them. A product without variants
    /// shows a single default variant built from its own price and stock.
    pub fn display_variants(&self) -> Vec<Variant> {
        if self.variants.is_empty() {
            vec![Variant::synthetic_default(self.sku.as_str(), self.price, self.original_price, self.stock)]
        } else {
            self.variants.clone()
        }
    }

    pub fn total_stock(&self) -> u32 {
        if self.variants.is_empty() { return self.stock; }
        self.variants.iter().filter(|v| v.is_active).fold(0u32, |acc, v| acc.saturating_add(v.stock))
    }

    /// Product-page state for `picks`, resolved over [`Product::display_variants`].
    pub fn selection_view(&self, picks: Picks) -> SelectionView {
        let variants = self.display_variants();
        VariantMatcher::new(&variants).view(picks)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: ProductEvent) { self.events.push(DomainEvent::Product(e)); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::variants::{fixtures::variant, Dimension};
    use crate::domain::vocabulary::{STORAGE, TYPE};

    fn ipad() -> Product {
        Product::create(Sku::new("IPAD").unwrap(), "iPad Air M2", Decimal::new(1000, 0))
    }

    fn selection() -> AttributeSelection {
        AttributeSelection::from_pairs([(TYPE, vec!["nguyen-seal", "openbox"]), (STORAGE, vec!["128GB", "256GB"])])
    }

    #[test]
    fn test_product_create() {
        let mut p = ipad();
        assert_eq!(p.name(), "iPad Air M2");
        assert!(!p.has_variants());
        assert!(matches!(p.take_events().as_slice(), [DomainEvent::Product(ProductEvent::Created { .. })]));
        assert!(p.take_events().is_empty());
    }

    #[test]
    fn test_regenerate_preserves_edits() {
        let vocab = Vocabulary::storefront();
        let mut p = ipad();
        p.regenerate_variants(&selection(), &vocab, None, None).unwrap();
        assert_eq!(p.variants().len(), 4);
        p.update_variant("IPAD-OPENBO-256GB", VariantPatch { stock: Some(50), ..Default::default() }).unwrap();
        p.take_events();

        p.regenerate_variants(&selection(), &vocab, None, None).unwrap();
        assert_eq!(p.variant("IPAD-OPENBO-256GB").unwrap().stock, 50);
        assert!(matches!(
            p.take_events().as_slice(),
            [DomainEvent::Product(ProductEvent::VariantsRegenerated { total: 4, preserved: 4, .. })]
        ));
    }

    #[test]
    fn test_regenerate_rejects_empty_selection_and_keeps_list() {
        let vocab = Vocabulary::storefront();
        let mut p = ipad();
        p.regenerate_variants(&selection(), &vocab, None, None).unwrap();
        let empty = AttributeSelection::from_pairs([(TYPE, Vec::<&str>::new())]);
        assert_eq!(p.regenerate_variants(&empty, &vocab, None, None).unwrap_err(), VariantError::EmptySelection);
        assert_eq!(p.variants().len(), 4);
    }

    #[test]
    fn test_preview_uses_overrides_without_mutating() {
        let vocab = Vocabulary::storefront();
        let p = ipad();
        let base = Sku::new("IPADAIR").unwrap();
        let preview = p.preview_variants(&selection(), &vocab, Some(&base), Some(Decimal::new(2000, 0))).unwrap();
        assert_eq!(preview[0].sku, "IPADAIR-NGUYEN-128GB");
        assert_eq!(preview[0].price, Decimal::new(2000, 0));
        assert!(!p.has_variants());
    }

    #[test]
    fn test_variant_lifecycle() {
        let mut p = ipad();
        p.add_variant(variant("A", Some("cpo"), None, &[])).unwrap();
        assert_eq!(p.add_variant(variant("A", None, None, &[])), Err(VariantError::DuplicateSku("A".into())));
        assert_eq!(p.add_variant(variant(" ", None, None, &[])), Err(VariantError::BlankSku));
        p.add_variant(variant("B", Some("openbox"), None, &[])).unwrap();
        assert_eq!(p.remove_variant("A").unwrap().sku, "A");
        assert_eq!(p.remove_variant("A"), Err(VariantError::NotFound("A".into())));
        assert!(p.update_variant("Z", VariantPatch::default()).is_err());
        assert_eq!(p.disable_variants(), 1);
        assert!(!p.has_variants());
    }

    #[test]
    fn test_replace_rejects_duplicate_skus() {
        let mut p = ipad();
        let dup = vec![variant("A", None, None, &[]), variant("A", None, None, &[])];
        assert_eq!(p.replace_variants(dup), Err(VariantError::DuplicateSku("A".into())));
        p.replace_variants(vec![variant("A", None, None, &[]), variant("B", None, None, &[])]).unwrap();
        assert_eq!(p.variants().len(), 2);
    }

    #[test]
    fn test_negative_variant_prices_are_rejected() {
        let mut p = ipad();
        p.add_variant(variant("A", None, None, &[])).unwrap();
        p.take_events();
        let patch = VariantPatch { price: Some(Decimal::new(-500, 0)), cost_price: Some(Decimal::new(-1, 0)), ..Default::default() };
        assert!(matches!(p.update_variant("A", patch), Err(VariantError::NegativePrice { .. })));
        assert_eq!(p.variant("A").unwrap().price, Decimal::new(1000, 0));
        assert!(p.take_events().is_empty());

        let mut negative = variant("B", None, None, &[]);
        negative.original_price = Decimal::new(-1, 0);
        assert_eq!(
            p.add_variant(negative.clone()),
            Err(VariantError::NegativePrice { sku: "B".into(), field: "original_price" })
        );
        assert!(matches!(p.replace_variants(vec![variant("C", None, None, &[]), negative]), Err(VariantError::NegativePrice { .. })));
        assert_eq!(p.variants().len(), 1);
    }

    #[test]
    fn test_total_stock_saturates() {
        let mut p = ipad();
        let mut a = variant("A", None, None, &[]);
        a.stock = u32::MAX;
        let mut b = variant("B", None, None, &[]);
        b.stock = 10;
        p.replace_variants(vec![a, b]).unwrap();
        assert_eq!(p.total_stock(), u32::MAX);
    }

    #[test]
    fn test_zero_variant_product_shows_default() {
        let mut p = ipad();
        p.update_details(ProductDetails { stock: Some(7), original_price: Some(Decimal::new(1200, 0)), ..Default::default() });
        let display = p.display_variants();
        assert_eq!(display.len(), 1);
        assert_eq!(display[0].name, "Mặc định");
        assert_eq!(display[0].price, Decimal::new(1000, 0));
        assert_eq!(display[0].stock, 7);
        assert!(!p.has_variants());

        let view = p.selection_view(Picks::default());
        assert_eq!(view.picks, Picks::default());
        assert!(view.exact_match);
        assert!(view.options.is_empty());
        assert_eq!(view.variant.unwrap().name, "Mặc định");
    }

    #[test]
    fn test_resolve_initializes_picks() {
        let vocab = Vocabulary::storefront();
        let mut p = ipad();
        p.regenerate_variants(&selection(), &vocab, None, None).unwrap();
        let view = p.selection_view(Picks::default().with(Dimension::Storage, "256GB"));
        assert_eq!(view.picks.get(Dimension::Type), Some("nguyen-seal"));
        assert!(view.exact_match);
        assert_eq!(view.variant.unwrap().sku, "IPAD-NGUYEN-256GB");
        assert_eq!(p.total_stock(), 0);
    }
}
