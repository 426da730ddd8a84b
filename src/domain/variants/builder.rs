//! Turns a generated combination into a full variant record.

use rust_decimal::Decimal;

use super::generator::Combination;
use super::{Variant, VariantAttributes, DEFAULT_LOW_STOCK_THRESHOLD};
use crate::domain::value_objects::Sku;
use crate::domain::vocabulary::{Vocabulary, NAME_ORDER};

pub const FALLBACK_VARIANT_NAME: &str = "Variant";

pub struct VariantBuilder<'a> {
    vocabulary: &'a Vocabulary,
    base_sku: &'a Sku,
    base_price: Decimal,
}

impl<'a> VariantBuilder<'a> {
    pub fn new(vocabulary: &'a Vocabulary, base_sku: &'a Sku, base_price: Decimal) -> Self {
        Self { vocabulary, base_sku, base_price: base_price.max(Decimal::ZERO) }
    }

    /// SKU tokens follow selection order.
    pub fn sku(&self, combination: &Combination) -> String {
        self.base_sku.derive(combination.iter().map(|(_, value)| value))
    }

    /// Display values in the canonical name order; attributes outside that
    /// order are left out.
    pub fn name(&self, combination: &Combination) -> String {
        let parts: Vec<&str> = NAME_ORDER
            .iter()
            .filter_map(|attr| combination.get(attr).map(|value| self.vocabulary.display_value(attr, value)))
            .collect();
        if parts.is_empty() { FALLBACK_VARIANT_NAME.to_string() } else { parts.join(" - ") }
    }

    pub fn build(&self, combination: &Combination, featured: bool) -> Variant {
        let mut variant = Variant {
            sku: self.sku(combination),
            name: self.name(combination),
            variant_type: None,
            model: None,
            attributes: VariantAttributes::default(),
            price: self.base_price,
            original_price: Decimal::ZERO,
            cost_price: Decimal::ZERO,
            stock: 0,
            reserved: 0,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            image: None,
            images: vec![],
            is_active: true,
            is_featured: featured,
        };
        for (attr, value) in combination.iter() {
            variant.set_value(attr, value);
        }
        variant
    }
}
