//! Cartesian-product variant generation with merge against existing variants.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

use super::builder::VariantBuilder;
use super::selection::AttributeSelection;
use super::{Variant, VariantError};
use crate::domain::value_objects::Sku;
use crate::domain::vocabulary::Vocabulary;

/// One attribute-value tuple, in selection order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Combination(Vec<(String, String)>);

impl Combination {
    pub fn push(&mut self, attribute: &str, value: &str) {
        self.0.push((attribute.to_string(), value.to_string()));
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.0.iter().find(|(a, _)| a == attribute).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(a, v)| (a.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Whether `variant` carries exactly this tuple's value for every
    /// attribute in `attributes`. Attributes the tuple skipped must be absent
    /// on the variant too.
    pub fn matches<'s>(&self, variant: &Variant, mut attributes: impl Iterator<Item = &'s str>) -> bool {
        attributes.all(|attr| variant.value(attr) == self.get(attr))
    }
}

/// Upper bound on the variants one generation may produce.
pub const MAX_COMBINATIONS: usize = 1000;

/// Expands the selection one attribute at a time, first attribute major.
/// Attributes without values add no dimension.
pub fn combinations(selection: &AttributeSelection) -> Result<Vec<Combination>, VariantError> {
    match selection.combination_count() {
        Some(0) => return Err(VariantError::EmptySelection),
        Some(n) if n <= MAX_COMBINATIONS => {}
        _ => return Err(VariantError::TooManyCombinations { max: MAX_COMBINATIONS }),
    }
    let mut acc = vec![Combination::default()];
    for (attribute, values) in selection.dimensions() {
        acc = acc
            .into_iter()
            .flat_map(|partial| {
                values.iter().map(move |value| {
                    let mut next = partial.clone();
                    next.push(attribute, value);
                    next
                })
            })
            .collect();
    }
    Ok(acc)
}

pub struct GenerateRequest<'a> {
    pub selection: &'a AttributeSelection,
    pub existing: &'a [Variant],
    pub base_price: Decimal,
    pub base_sku: &'a Sku,
}

/// Produces the full variant list for `req.selection`. Existing variants whose
/// tuple is regenerated are returned unchanged; the rest are built fresh.
/// Pure: the caller persists the result as a full replacement.
pub fn generate_variants(req: &GenerateRequest<'_>, vocabulary: &Vocabulary) -> Result<Vec<Variant>, VariantError> {
    let combos = combinations(req.selection)?;
    let builder = VariantBuilder::new(vocabulary, req.base_sku, req.base_price);

    let preserved: Vec<Option<&Variant>> = combos
        .iter()
        .map(|combo| req.existing.iter().find(|v| combo.matches(v, req.selection.attributes())))
        .collect();

    // SKUs already claimed by preserved records; new ones must not collide.
    let mut taken: HashSet<String> = preserved.iter().flatten().map(|v| v.sku.clone()).collect();

    let mut kept = 0usize;
    let variants: Vec<Variant> = combos
        .iter()
        .zip(preserved)
        .enumerate()
        .map(|(idx, (combo, existing))| match existing {
            Some(v) => {
                kept += 1;
                v.clone()
            }
            None => {
                let mut v = builder.build(combo, idx == 0);
                v.sku = unique_sku(v.sku, &mut taken);
                v
            }
        })
        .collect();

    tracing::debug!(total = variants.len(), preserved = kept, base_sku = %req.base_sku, "generated variants");
    Ok(variants)
}

/// Truncated tokens can collide ("Midnight Blue" / "Midnight Green"); suffix
/// `-2`, `-3`, ... until free.
fn unique_sku(candidate: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(candidate.clone()) {
        return candidate;
    }
    let mut n = 2;
    loop {
        let next = format!("{candidate}-{n}");
        if taken.insert(next.clone()) {
            return next;
        }
        n += 1;
    }
}
