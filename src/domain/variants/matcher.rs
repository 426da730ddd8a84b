//! Storefront-side variant resolution.
//!
//! The product page exposes four pick dimensions (type, model, storage,
//! color). A [`VariantMatcher`] is built once per product view from the
//! variant list and answers, for a set of [`Picks`]:
//!
//! - which variant to show ([`VariantMatcher::resolve`]): the first active
//!   variant agreeing with every pick, otherwise the first active variant,
//!   otherwise nothing;
//! - which values of a dimension are still reachable
//!   ([`VariantMatcher::available_options`]) so dead-end choices can be
//!   disabled.
//!
//! A dimension for which no variant carries a value never constrains either
//! computation, and an unset pick matches anything.

use serde::{Deserialize, Serialize};

use super::Variant;
use crate::domain::vocabulary::{COLOR, MODEL, STORAGE, TYPE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Type,
    Model,
    Storage,
    Color,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [Dimension::Type, Dimension::Model, Dimension::Storage, Dimension::Color];

    pub fn attribute(self) -> &'static str {
        match self {
            Dimension::Type => TYPE,
            Dimension::Model => MODEL,
            Dimension::Storage => STORAGE,
            Dimension::Color => COLOR,
        }
    }

    fn index(self) -> usize {
        match self {
            Dimension::Type => 0,
            Dimension::Model => 1,
            Dimension::Storage => 2,
            Dimension::Color => 3,
        }
    }
}

/// The shopper's current selection. `None` means not picked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picks {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub variant_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Picks {
    pub fn get(&self, dim: Dimension) -> Option<&str> {
        let pick = match dim {
            Dimension::Type => &self.variant_type,
            Dimension::Model => &self.model,
            Dimension::Storage => &self.storage,
            Dimension::Color => &self.color,
        };
        pick.as_deref().filter(|p| !p.is_empty())
    }

    pub fn set(&mut self, dim: Dimension, value: Option<String>) {
        let slot = match dim {
            Dimension::Type => &mut self.variant_type,
            Dimension::Model => &mut self.model,
            Dimension::Storage => &mut self.storage,
            Dimension::Color => &mut self.color,
        };
        *slot = value;
    }

    pub fn with(mut self, dim: Dimension, value: impl Into<String>) -> Self {
        self.set(dim, Some(value.into()));
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution<'a> {
    pub variant: Option<&'a Variant>,
    /// False when `variant` is the first-active fallback rather than a match
    /// for the picks.
    pub exact_match: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub value: String,
    pub available: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DimensionOptions {
    pub dimension: Dimension,
    pub values: Vec<Availability>,
}

/// Everything the product page needs after a pick change.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectionView {
    pub picks: Picks,
    pub variant: Option<Variant>,
    pub exact_match: bool,
    /// Only dimensions that have values.
    pub options: Vec<DimensionOptions>,
}

pub struct VariantMatcher<'a> {
    variants: &'a [Variant],
    options: [Vec<&'a str>; 4],
}

impl<'a> VariantMatcher<'a> {
    pub fn new(variants: &'a [Variant]) -> Self {
        let mut options: [Vec<&'a str>; 4] = Default::default();
        for dim in Dimension::ALL {
            let seen = &mut options[dim.index()];
            for value in variants.iter().filter_map(|v| v.value(dim.attribute())) {
                if !seen.contains(&value) {
                    seen.push(value);
                }
            }
        }
        Self { variants, options }
    }

    pub fn variants(&self) -> &'a [Variant] { self.variants }

    /// Distinct values of `dim` in variant-list order.
    pub fn options(&self, dim: Dimension) -> &[&'a str] { &self.options[dim.index()] }

    fn constrains(&self, dim: Dimension) -> bool { !self.options(dim).is_empty() }

    /// Fills every unset pick of a dimension that has values with that
    /// dimension's first value. Existing picks are left alone.
    pub fn initialize_picks(&self, picks: &mut Picks) {
        for dim in Dimension::ALL {
            if picks.get(dim).is_some() { continue; }
            if let Some(first) = self.options(dim).first() {
                picks.set(dim, Some((*first).to_string()));
            }
        }
    }

    fn agrees(&self, variant: &Variant, dim: Dimension, picks: &Picks) -> bool {
        match picks.get(dim) {
            None => true,
            Some(_) if !self.constrains(dim) => true,
            Some(pick) => variant.value(dim.attribute()) == Some(pick),
        }
    }

    pub fn matches(&self, variant: &Variant, picks: &Picks) -> bool {
        variant.is_active && Dimension::ALL.iter().all(|dim| self.agrees(variant, *dim, picks))
    }

    pub fn resolve(&self, picks: &Picks) -> Resolution<'a> {
        if let Some(found) = self.variants.iter().find(|v| self.matches(v, picks)) {
            return Resolution { variant: Some(found), exact_match: true };
        }
        // No combination matches: show the first purchasable variant anyway.
        let fallback = self.variants.iter().find(|v| v.is_active);
        if fallback.is_none() {
            tracing::debug!(variants = self.variants.len(), "no active variant to resolve");
        }
        Resolution { variant: fallback, exact_match: false }
    }

    /// Whether picking `value` on `dim`, keeping every other pick, reaches an
    /// active variant.
    pub fn is_available(&self, dim: Dimension, value: &str, picks: &Picks) -> bool {
        self.variants.iter().any(|v| {
            v.is_active
                && v.value(dim.attribute()) == Some(value)
                && Dimension::ALL.iter().filter(|d| **d != dim).all(|other| self.agrees(v, *other, picks))
        })
    }

    pub fn available_options(&self, dim: Dimension, picks: &Picks) -> Vec<Availability> {
        self.options(dim)
            .iter()
            .map(|value| Availability { value: (*value).to_string(), available: self.is_available(dim, value, picks) })
            .collect()
    }

    /// Initializes unset picks, resolves, and computes availability for every
    /// dimension that has values.
    pub fn view(&self, mut picks: Picks) -> SelectionView {
        self.initialize_picks(&mut picks);
        let resolution = self.resolve(&picks);
        let options = Dimension::ALL
            .into_iter()
            .filter(|dim| self.constrains(*dim))
            .map(|dim| DimensionOptions { dimension: dim, values: self.available_options(dim, &picks) })
            .collect();
        SelectionView {
            variant: resolution.variant.cloned(),
            exact_match: resolution.exact_match,
            options,
            picks,
        }
    }
}
