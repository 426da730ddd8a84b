//! Admin-side selection of attributes and candidate values for generation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordered attributes with their chosen values. Every attribute carries its
/// value list, so dropping an attribute drops its values with it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSelection {
    entries: Vec<(String, Vec<String>)>,
}

impl AttributeSelection {
    pub fn new() -> Self { Self::default() }

    /// Builds a selection from `(attribute, values)` pairs in order. Blank and
    /// duplicate entries are skipped.
    pub fn from_pairs<A, V, I>(pairs: impl IntoIterator<Item = (A, I)>) -> Self
    where
        A: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        let mut selection = Self::new();
        for (attribute, values) in pairs {
            let attribute = attribute.into();
            selection.select_attribute(&attribute);
            for value in values {
                let _ = selection.add_value(&attribute, value);
            }
        }
        selection
    }

    /// Adds `attribute` at the end of the order. No-op if already selected.
    pub fn select_attribute(&mut self, attribute: &str) -> bool {
        let attribute = attribute.trim();
        if attribute.is_empty() || self.is_selected(attribute) { return false; }
        self.entries.push((attribute.to_string(), vec![]));
        true
    }

    pub fn deselect_attribute(&mut self, attribute: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(name, _)| name != attribute);
        self.entries.len() != before
    }

    /// Returns whether the attribute is selected afterwards.
    pub fn toggle_attribute(&mut self, attribute: &str) -> bool {
        if self.deselect_attribute(attribute) { false } else { self.select_attribute(attribute) }
    }

    pub fn add_value(&mut self, attribute: &str, value: impl Into<String>) -> Result<bool, SelectionError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(SelectionError::BlankValue); }
        let values = self.values_mut(attribute).ok_or_else(|| SelectionError::NotSelected(attribute.to_string()))?;
        if values.contains(&value) { return Ok(false); }
        values.push(value);
        Ok(true)
    }

    pub fn remove_value(&mut self, attribute: &str, value: &str) -> bool {
        let Some(values) = self.values_mut(attribute) else { return false };
        let before = values.len();
        values.retain(|v| v != value);
        values.len() != before
    }

    pub fn is_selected(&self, attribute: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == attribute)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self, attribute: &str) -> &[String] {
        self.entries.iter().find(|(name, _)| name == attribute).map(|(_, v)| v.as_slice()).unwrap_or(&[])
    }

    /// Attributes with at least one value, in selection order.
    pub fn dimensions(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().filter(|(_, v)| !v.is_empty()).map(|(name, v)| (name.as_str(), v.as_slice()))
    }

    /// Number of variants generation would produce; 0 for a degenerate
    /// selection, `None` if the count overflows.
    pub fn combination_count(&self) -> Option<usize> {
        let mut dims = self.dimensions().peekable();
        if dims.peek().is_none() { return Some(0); }
        dims.try_fold(1usize, |acc, (_, v)| acc.checked_mul(v.len()))
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    fn values_mut(&mut self, attribute: &str) -> Option<&mut Vec<String>> {
        self.entries.iter_mut().find(|(name, _)| name == attribute).map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("attribute {0} is not selected")]
    NotSelected(String),
    #[error("attribute value is blank")]
    BlankValue,
}
