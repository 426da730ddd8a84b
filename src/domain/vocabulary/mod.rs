//! Attribute vocabulary: the recognized variant attributes, their allowed
//! values and display labels.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub const TYPE: &str = "type";
pub const MODEL: &str = "model";
pub const STORAGE: &str = "storage";
pub const MEMORY: &str = "memory";
pub const COLOR: &str = "color";
pub const SIZE: &str = "size";
pub const CHIP: &str = "chip";

/// Order in which attribute values are composed into a variant name.
/// Independent of selection order.
pub const NAME_ORDER: [&str; 7] = [TYPE, MODEL, STORAGE, MEMORY, COLOR, SIZE, CHIP];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    pub label: String,
    /// Empty means custom values are accepted.
    #[serde(default)]
    pub allowed_values: Vec<String>,
    /// Parallel to `allowed_values` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_labels: Option<Vec<String>>,
}

impl AttributeDefinition {
    pub fn new(name: &str, label: &str, allowed: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            allowed_values: allowed.iter().map(|v| v.to_string()).collect(),
            display_labels: None,
        }
    }

    pub fn with_display_labels(mut self, labels: &[&str]) -> Self {
        self.display_labels = Some(labels.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn is_free_form(&self) -> bool { self.allowed_values.is_empty() }

    pub fn allows(&self, value: &str) -> bool {
        self.is_free_form() || self.allowed_values.iter().any(|v| v == value)
    }

    /// Display string for `value`, or the raw value when it has no label.
    pub fn display_value<'a>(&'a self, value: &'a str) -> &'a str {
        let Some(labels) = &self.display_labels else { return value };
        self.allowed_values
            .iter()
            .position(|v| v == value)
            .and_then(|idx| labels.get(idx))
            .map(String::as_str)
            .unwrap_or(value)
    }
}

/// Read-only attribute configuration.
#[derive(Clone, Debug, Serialize)]
pub struct Vocabulary {
    attributes: Vec<AttributeDefinition>,
}

impl Vocabulary {
    pub fn new(attributes: Vec<AttributeDefinition>) -> Result<Self, VocabularyError> {
        let mut seen = HashSet::new();
        for attr in &attributes {
            if attr.name.trim().is_empty() {
                return Err(VocabularyError::BlankName);
            }
            if !seen.insert(attr.name.as_str()) {
                return Err(VocabularyError::DuplicateAttribute(attr.name.clone()));
            }
            if let Some(labels) = &attr.display_labels {
                if labels.len() != attr.allowed_values.len() {
                    return Err(VocabularyError::LabelMismatch {
                        attribute: attr.name.clone(),
                        values: attr.allowed_values.len(),
                        labels: labels.len(),
                    });
                }
            }
        }
        Ok(Self { attributes })
    }

    /// Default vocabulary of the electronics storefront.
    pub fn storefront() -> Self {
        Self {
            attributes: vec![
                AttributeDefinition::new(TYPE, "Tình trạng", &["nguyen-seal", "openbox", "cpo", "like-new", "used"])
                    .with_display_labels(&["Nguyên Seal", "Openbox", "CPO", "Like New", "Đã qua sử dụng"]),
                AttributeDefinition::new(MODEL, "Phiên bản", &["wifi", "cellular"])
                    .with_display_labels(&["Wifi", "Wifi + Cellular"]),
                AttributeDefinition::new(STORAGE, "Dung lượng", &["64GB", "128GB", "256GB", "512GB", "1TB", "2TB"]),
                AttributeDefinition::new(MEMORY, "RAM", &["8GB", "16GB", "24GB", "32GB", "36GB", "48GB", "64GB"]),
                AttributeDefinition::new(COLOR, "Màu sắc", &[]),
                AttributeDefinition::new(SIZE, "Kích thước", &["11 inch", "13 inch", "14 inch", "15 inch", "16 inch"]),
                AttributeDefinition::new(CHIP, "Chip", &["M1", "M2", "M3", "M4", "A17 Pro", "A18 Pro"]),
            ],
        }
    }

    pub fn attributes(&self) -> &[AttributeDefinition] { &self.attributes }

    pub fn get(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool { self.get(name).is_some() }

    /// Human label for an attribute, falling back to its name.
    pub fn label<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).map(|a| a.label.as_str()).unwrap_or(name)
    }

    pub fn display_value<'a>(&'a self, name: &str, value: &'a str) -> &'a str {
        match self.get(name) {
            Some(attr) => attr.display_value(value),
            None => value,
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self { Self::storefront() }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    #[error("attribute name is blank")]
    BlankName,
    #[error("attribute {0} is defined twice")]
    DuplicateAttribute(String),
    #[error("attribute {attribute} has {values} values but {labels} display labels")]
    LabelMismatch { attribute: String, values: usize, labels: usize },
}
