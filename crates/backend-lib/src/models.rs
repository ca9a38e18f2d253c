//! Core data models for the CarbonWise backend

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured attributes describing the product whose footprint is estimated.
///
/// The mobile client sends `product_name` plus a free-form set of optional
/// attributes (`category`, `weight`, `material_type`, `energy_consumption`,
/// `usage_frequency`, `lifespan`, `disposal_plan`, `packaging_material`,
/// `manufacturing_region`, `additional_info`, ...). Unknown keys are kept;
/// the ordered map keeps prompt construction deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    /// All other attributes, keyed by name. Null and empty values are
    /// accepted on the wire but excluded from prompt construction.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Option<String>>,
}

impl ProductDescriptor {
    /// Create a descriptor with only a product name
    pub fn named(product_name: impl Into<String>) -> Self {
        Self {
            product_name: Some(product_name.into()),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute, builder-style
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), Some(value.into()));
        self
    }

    /// The product name, if present and non-empty after trimming
    pub fn trimmed_product_name(&self) -> Option<&str> {
        self.product_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Attributes that carry a value. Null and empty-string attributes
    /// never reach the prompt.
    pub fn populated_attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (key.as_str(), v))
        })
    }
}

/// Aggregated carbon-footprint estimate for one request.
///
/// Computed once per incoming request and never persisted here; storing the
/// result is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootprintEstimate {
    /// Rounded arithmetic mean of the parsed samples, in kg CO2e
    pub footprint_kg: i64,
    /// Every successfully parsed sample, in sampling order
    pub values: Vec<f64>,
    /// The prompt sent to the text-generation service
    pub prompt: String,
}

impl FootprintEstimate {
    /// Presentation form of the estimate, e.g. `"12 kg CO2e"`
    pub fn footprint_label(&self) -> String {
        format!("{} kg CO2e", self.footprint_kg)
    }
}

/// Raw reduction-tips text returned by the text-generation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionTips {
    pub tips: String,
    pub prompt: String,
}

/// Object labels returned by the vision service for one image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedObjects {
    pub labels: Vec<String>,
}

impl DetectedObjects {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Comma-joined label list, e.g. `"Laptop, Table"`
    pub fn joined(&self) -> String {
        self.labels.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_deserializes_flat_attributes() {
        let descriptor: ProductDescriptor = serde_json::from_str(
            r#"{"product_name": "laptop", "weight": "2kg", "category": null, "lifespan": ""}"#,
        )
        .unwrap();

        assert_eq!(descriptor.product_name.as_deref(), Some("laptop"));
        assert_eq!(descriptor.attributes.len(), 3);

        let populated: Vec<_> = descriptor.populated_attributes().collect();
        assert_eq!(populated, vec![("weight", "2kg")]);
    }

    #[test]
    fn test_trimmed_product_name_rejects_whitespace() {
        let descriptor = ProductDescriptor {
            product_name: Some("   ".to_string()),
            attributes: BTreeMap::new(),
        };
        assert!(descriptor.trimmed_product_name().is_none());

        let descriptor = ProductDescriptor::named("  laptop  ");
        assert_eq!(descriptor.trimmed_product_name(), Some("laptop"));
    }

    #[test]
    fn test_footprint_label_format() {
        let estimate = FootprintEstimate {
            footprint_kg: 12,
            values: vec![12.0, 10.0, 14.0],
            prompt: String::new(),
        };
        assert_eq!(estimate.footprint_label(), "12 kg CO2e");
    }
}
