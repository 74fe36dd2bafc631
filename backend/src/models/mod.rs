//! Domain models for the Ezme catalog.
//!
//! - [`Product`] - Normalized storefront product
//! - [`ProductVariant`] - Purchasable SKU of a product
//! - [`Category`] / [`Subcategory`] - Fixed catalog taxonomy
//! - [`DietaryFlags`] - Boolean dietary attributes
//! - [`KeywordRule`] - SEO auto-link rule
//! - [`MetaTags`] - Generated SEO title and description

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Taxonomy
// =============================================================================

/// Top-level product category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    /// Hazelnut butters and creams.
    #[serde(rename = "findik-ezmesi")]
    FindikEzmesi,
    /// Peanut butters. Also the fallback category.
    #[serde(rename = "fistik-ezmesi")]
    FistikEzmesi,
    /// Raw and roasted nuts.
    #[serde(rename = "kuruyemis")]
    Kuruyemis,
}

impl Category {
    /// Slug used in URLs and serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FindikEzmesi => "findik-ezmesi",
            Self::FistikEzmesi => "fistik-ezmesi",
            Self::Kuruyemis => "kuruyemis",
        }
    }

    /// Turkish display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FindikEzmesi => "Fındık Ezmesi",
            Self::FistikEzmesi => "Fıstık Ezmesi",
            Self::Kuruyemis => "Kuruyemiş",
        }
    }
}

/// Product subcategory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Subcategory {
    Sekersiz,
    Hurmali,
    Balli,
    Klasik,
    Sutlu,
    Kakaolu,
    Cig,
    Kavrulmus,
}

impl Subcategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sekersiz => "sekersiz",
            Self::Hurmali => "hurmali",
            Self::Balli => "balli",
            Self::Klasik => "klasik",
            Self::Sutlu => "sutlu",
            Self::Kakaolu => "kakaolu",
            Self::Cig => "cig",
            Self::Kavrulmus => "kavrulmus",
        }
    }
}

// =============================================================================
// Dietary flags
// =============================================================================

/// Dietary attributes parsed from a free-text preferences string.
///
/// Flags are independent; any combination is possible.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DietaryFlags {
    pub vegan: bool,
    pub gluten_free: bool,
    pub sugar_free: bool,
    pub high_protein: bool,
}

// =============================================================================
// Product
// =============================================================================

/// A purchasable variant. Imported products carry exactly one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: String,
    /// Weight in grams.
    pub weight: f64,
    pub price: f64,
    pub stock: u32,
    pub sku: String,
}

/// A normalized storefront product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub slug: String,
    pub name: String,
    /// Plain-text description (HTML stripped).
    pub description: String,
    pub short_description: String,
    pub category: Category,
    pub subcategory: Subcategory,
    pub variants: Vec<ProductVariant>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub vegan: bool,
    pub gluten_free: bool,
    pub sugar_free: bool,
    pub high_protein: bool,
    pub rating: f64,
    pub review_count: u32,
    pub featured: bool,
    pub new: bool,
}

impl Product {
    /// Dietary flags of this product.
    pub fn dietary(&self) -> DietaryFlags {
        DietaryFlags {
            vegan: self.vegan,
            gluten_free: self.gluten_free,
            sugar_free: self.sugar_free,
            high_protein: self.high_protein,
        }
    }

    /// The first (default) variant.
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }
}

// =============================================================================
// SEO
// =============================================================================

/// Keyword to URL rule driving auto-linking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordRule {
    #[serde(default)]
    pub id: String,
    pub keyword: String,
    pub url: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl KeywordRule {
    /// Create an active rule with a fresh id.
    pub fn new(keyword: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            keyword: keyword.into(),
            url: url.into(),
            active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Generated SEO meta tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetaTags {
    pub title: String,
    pub description: String,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        assert_eq!(serde_json::to_string(&Category::FindikEzmesi).unwrap(), "\"findik-ezmesi\"");
        assert_eq!(serde_json::to_string(&Category::Kuruyemis).unwrap(), "\"kuruyemis\"");
        let parsed: Category = serde_json::from_str("\"fistik-ezmesi\"").unwrap();
        assert_eq!(parsed, Category::FistikEzmesi);
    }

    #[test]
    fn test_subcategory_matches_as_str() {
        for sub in [
            Subcategory::Sekersiz,
            Subcategory::Hurmali,
            Subcategory::Balli,
            Subcategory::Klasik,
            Subcategory::Sutlu,
            Subcategory::Kakaolu,
            Subcategory::Cig,
            Subcategory::Kavrulmus,
        ] {
            let json = serde_json::to_string(&sub).unwrap();
            assert_eq!(json, format!("\"{}\"", sub.as_str()));
        }
    }

    #[test]
    fn test_keyword_rule_defaults() {
        let rule: KeywordRule =
            serde_json::from_str(r#"{"keyword": "Badem", "url": "/kuruyemis"}"#).unwrap();
        assert!(rule.active);
        assert!(rule.id.is_empty());

        let rule = KeywordRule::new("Badem", "/kuruyemis");
        assert!(rule.active);
        assert!(!rule.id.is_empty());
        assert!(!rule.inactive().active);
    }
}
