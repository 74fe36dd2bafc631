//! Group flat export rows into product drafts, then finalize drafts.
//!
//! Spreadsheet exports repeat a product across several rows (one per image
//! or variant). The first row of a handle is authoritative for metadata;
//! later rows only extend the image gallery.
//!
//! ```text
//! CSV Input (flat rows)               →  Drafts
//! ┌──────────────────────────────┐      ┌──────────────────────────────┐
//! │ cig-badem, Çiğ Badem, a.jpg  │      │ cig-badem                    │
//! │ cig-badem,          , b.jpg  │  →   │ images: [a.jpg, b.jpg]       │
//! │ ballı-ezme, Ballı Ezme, c.jpg│      ├──────────────────────────────┤
//! └──────────────────────────────┘      │ ballı-ezme  images: [c.jpg]  │
//!                                       └──────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::error::ImportError;
use crate::models::{Category, Product, ProductVariant};
use crate::parser::{cell, find_column};

use super::classify::{
    determine_category, determine_subcategory, generate_slug, generate_tags,
    parse_dietary_preferences, strip_html, truncate_with_ellipsis,
};

/// Maximum number of images kept per product.
pub const MAX_IMAGES: usize = 5;
/// Weight used when the grams column is missing, zero or unparsable.
pub const DEFAULT_WEIGHT_GRAMS: f64 = 450.0;
/// Stock assigned to every imported variant.
pub const DEFAULT_STOCK: u32 = 50;
/// Image used when a product has none.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.jpg";
/// Length of the short description before the ellipsis.
pub const SHORT_DESCRIPTION_LENGTH: usize = 200;

// =============================================================================
// Column resolution
// =============================================================================

/// Resolved column indexes for the fields the importer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub handle: usize,
    pub title: Option<usize>,
    pub body: Option<usize>,
    pub sku: Option<usize>,
    pub grams: Option<usize>,
    pub price: Option<usize>,
    pub image: Option<usize>,
    pub status: Option<usize>,
    pub dietary: Option<usize>,
}

impl ColumnMap {
    /// Resolve every field by fuzzy header lookup.
    ///
    /// Fails only when the handle column is missing.
    pub fn resolve(headers: &[String]) -> Result<Self, ImportError> {
        let handle = find_column(headers, &["handle"]).ok_or(ImportError::MissingHandleColumn)?;

        Ok(Self {
            handle,
            title: find_column(headers, &["title"]),
            body: find_column(headers, &["body (html)", "body"]),
            sku: find_column(headers, &["variant sku", "sku"]),
            grams: find_column(headers, &["variant grams", "grams"]),
            price: find_column(headers, &["variant price", "price"]),
            image: find_column(headers, &["image src", "image"]),
            status: find_column(headers, &["status"]),
            dietary: find_column(headers, &["dietary-preferences", "dietary"]),
        })
    }
}

// =============================================================================
// Drafts
// =============================================================================

/// Intermediate record accumulated for one handle.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub handle: String,
    pub title: String,
    pub body_html: String,
    pub sku: String,
    pub grams: f64,
    pub price: f64,
    pub dietary: String,
    pub status: String,
    pub images: Vec<String>,
}

impl ProductDraft {
    fn from_row(handle: &str, title: &str, row: &[String], columns: &ColumnMap) -> Self {
        let sku = match cell(row, columns.sku) {
            "" => format!("SKU-{}", handle),
            sku => sku.to_string(),
        };
        let status = match cell(row, columns.status) {
            "" => "active".to_string(),
            status => status.to_string(),
        };

        let mut draft = Self {
            handle: handle.to_string(),
            title: title.to_string(),
            body_html: cell(row, columns.body).to_string(),
            sku,
            grams: parse_number(cell(row, columns.grams))
                .filter(|g| *g != 0.0)
                .unwrap_or(DEFAULT_WEIGHT_GRAMS),
            price: parse_number(cell(row, columns.price)).unwrap_or(0.0),
            dietary: cell(row, columns.dietary).to_string(),
            status,
            images: Vec::new(),
        };
        draft.add_image(cell(row, columns.image));
        draft
    }

    /// Append an image URL unless blank, already present, or the gallery is full.
    pub fn add_image(&mut self, url: &str) {
        if !url.is_empty() && self.images.len() < MAX_IMAGES && !self.images.iter().any(|i| i == url) {
            self.images.push(url.to_string());
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("active")
    }

    /// Derive the final product; inactive drafts yield `None`.
    pub fn into_product(self) -> Option<Product> {
        if !self.is_active() {
            return None;
        }

        let slug = generate_slug(&self.handle);
        let description = strip_html(&self.body_html);
        let short_description = truncate_with_ellipsis(&description, SHORT_DESCRIPTION_LENGTH);
        let category = determine_category(&self.handle, &self.title);
        let subcategory = determine_subcategory(&self.handle, &self.title);
        let flags = parse_dietary_preferences(&self.dietary);
        let tags = generate_tags(&self.title, &self.dietary, category);

        let images = if self.images.is_empty() {
            vec![PLACEHOLDER_IMAGE.to_string()]
        } else {
            self.images
        };

        let variant = ProductVariant {
            id: format!("{}-{}g", slug, self.grams),
            weight: self.grams,
            price: self.price,
            stock: DEFAULT_STOCK,
            sku: self.sku,
        };

        Some(Product {
            id: slug.clone(),
            slug,
            name: self.title,
            description,
            short_description,
            category,
            subcategory,
            variants: vec![variant],
            images,
            tags,
            vegan: flags.vegan,
            gluten_free: flags.gluten_free,
            sugar_free: flags.sugar_free,
            high_protein: flags.high_protein,
            rating: 5.0,
            review_count: 0,
            featured: category != Category::Kuruyemis,
            new: false,
        })
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Group data rows (header excluded) into drafts in first-seen handle order.
pub fn group_rows(rows: &[Vec<String>], columns: &ColumnMap) -> Vec<ProductDraft> {
    let mut drafts: Vec<ProductDraft> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let handle = cell(row, Some(columns.handle));
        if handle.is_empty() {
            continue;
        }

        if let Some(&i) = index.get(handle) {
            drafts[i].add_image(cell(row, columns.image));
            continue;
        }

        let title = cell(row, columns.title);
        if title.is_empty() {
            continue;
        }

        index.insert(handle.to_string(), drafts.len());
        drafts.push(ProductDraft::from_row(handle, title, row, columns));
    }

    drafts
}

/// Finalize drafts, keeping only active products.
pub fn drafts_to_products(drafts: Vec<ProductDraft>) -> Vec<Product> {
    drafts.into_iter().filter_map(ProductDraft::into_product).collect()
}
