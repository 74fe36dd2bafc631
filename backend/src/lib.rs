//! # Ezme - product CSV import and SEO auto-linking
//!
//! Ezme turns Shopify-style product exports into the normalized catalog of a
//! nut-butter storefront, and rewrites editorial HTML with keyword links and
//! meta tags.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│  Products   │
//! │ (UTF8/1254) │     │  (auto-enc) │     │ (group+tag) │     │ (repository)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                                    │
//!                                         ┌─────────────┐            │
//!                                         │     SEO     │◀───────────┘
//!                                         │ (links+meta)│
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ezme::{import_products_from_csv_file, MemoryStorage, ProductRepository};
//!
//! let mut repo = ProductRepository::new(MemoryStorage::default())?;
//! let outcome = import_products_from_csv_file(&csv_text, &mut repo);
//! println!("{}", outcome.message);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (Product, ProductVariant, KeywordRule)
//! - [`parser`] - CSV tokenizer with encoding and delimiter detection
//! - [`transform`] - Classification, grouping, import pipeline, export
//! - [`seo`] - Auto-linking and meta tags
//! - [`storage`] - Key-value storage and product repository
//! - [`validation`] - Product schema validation
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// SEO
pub mod seo;

// Persistence
pub mod storage;

// Validation
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, ImportError, RepositoryError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Category, DietaryFlags, KeywordRule, MetaTags, Product, ProductVariant, Subcategory};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    find_column,
    parse_bytes_auto,
    parse_csv_file_auto,
    tokenize,
    tokenize_with_delimiter,
    ParseResult,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    determine_category,
    determine_subcategory,
    export_products_csv,
    generate_slug,
    generate_tags,
    parse_dietary_preferences,
    strip_html,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    import_csv_bytes,
    import_products_from_csv_file,
    parse_shopify_csv,
    CsvInfo,
    ImportOptions,
    ImportOutcome,
    ImportReport,
    ParseOutcome,
};

// =============================================================================
// Re-exports - SEO
// =============================================================================

pub use seo::{auto_link_content, default_keyword_rules, generate_meta_tags, product_json_ld};

// =============================================================================
// Re-exports - Storage
// =============================================================================

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, ProductRepository};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_product, validate_product};

// =============================================================================
// Re-exports - Config / API
// =============================================================================

pub use config::Config;
pub use api::types::{error_response, ImportResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
