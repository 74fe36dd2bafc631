//! Transformation module.
//!
//! This module handles CSV rows to catalog products:
//! - Classify: category, subcategory, tags, slug and text helpers
//! - Grouper: Flat rows to product drafts, drafts to products
//! - Pipeline: Main import entry points
//! - Export: Products back to CSV

pub mod classify;
pub mod export;
pub mod grouper;
pub mod pipeline;

pub use classify::*;
pub use export::export_products_csv;
pub use grouper::{drafts_to_products, group_rows, ColumnMap, ProductDraft};
pub use pipeline::*;
