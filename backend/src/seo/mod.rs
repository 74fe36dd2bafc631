//! SEO tooling.
//!
//! - [`autolink`] - Keyword to anchor rewriting over HTML fragments
//! - [`meta`] - Meta title/description and structured data for products

pub mod autolink;
pub mod meta;

pub use autolink::{auto_link_content, auto_link_content_with_class, default_keyword_rules, AUTO_LINK_CLASS};
pub use meta::{generate_meta_tags, generate_meta_tags_with_brand, product_json_ld, DEFAULT_BRAND};
