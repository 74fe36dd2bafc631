//! Meta tags and structured data for product pages.

use serde_json::{json, Value};

use crate::models::{MetaTags, Product};
use crate::transform::classify::{truncate_chars, truncate_with_ellipsis};

/// Brand appended to every meta title.
///
/// Placeholder name; deployments set the real one through `EZME_BRAND`.
pub const DEFAULT_BRAND: &str = "Ezme Dükkanı";

/// Hard limit for meta descriptions, ellipsis included.
pub const META_DESCRIPTION_LIMIT: usize = 160;

/// Characters of the long description used when there is no short one.
const DESCRIPTION_SOURCE_LIMIT: usize = 150;

const SUGAR_FREE_PITCH: &str = " Rafine şeker ilavesiz, %100 doğal.";
const NATURAL_PITCH: &str = " %100 doğal ve katkısız.";
const SHIPPING_PITCH: &str = " Hızlı kargo ile kapınızda.";

/// Meta tags using [`DEFAULT_BRAND`].
pub fn generate_meta_tags(product: &Product) -> MetaTags {
    generate_meta_tags_with_brand(product, DEFAULT_BRAND)
}

/// Build the SEO title and description of a product.
///
/// The title carries at most two dietary suffixes; "Glutensiz" is dropped
/// when "Şekersiz" is already present. The description never exceeds
/// [`META_DESCRIPTION_LIMIT`] characters.
pub fn generate_meta_tags_with_brand(product: &Product, brand: &str) -> MetaTags {
    let mut suffixes: Vec<&str> = Vec::new();
    if product.sugar_free {
        suffixes.push("Şekersiz");
    }
    if product.vegan {
        suffixes.push("Vegan");
    }
    if product.gluten_free && !suffixes.contains(&"Şekersiz") {
        suffixes.push("Glutensiz");
    }
    suffixes.truncate(2);

    let title = if suffixes.is_empty() {
        format!("{} | {}", product.name, brand)
    } else {
        format!("{} - {} | {}", product.name, suffixes.join(" & "), brand)
    };

    let mut description = if product.short_description.is_empty() {
        truncate_chars(&product.description, DESCRIPTION_SOURCE_LIMIT)
    } else {
        product.short_description.clone()
    };
    description.push_str(if product.sugar_free { SUGAR_FREE_PITCH } else { NATURAL_PITCH });
    description.push_str(SHIPPING_PITCH);

    if description.chars().count() > META_DESCRIPTION_LIMIT {
        description = truncate_with_ellipsis(&description, META_DESCRIPTION_LIMIT - 3);
    }

    MetaTags { title, description }
}

/// schema.org `Product` JSON-LD for a product page.
pub fn product_json_ld(product: &Product, base_url: &str, brand: &str) -> Value {
    let base = base_url.trim_end_matches('/');
    let absolute = |path: &str| {
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            path.to_string()
        }
    };

    let variant = product.default_variant();
    let images: Vec<String> = product.images.iter().map(|i| absolute(i.as_str())).collect();
    let availability = if variant.is_some_and(|v| v.stock > 0) {
        "https://schema.org/InStock"
    } else {
        "https://schema.org/OutOfStock"
    };

    let mut ld = json!({
        "@context": "https://schema.org",
        "@type": "Product",
        "name": product.name,
        "description": product.short_description,
        "image": images,
        "sku": variant.map(|v| v.sku.clone()),
        "category": product.category.display_name(),
        "brand": { "@type": "Brand", "name": brand },
        "offers": {
            "@type": "Offer",
            "url": format!("{}/urun/{}", base, product.slug),
            "priceCurrency": "TRY",
            "price": variant.map(|v| v.price).unwrap_or(0.0),
            "availability": availability,
        },
    });

    if product.review_count > 0 {
        ld["aggregateRating"] = json!({
            "@type": "AggregateRating",
            "ratingValue": product.rating,
            "reviewCount": product.review_count,
        });
    }

    ld
}
