//! JSON Schema validation for normalized products.
//!
//! Products are serialized with `serde_json` and checked against the
//! Draft 7 schema embedded at compile time from `schemas/product.json`.
//! Validation reports problems, it never rejects an import by itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use ezme::{parse_shopify_csv, validate_product};
//!
//! for product in parse_shopify_csv(csv).products {
//!     if let Err(errors) = validate_product(&product) {
//!         eprintln!("{}: {:?}", product.id, errors);
//!     }
//! }
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::models::Product;

static PRODUCT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/product.json")).expect("Invalid embedded schema")
});

/// Validate a JSON value against a Draft 7 schema.
///
/// # Returns
/// * `Ok(())` when the value conforms
/// * `Err(Vec<String>)` with one message per violation
///
/// # Example
/// ```ignore
/// use serde_json::json;
/// use ezme::validation::validate;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": { "name": { "type": "string" } }
/// });
///
/// assert!(validate(&schema, &json!({ "name": "Badem" })).is_ok());
/// assert!(validate(&schema, &json!({ "price": 42 })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Boolean form of [`validate`].
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a raw JSON value against the product schema.
pub fn validate_product_value(data: &Value) -> Result<(), Vec<String>> {
    validate(&PRODUCT_SCHEMA, data)
}

/// Validate a product against the product schema.
pub fn validate_product(product: &Product) -> Result<(), Vec<String>> {
    let data = serde_json::to_value(product).map_err(|e| vec![e.to_string()])?;
    validate_product_value(&data)
}

/// Quick check against the product schema.
pub fn is_valid_product(product: &Product) -> bool {
    serde_json::to_value(product)
        .map(|data| is_valid(&PRODUCT_SCHEMA, &data))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::parse_shopify_csv;
    use serde_json::json;

    fn product() -> Product {
        parse_shopify_csv("Handle,Title,Variant Price\nballi-findik-ezmesi,Ballı Fındık Ezmesi,99\n")
            .products
            .remove(0)
    }

    #[test]
    fn test_imported_product_is_valid() {
        let product = product();
        assert!(is_valid_product(&product));
        assert!(validate_product(&product).is_ok());
    }

    #[test]
    fn test_too_many_images() {
        let mut product = product();
        product.images = (0..6).map(|i| format!("/img/{}.jpg", i)).collect();
        let errors = validate_product(&product).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_no_variants() {
        let mut product = product();
        product.variants.clear();
        assert!(!is_valid_product(&product));
    }

    #[test]
    fn test_unknown_category_value() {
        let mut data = serde_json::to_value(product()).unwrap();
        data["category"] = json!("cikolata");
        let errors = validate_product_value(&data).unwrap_err();
        assert!(!errors.is_empty());
        println!("Errors: {:?}", errors);
    }

    #[test]
    fn test_missing_fields() {
        let result = validate_product_value(&json!({ "id": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_generic_validate() {
        let schema = json!({ "type": "object", "required": ["name"] });
        assert!(validate(&schema, &json!({ "name": "x" })).is_ok());
        assert!(!is_valid(&schema, &json!({})));
    }
}
