//! Write products back to a Shopify-style CSV export.
//!
//! One row per image: the first row carries the product fields, the
//! following rows only the handle and image, which is the layout the
//! importer groups on.

use crate::error::{CsvError, CsvResult};
use crate::models::Product;

/// Header row of the export.
pub const EXPORT_HEADERS: [&str; 9] = [
    "Handle",
    "Title",
    "Body (HTML)",
    "Variant SKU",
    "Variant Grams",
    "Variant Price",
    "Image Src",
    "Status",
    "dietary-preferences",
];

/// Dietary flags back to the keywords the importer understands.
fn dietary_text(product: &Product) -> String {
    let mut parts = Vec::new();
    if product.vegan {
        parts.push("vegan");
    }
    if product.gluten_free {
        parts.push("gluten-free");
    }
    if product.sugar_free {
        parts.push("no-artificial-sweeteners");
    }
    if product.high_protein {
        parts.push("high-protein");
    }
    parts.join(", ")
}

/// Serialize products as comma-separated text.
pub fn export_products_csv(products: &[Product]) -> CsvResult<String> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    let write_err = |e: csv::Error| CsvError::WriteError(e.to_string());

    writer.write_record(EXPORT_HEADERS).map_err(write_err)?;

    for product in products {
        let variant = product.default_variant();
        let grams = variant.map(|v| v.weight.to_string()).unwrap_or_default();
        let price = variant.map(|v| v.price.to_string()).unwrap_or_default();
        let sku = variant.map(|v| v.sku.as_str()).unwrap_or_default();
        let first_image = product.images.first().map(String::as_str).unwrap_or_default();
        let dietary = dietary_text(product);

        writer
            .write_record([
                product.id.as_str(),
                product.name.as_str(),
                product.description.as_str(),
                sku,
                grams.as_str(),
                price.as_str(),
                first_image,
                "active",
                dietary.as_str(),
            ])
            .map_err(write_err)?;

        for image in product.images.iter().skip(1) {
            writer
                .write_record([product.id.as_str(), "", "", "", "", "", image.as_str()])
                .map_err(write_err)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::WriteError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::WriteError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::pipeline::parse_shopify_csv;

    const SAMPLE: &str = "Handle,Title,Body (HTML),Variant SKU,Variant Grams,Variant Price,Image Src,Status,dietary-preferences
hurmali-fistik-ezmesi,\"Hurmalı Fıstık Ezmesi, 300g\",<p>Hurma ile tatlandırıldı</p>,HF-300,300,159.9,a.jpg,active,\"vegan, high-protein\"
hurmali-fistik-ezmesi,,,,,,b.jpg,,
cig-ceviz,Çiğ Ceviz,,,,,,active,
";

    #[test]
    fn test_exported_catalog_reimports() {
        let products = parse_shopify_csv(SAMPLE).products;
        let csv = export_products_csv(&products).unwrap();
        let reimported = parse_shopify_csv(&csv).products;

        assert_eq!(reimported.len(), products.len());
        for (a, b) in products.iter().zip(&reimported) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.name, b.name);
            assert_eq!(a.images, b.images);
            assert_eq!(a.variants, b.variants);
            assert_eq!(a.dietary(), b.dietary());
            assert_eq!(a.category, b.category);
        }
    }

    #[test]
    fn test_header_row() {
        let csv = export_products_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), EXPORT_HEADERS.join(","));
    }
}
