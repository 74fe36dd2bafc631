//! High-level import API: CSV text or bytes in, normalized products out.
//!
//! # Example
//!
//! ```rust,ignore
//! use ezme::{import_products_from_csv_file, MemoryStorage, ProductRepository};
//!
//! let mut repo = ProductRepository::new(MemoryStorage::default())?;
//! let outcome = import_products_from_csv_file(&std::fs::read_to_string("products.csv")?, &mut repo);
//! println!("{}", outcome.message);
//! ```
//!
//! Failures are reported through the returned outcome, never by panicking,
//! so callers can show the message directly.

use serde::{Deserialize, Serialize};

use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::error::{ImportError, ImportResult};
use crate::models::Product;
use crate::parser::{parse_bytes_auto, parse_string, tokenize, ParseResult};
use crate::storage::{KeyValueStorage, ProductRepository};
use crate::validation::validate_product;

use super::grouper::{drafts_to_products, group_rows, ColumnMap};

/// Options for the byte-level import
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Force a delimiter instead of detecting it
    pub delimiter: Option<char>,

    /// Skip schema validation of the produced products
    pub skip_validation: bool,
}

/// Result of [`import_products_from_csv_file`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportOutcome {
    pub success: bool,
    pub count: usize,
    pub message: String,
}

impl ImportOutcome {
    /// Outcome after `count` active products were stored; zero is a failure.
    pub fn stored(count: usize) -> Self {
        if count == 0 {
            Self {
                success: false,
                count: 0,
                message: "İçe aktarılacak aktif ürün bulunamadı".to_string(),
            }
        } else {
            Self {
                success: true,
                count,
                message: format!("{} ürün başarıyla içe aktarıldı", count),
            }
        }
    }
}

/// Result of [`parse_shopify_csv`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseOutcome {
    pub success: bool,
    pub products: Vec<Product>,
    pub message: String,
}

/// CSV file information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Detailed result of a byte-level import
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Active, normalized products
    pub products: Vec<Product>,

    /// Number of distinct handles assembled into drafts
    pub draft_count: usize,

    /// Drafts dropped because their status was not "active"
    pub inactive_count: usize,

    /// Number of products passing schema validation
    pub valid_count: usize,

    /// Number of products failing schema validation
    pub invalid_count: usize,

    /// Validation errors (product id, errors)
    pub validation_errors: Vec<(String, Vec<String>)>,

    /// CSV parsing metadata
    pub csv_info: CsvInfo,
}

/// Turn already tokenized rows into products.
///
/// The handle column is mandatory; everything else degrades to defaults.
pub fn products_from_rows(headers: &[String], rows: &[Vec<String>]) -> ImportResult<Vec<Product>> {
    let columns = ColumnMap::resolve(headers)?;
    Ok(drafts_to_products(group_rows(rows, &columns)))
}

/// Parse comma-separated Shopify export text into products.
pub fn parse_shopify_csv(content: &str) -> ParseOutcome {
    match parse_products(content) {
        Ok(products) => ParseOutcome {
            success: true,
            message: format!("{} ürün bulundu", products.len()),
            products,
        },
        Err(e) => ParseOutcome {
            success: false,
            products: Vec::new(),
            message: failure_message(&e),
        },
    }
}

fn parse_products(content: &str) -> ImportResult<Vec<Product>> {
    let rows = tokenize(content);
    let (headers, data) = rows.split_first().ok_or(ImportError::MissingHandleColumn)?;
    products_from_rows(headers, data)
}

/// Import comma-separated export text and persist the products.
///
/// Products are upserted by id; two handles with the same slug overwrite
/// each other.
pub fn import_products_from_csv_file<S: KeyValueStorage>(
    content: &str,
    repository: &mut ProductRepository<S>,
) -> ImportOutcome {
    let result = parse_products(content).and_then(|products| {
        if !products.is_empty() {
            repository.upsert_all(products.iter().cloned())?;
        }
        Ok(products.len())
    });

    match result {
        Ok(count) => {
            if count == 0 {
                log_warning("No active products in CSV");
            } else {
                log_success(format!("Imported {} products", count));
            }
            ImportOutcome::stored(count)
        }
        Err(e) => {
            log_error(format!("Import failed: {}", e));
            ImportOutcome {
                success: false,
                count: 0,
                message: failure_message(&e),
            }
        }
    }
}

fn failure_message(error: &ImportError) -> String {
    match error {
        ImportError::MissingHandleColumn => error.to_string(),
        other => format!("CSV parse hatası: {}", other),
    }
}

/// Import raw uploaded bytes with encoding and delimiter detection.
pub fn import_csv_bytes(bytes: &[u8], options: &ImportOptions) -> ImportResult<ImportReport> {
    let parse_result = match options.delimiter {
        Some(delimiter) => {
            let encoding = crate::parser::detect_encoding(bytes);
            let content = crate::parser::decode_content(bytes, &encoding)?;
            parse_string(&content, delimiter, encoding)?
        }
        None => parse_bytes_auto(bytes)?,
    };
    import_parsed(parse_result, options)
}

fn import_parsed(parse_result: ParseResult, options: &ImportOptions) -> ImportResult<ImportReport> {
    log_info("📖 Reading product CSV...");
    log_success(format!("Detected encoding: {}", parse_result.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parse_result.delimiter)));
    log_success(format!("Read {} rows", parse_result.rows.len()));

    let csv_info = CsvInfo {
        encoding: parse_result.encoding.clone(),
        delimiter: parse_result.delimiter,
        headers: parse_result.headers.clone(),
        row_count: parse_result.rows.len(),
    };

    let columns = ColumnMap::resolve(&parse_result.headers).map_err(|e| {
        log_error(e.to_string());
        e
    })?;

    log_info("📦 Grouping rows by handle...");
    let drafts = group_rows(&parse_result.rows, &columns);
    let draft_count = drafts.len();
    log_success(format!("{} product drafts", draft_count));

    let products = drafts_to_products(drafts);
    let inactive_count = draft_count - products.len();
    if inactive_count > 0 {
        log_warning(format!("{} drafts skipped (status is not active)", inactive_count));
    }

    let (valid_count, invalid_count, validation_errors) = if options.skip_validation {
        log_info("(validation skipped)");
        (products.len(), 0, Vec::new())
    } else {
        log_info("✔️  Validating products...");
        let result = validate_products(&products);
        if result.1 == 0 {
            log_success(format!("All {} products valid!", result.0));
        } else {
            log_error(format!("Invalid: {}", result.1));
        }
        result
    };

    Ok(ImportReport {
        products,
        draft_count,
        inactive_count,
        valid_count,
        invalid_count,
        validation_errors,
        csv_info,
    })
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        _ => "?",
    }
}

/// Validate products and return statistics
fn validate_products(products: &[Product]) -> (usize, usize, Vec<(String, Vec<String>)>) {
    let mut valid = 0;
    let mut invalid = 0;
    let mut errors = Vec::new();

    for product in products {
        match validate_product(product) {
            Ok(()) => valid += 1,
            Err(errs) => {
                invalid += 1;
                if errors.len() < 10 {
                    errors.push((product.id.clone(), errs));
                }
            }
        }
    }

    (valid, invalid, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::storage::MemoryStorage;

    const SAMPLE: &str = "Handle,Title,Body (HTML),Variant SKU,Variant Grams,Variant Price,Image Src,Status,dietary-preferences
sekersiz-fistik-ezmesi,Şekersiz Fıstık Ezmesi,\"<p>Sadece fıstık, başka hiçbir şey.</p>\",FE-01,340,149.90,https://cdn/fe1.jpg,active,\"vegan, gluten-free, no-artificial-sweeteners\"
sekersiz-fistik-ezmesi,,,,,,https://cdn/fe2.jpg,,
findik-ezmesi-kakaolu,Kakaolu Fındık Ezmesi,<p>Kakaolu</p>,,,179.5,,active,
taslak-urun,Taslak Ürün,,,,,,draft,
";

    #[test]
    fn test_parse_shopify_csv() {
        let outcome = parse_shopify_csv(SAMPLE);
        assert!(outcome.success);
        assert_eq!(outcome.products.len(), 2);

        let first = &outcome.products[0];
        assert_eq!(first.id, "sekersiz-fistik-ezmesi");
        assert_eq!(first.images, vec!["https://cdn/fe1.jpg", "https://cdn/fe2.jpg"]);
        assert_eq!(first.description, "Sadece fıstık, başka hiçbir şey.");
        assert!(first.sugar_free && first.vegan && first.gluten_free);
        assert_eq!(first.variants[0].weight, 340.0);

        let second = &outcome.products[1];
        assert_eq!(second.category, Category::FindikEzmesi);
        assert_eq!(second.variants[0].sku, "SKU-findik-ezmesi-kakaolu");
        assert_eq!(second.variants[0].weight, 450.0);
    }

    #[test]
    fn test_missing_handle_column() {
        let outcome = parse_shopify_csv("Title,Price\nÜrün,10\n");
        assert!(!outcome.success);
        assert!(outcome.products.is_empty());
        assert!(outcome.message.contains("Handle"));
    }

    #[test]
    fn test_empty_content() {
        let outcome = parse_shopify_csv("");
        assert!(!outcome.success);
        assert!(outcome.products.is_empty());
    }

    #[test]
    fn test_import_persists_products() {
        let mut repo = ProductRepository::new(MemoryStorage::default()).unwrap();
        let outcome = import_products_from_csv_file(SAMPLE, &mut repo);

        assert!(outcome.success);
        assert_eq!(outcome.count, 2);
        assert!(outcome.message.contains('2'));
        assert!(repo.get("findik-ezmesi-kakaolu").is_some());
        assert!(repo.get("taslak-urun").is_none());
    }

    #[test]
    fn test_import_without_handle_reports_failure() {
        let mut repo = ProductRepository::new(MemoryStorage::default()).unwrap();
        let outcome = import_products_from_csv_file("Title\nx\n", &mut repo);
        assert!(!outcome.success);
        assert_eq!(outcome.count, 0);
        assert!(repo.list().is_empty());
    }

    #[test]
    fn test_import_only_drafts_reports_failure() {
        let mut repo = ProductRepository::new(MemoryStorage::default()).unwrap();
        let outcome = import_products_from_csv_file("Handle,Title,Status\nh,T,draft\n", &mut repo);
        assert!(!outcome.success);
        assert_eq!(outcome.count, 0);
    }

    #[test]
    fn test_import_bytes_report() {
        let report = import_csv_bytes(SAMPLE.as_bytes(), &ImportOptions::default()).unwrap();
        assert_eq!(report.draft_count, 3);
        assert_eq!(report.inactive_count, 1);
        assert_eq!(report.products.len(), 2);
        assert_eq!(report.valid_count, 2);
        assert_eq!(report.invalid_count, 0);
        assert_eq!(report.csv_info.delimiter, ',');
        assert_eq!(report.csv_info.row_count, 4);
    }

    #[test]
    fn test_import_bytes_semicolon() {
        let csv = "Handle;Title;Variant Price\ncig-badem;Çiğ Badem;89,90\n";
        let report = import_csv_bytes(csv.as_bytes(), &ImportOptions::default()).unwrap();
        assert_eq!(report.csv_info.delimiter, ';');
        assert_eq!(report.products[0].category, Category::Kuruyemis);
        // comma decimal is not a number
        assert_eq!(report.products[0].variants[0].price, 0.0);
    }

    #[test]
    fn test_import_bytes_missing_handle() {
        let result = import_csv_bytes(b"Title\nx\n", &ImportOptions::default());
        assert!(matches!(result, Err(ImportError::MissingHandleColumn)));
    }
}
