//! REST API request and response types.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ImportError, RepositoryError, ServerError};
use crate::models::{KeywordRule, MetaTags, Product};
use crate::transform::pipeline::{ImportOutcome, ImportReport};

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<Value>);

/// Response sent after a CSV import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Unique job identifier
    pub job_id: String,

    pub success: bool,

    /// Number of products written to the store
    pub count: usize,

    pub message: String,

    pub products: Vec<Product>,

    pub metadata: ResponseMetadata,
}

/// Metadata about the import
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub draft_count: usize,
    pub inactive_count: usize,
    pub csv_info: CsvMetadata,
    pub validation: ValidationStats,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

/// Validation statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStats {
    pub valid: usize,
    pub invalid: usize,
    pub errors: Vec<ValidationError>,
}

/// Schema errors of one product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub product_id: String,
    pub errors: Vec<String>,
}

impl ImportResponse {
    /// Build the response for a report whose products were stored.
    pub fn from_report(report: ImportReport) -> Self {
        let outcome = ImportOutcome::stored(report.products.len());

        Self {
            job_id: Uuid::new_v4().to_string(),
            success: outcome.success,
            count: outcome.count,
            message: outcome.message,
            metadata: ResponseMetadata {
                draft_count: report.draft_count,
                inactive_count: report.inactive_count,
                csv_info: CsvMetadata {
                    encoding: report.csv_info.encoding,
                    delimiter: report.csv_info.delimiter.to_string(),
                    row_count: report.csv_info.row_count,
                    columns: report.csv_info.headers,
                },
                validation: ValidationStats {
                    valid: report.valid_count,
                    invalid: report.invalid_count,
                    errors: report
                        .validation_errors
                        .into_iter()
                        .map(|(product_id, errors)| ValidationError { product_id, errors })
                        .collect(),
                },
            },
            products: report.products,
        }
    }
}

/// Body of `POST /api/seo/autolink`
#[derive(Debug, Clone, Deserialize)]
pub struct AutolinkRequest {
    pub content: String,
    /// Defaults to the built-in keyword table
    #[serde(default)]
    pub rules: Option<Vec<KeywordRule>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AutolinkResponse {
    pub content: String,
}

/// Body of `POST /api/seo/meta`: either an inline product or a stored id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaRequest {
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    #[serde(flatten)]
    pub meta: MetaTags,
    pub json_ld: Value,
}

/// Create an error response body
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "success": false,
        "error": error,
        "count": 0,
        "products": []
    })
}

/// Map a server error to a status code and JSON body.
pub fn api_error(err: ServerError) -> ApiError {
    let status = match &err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
        ServerError::Repository(RepositoryError::Duplicate(_)) => StatusCode::CONFLICT,
        ServerError::Import(ImportError::MissingHandleColumn) | ServerError::Import(ImportError::Csv(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(error_response(&err.to_string())))
}
