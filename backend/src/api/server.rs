//! HTTP server for the import and SEO API.
//!
//! # API Endpoints
//!
//! | Method | Path                  | Description                       |
//! |--------|-----------------------|-----------------------------------|
//! | GET    | `/health`             | Health check                      |
//! | POST   | `/api/import`         | Upload CSV, import products       |
//! | GET    | `/api/products`       | List stored products              |
//! | GET    | `/api/products/{id}`  | One stored product                |
//! | DELETE | `/api/products/{id}`  | Remove a stored product           |
//! | POST   | `/api/seo/autolink`   | Auto-link keywords in HTML        |
//! | POST   | `/api/seo/meta`       | Meta tags and JSON-LD for product |
//! | GET    | `/api/logs`           | SSE stream for real-time logs     |

use axum::{
    extract::{Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, LOG_BROADCASTER};
use super::types::{
    api_error, ApiError, AutolinkRequest, AutolinkResponse, ImportResponse, MetaRequest, MetaResponse,
};
use crate::config::Config;
use crate::error::{RepositoryError, ServerError};
use crate::models::Product;
use crate::seo::{auto_link_content, default_keyword_rules, generate_meta_tags_with_brand, product_json_ld};
use crate::storage::{FileStorage, ProductRepository};
use crate::transform::pipeline::{import_csv_bytes, ImportOptions};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<Mutex<ProductRepository<FileStorage>>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repository: ProductRepository<FileStorage>, config: Config) -> Self {
        Self {
            repository: Arc::new(Mutex::new(repository)),
            config: Arc::new(config),
        }
    }

    fn repository(&self) -> Result<MutexGuard<'_, ProductRepository<FileStorage>>, ApiError> {
        self.repository
            .lock()
            .map_err(|_| api_error(ServerError::Internal("repository lock poisoned".into())))
    }
}

/// Build the router with all routes and CORS.
pub fn router(state: AppState) -> Router {
    // permissive CORS for the storefront dev server
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/import", post(import_csv))
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product).delete(delete_product))
        .route("/api/seo/autolink", post(autolink))
        .route("/api/seo/meta", post(meta))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let repository = ProductRepository::new(FileStorage::new(&config.store_dir))?;
    let port = config.port;

    println!("🚀 Ezme server running on http://localhost:{}", port);
    println!("   Store: {} ({} products)", config.store_dir.display(), repository.len());
    println!("   POST /api/import       - Upload product CSV");
    println!("   GET  /api/products     - List products");
    println!("   POST /api/seo/autolink - Auto-link HTML");
    println!("   POST /api/seo/meta     - Meta tags");
    println!("   GET  /api/logs         - SSE log stream");
    println!("   GET  /health           - Health check");
    println!();

    let app = router(AppState::new(repository, config));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "ezme",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "import": "POST /api/import",
            "products": "GET /api/products",
            "autolink": "POST /api/seo/autolink",
            "meta": "POST /api/seo/meta",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // lagged receivers skip the missed entries
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// CSV upload: multipart field `file`
async fn import_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(ServerError::BadRequest(format!("Multipart error: {}", e))))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| api_error(ServerError::BadRequest(format!("Read error: {}", e))))?;
            file_data = Some(bytes.to_vec());
        }
    }

    let bytes = file_data.ok_or_else(|| api_error(ServerError::BadRequest("No file provided".into())))?;

    log_info(format!(
        "📄 New upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    let report = import_csv_bytes(&bytes, &ImportOptions::default()).map_err(|e| api_error(e.into()))?;

    if !report.products.is_empty() {
        state
            .repository()?
            .upsert_all(report.products.iter().cloned())
            .map_err(|e| api_error(e.into()))?;
    }

    Ok(Json(ImportResponse::from_report(report)))
}

async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.repository()?.list().to_vec();
    Ok(Json(products))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state.repository()?.get(&id).cloned();
    product
        .map(Json)
        .ok_or_else(|| api_error(RepositoryError::NotFound(id).into()))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .repository()?
        .delete(&id)
        .map_err(|e| api_error(e.into()))?;
    log_info(format!("🗑️  Deleted product {}", id));
    Ok(StatusCode::NO_CONTENT)
}

async fn autolink(Json(request): Json<AutolinkRequest>) -> Json<AutolinkResponse> {
    let rules = request.rules.unwrap_or_else(default_keyword_rules);
    Json(AutolinkResponse {
        content: auto_link_content(&request.content, &rules),
    })
}

async fn meta(
    State(state): State<AppState>,
    Json(request): Json<MetaRequest>,
) -> Result<Json<MetaResponse>, ApiError> {
    let product = match (request.product, request.product_id) {
        (Some(product), _) => product,
        (None, Some(id)) => state
            .repository()?
            .get(&id)
            .cloned()
            .ok_or_else(|| api_error(RepositoryError::NotFound(id).into()))?,
        (None, None) => {
            return Err(api_error(ServerError::BadRequest(
                "Either 'product' or 'productId' is required".into(),
            )))
        }
    };

    let brand = request.brand.unwrap_or_else(|| state.config.brand.clone());
    Ok(Json(MetaResponse {
        meta: generate_meta_tags_with_brand(&product, &brand),
        json_ld: product_json_ld(&product, &state.config.base_url, &brand),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn state(dir: &std::path::Path) -> AppState {
        let mut repository = ProductRepository::new(FileStorage::new(dir)).unwrap();
        let products = crate::transform::parse_shopify_csv(
            "Handle,Title,Dietary\nsekersiz-fistik-ezmesi,Şekersiz Fıstık Ezmesi,vegan\ncig-badem,Çiğ Badem,\n",
        )
        .products;
        repository.upsert_all(products).unwrap();
        AppState::new(repository, Config::default())
    }

    #[tokio::test]
    async fn test_product_routes() {
        let dir = tempdir().unwrap();
        let state = state(dir.path());

        let Json(list) = list_products(State(state.clone())).await.unwrap();
        assert_eq!(list.len(), 2);

        let Json(product) = get_product(State(state.clone()), Path("cig-badem".into())).await.unwrap();
        assert_eq!(product.name, "Çiğ Badem");

        let status = delete_product(State(state.clone()), Path("cig-badem".into())).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = get_product(State(state), Path("cig-badem".into())).await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_autolink_defaults_to_builtin_rules() {
        let request = AutolinkRequest {
            content: "<p>Vegan tarifler</p>".into(),
            rules: None,
        };
        let Json(response) = autolink(Json(request)).await;
        assert!(response.content.contains(r#"<a href="/blog/vegan-beslenme""#));
    }

    #[tokio::test]
    async fn test_meta_by_id_and_missing_body() {
        let dir = tempdir().unwrap();
        let state = state(dir.path());

        let request = MetaRequest {
            product: None,
            product_id: Some("sekersiz-fistik-ezmesi".into()),
            brand: Some("Marka".into()),
        };
        let Json(response) = meta(State(state.clone()), Json(request)).await.unwrap();
        assert_eq!(response.meta.title, "Şekersiz Fıstık Ezmesi - Vegan | Marka");
        assert_eq!(response.json_ld["brand"]["name"], "Marka");

        let empty = MetaRequest {
            product: None,
            product_id: None,
            brand: None,
        };
        let (status, _) = meta(State(state), Json(empty)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }
}
