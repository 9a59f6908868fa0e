//! HTTP API server for the ledger converter
//!
//! Routes are organized into modules:
//! - routes::health: root and health endpoints
//! - routes::workbook: upload and save
//! - routes::template: sample workbook download

pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use bukukas_config::{Config, CorsConfig};
use bukukas_core::Converter;

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub converter: Arc<Converter>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let converter = Arc::new(Converter::with_defaults(config.clone()));
        Self { config, converter }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::health::{health_check, root};
    use routes::template::api_template;
    use routes::workbook::{api_save, api_upload};

    let cors = cors_layer(&state.config.cors);
    let body_limit = DefaultBodyLimit::max(state.config.upload.max_bytes);

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/api/template", get(api_template))
        .route("/api/upload", post(api_upload))
        .route("/api/save", post(api_save))
        .with_state(state)
        .layer(body_limit)
        .layer(cors)
}

/// CORS policy from configuration; a lone `*` allows any origin
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(config.max_age_secs));

    if config.allowed_origins.iter().any(|o| o.trim() == "*") {
        return layer.allow_origin(Any);
    }

    let patterns = config.allowed_origins.clone();
    layer.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        origin
            .to_str()
            .map(|origin| patterns.iter().any(|p| origin_matches(p, origin)))
            .unwrap_or(false)
    }))
}

/// Match an origin against a pattern with at most one `*`.
///
/// `https://*.vercel.app` matches `https://app.vercel.app`; patterns without
/// a wildcard must match exactly.
pub fn origin_matches(pattern: &str, origin: &str) -> bool {
    let pattern = pattern.trim().trim_end_matches('/');
    match pattern.split_once('*') {
        None => pattern == origin,
        Some((prefix, suffix)) => {
            origin.len() >= prefix.len() + suffix.len() && origin.starts_with(prefix) && origin.ends_with(suffix)
        }
    }
}

/// Start the HTTP server and run until Ctrl-C
pub async fn start_server(config: Config) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config);
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!(target: "bukukas::api", "Starting bukukas server on http://{}", addr);
    log::info!(target: "bukukas::api", "Routes: / /api/health /api/template /api/upload /api/save");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!(target: "bukukas::api", "Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!(target: "bukukas::api", "Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use bukukas_core::{Account, AccountsPayload, Transaction};
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    const BOUNDARY: &str = "bukukas-test-boundary";

    fn app() -> Router {
        create_router(AppState::new(Config::default()))
    }

    fn multipart_body(file_name: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(uri: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(file_name, bytes)))
            .unwrap()
    }

    fn save_request(body: String) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/save")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_origin_matches() {
        assert!(origin_matches("https://*.vercel.app", "https://ledger-ui.vercel.app"));
        assert!(!origin_matches("https://*.vercel.app", "https://vercel.app.evil.com"));
        assert!(origin_matches("http://localhost:3000", "http://localhost:3000"));
        assert!(origin_matches("http://localhost:3000/", "http://localhost:3000"));
        assert!(!origin_matches("http://localhost:3000", "http://localhost:3001"));
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");

        let response = app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "bukukas");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_template_download() {
        let response = app()
            .oneshot(Request::builder().uri("/api/template").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            routes::XLSX_MEDIA_TYPE
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.starts_with("attachment; filename=\"accounting_template_"));
        assert!(disposition.ends_with(".xlsx\""));
    }

    #[tokio::test]
    async fn test_save_then_upload() {
        let payload = AccountsPayload::from(vec![Account::new("Kas").with_transactions(vec![
            Transaction::new("2024-09-24", "Jasa").with_receipt("Jasa", Decimal::new(150, 0)),
        ])]);
        let response = app()
            .oneshot(save_request(serde_json::to_string(&payload).unwrap()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.contains("accounting_export_"));
        let workbook = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let response = app()
            .oneshot(upload_request("/api/upload", "kas.xlsx", &workbook))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let tx = &json["accounts"][0]["transactions"][0];
        assert_eq!(json["accounts"][0]["name"], "Kas");
        assert_eq!(tx["tanggal"], "2024-09-24");
        assert_eq!(tx["penerimaan"]["Jasa"].as_f64(), Some(150.0));
        assert_eq!(tx["saldo"].as_f64(), Some(150.0));
    }

    #[tokio::test]
    async fn test_upload_with_sheet_filter() {
        let workbook = AppState::new(Config::default()).converter.template().unwrap();
        let response = app()
            .oneshot(upload_request("/api/upload?sheets=Bank", "template.xlsx", &workbook))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["accounts"].as_array().unwrap().len(), 1);
        assert_eq!(json["accounts"][0]["name"], "Bank");
    }

    #[tokio::test]
    async fn test_upload_errors() {
        let response = app()
            .oneshot(upload_request("/api/upload", "notes.txt", b"hello"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let json = json_body(response).await;
        assert_eq!(json["code"], 415);
        assert!(json["message"].as_str().unwrap().contains("txt"));

        let response = app()
            .oneshot(upload_request("/api/upload", "broken.xlsx", b"not a workbook"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app()
            .oneshot(upload_request("/api/upload", "notes.csv", b"Nama,Alamat\nBudi,Jakarta\n"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_save_errors() {
        let response = app()
            .oneshot(save_request(r#"{"accounts": [{"name": "Kas"}, {"name": "kas"}]}"#.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app().oneshot(save_request("{not json".to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], 400);
    }

    #[tokio::test]
    async fn test_cors_exposes_content_disposition() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/template")
                    .header(header::ORIGIN, "https://ledger.vercel.app")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://ledger.vercel.app"
        );
        let exposed = response.headers()[header::ACCESS_CONTROL_EXPOSE_HEADERS]
            .to_str()
            .unwrap()
            .to_lowercase();
        assert!(exposed.contains("content-disposition"));
    }
}
