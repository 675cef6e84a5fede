//! HTTP applications for File Export
//!
//! Two processes, two routers. Each gets `/health`, CORS and request tracing.
//!
//! ## Endpoint Map
//!
//! | App   | Path                        | Description                      |
//! |-------|-----------------------------|----------------------------------|
//! | both  | `/health`                   | Liveness probe                   |
//! | tools | `/create_excel` ...         | One POST per tool                |
//! | tools | `/mcp`                      | JSON-RPC tool transport          |
//! | files | `/files/:folder/:filename`  | Forced download                  |
//! | files | `/files/*`                  | Static fallback                  |

use crate::files::files_router;
use crate::tools::{tools_router, ExportService, ToolsState};
use axum::{
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the tool API application
pub fn build_tools_app(service: Arc<ExportService>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(tools_router(ToolsState { service }))
        .layer(build_cors(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Build the file server application over `root`
pub fn build_files_app(root: PathBuf, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(files_router(root))
        .layer(build_cors(cors_origins))
        .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let resp = health_check().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_tools_then_files_round_trip() {
        let root = tempfile::tempdir().unwrap();
        let mut config = ExportConfig::default();
        config.export.dir = root.path().to_path_buf();
        config.export.base_url = "http://files.test/files".to_string();
        config.retention.persistent = true;

        let tools = build_tools_app(Arc::new(ExportService::new(&config)), &[]);
        let resp = tools
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/create_file")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({"content": "hello", "filename": "greet.txt"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let url = body_json(resp).await["url"].as_str().unwrap().to_string();
        let path = url.strip_prefix("http://files.test").unwrap().to_string();

        let files = build_files_app(root.path().to_path_buf(), &[]);
        let resp = files
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_files_app_health() {
        let root = tempfile::tempdir().unwrap();
        let resp = build_files_app(root.path().to_path_buf(), &[])
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn test_build_cors_with_origins() {
        let _cors = build_cors(&[
            "http://localhost:3000".to_string(),
            "https://chat.example.com".to_string(),
        ]);
    }
}
