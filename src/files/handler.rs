//! HTTP handlers for the file server
//!
//! - GET /files/:folder/:filename: attachment download of a regular file
//! - GET /files/*: static fallback for nested paths

use crate::error::{Error, Result};
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::path::PathBuf;
use tokio_util::io::ReaderStream;
use tower_http::services::ServeDir;

/// Shared state for file handlers
#[derive(Clone)]
pub struct FilesState {
    pub root: PathBuf,
}

/// Create the file router serving `root` under `/files`
pub fn files_router(root: PathBuf) -> Router {
    let fallback = Router::new().nest_service("/files", ServeDir::new(&root));

    Router::new()
        .route("/files/:folder/:filename", get(download))
        .with_state(FilesState { root })
        .fallback_service(fallback)
}

/// GET /files/:folder/:filename
async fn download(
    State(state): State<FilesState>,
    Path((folder, filename)): Path<(String, String)>,
) -> Result<Response> {
    if !is_plain_segment(&folder) || !is_plain_segment(&filename) {
        return Err(not_found(&folder, &filename));
    }

    let path = state.root.join(&folder).join(&filename);
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(m) if m.is_file() => m,
        _ => return Err(not_found(&folder, &filename)),
    };

    let file = tokio::fs::File::open(&path).await?;
    tracing::debug!(folder = %folder, file = %filename, size = metadata.len(), "Serving download");

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        (header::CONTENT_LENGTH, metadata.len().to_string()),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// A single path component that cannot step outside its parent
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(&['/', '\\', '\0'][..])
}

fn content_disposition(filename: &str) -> String {
    let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
    format!("attachment; filename=\"{}\"", escaped)
}

fn not_found(folder: &str, filename: &str) -> Error {
    Error::NotFound(format!("File '{}/{}' not found", folder, filename))
}
