//! HTTP handlers for the tool surface
//!
//! One POST endpoint per tool, request body = named parameters:
//! - POST /create_excel
//! - POST /create_csv
//! - POST /create_pdf
//! - POST /create_file
//! - POST /generate_and_archive
//! - POST /mcp (JSON-RPC, see [`super::rpc`])

use super::rpc::handle_rpc;
use super::{
    ArchiveRequest, ExportService, FileRequest, PdfRequest, RowsRequest, ToolCall, ToolResponse,
};
use crate::error::{Error, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

/// Shared state for tool handlers
#[derive(Clone)]
pub struct ToolsState {
    pub service: Arc<ExportService>,
}

/// Create the tools router with the REST and JSON-RPC endpoints
pub fn tools_router(state: ToolsState) -> Router {
    Router::new()
        .route("/create_excel", post(create_excel))
        .route("/create_csv", post(create_csv))
        .route("/create_pdf", post(create_pdf))
        .route("/create_file", post(create_file))
        .route("/generate_and_archive", post(generate_and_archive))
        .route("/mcp", post(handle_rpc))
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

type Payload<T> = std::result::Result<Json<T>, JsonRejection>;

/// POST /create_excel
async fn create_excel(
    State(state): State<ToolsState>,
    payload: Payload<RowsRequest>,
) -> Result<Json<ToolResponse>> {
    let Json(request) = payload.map_err(bad_request)?;
    run(&state, ToolCall::CreateExcel(request)).await
}

/// POST /create_csv
async fn create_csv(
    State(state): State<ToolsState>,
    payload: Payload<RowsRequest>,
) -> Result<Json<ToolResponse>> {
    let Json(request) = payload.map_err(bad_request)?;
    run(&state, ToolCall::CreateCsv(request)).await
}

/// POST /create_pdf
async fn create_pdf(
    State(state): State<ToolsState>,
    payload: Payload<PdfRequest>,
) -> Result<Json<ToolResponse>> {
    let Json(request) = payload.map_err(bad_request)?;
    run(&state, ToolCall::CreatePdf(request)).await
}

/// POST /create_file
async fn create_file(
    State(state): State<ToolsState>,
    payload: Payload<FileRequest>,
) -> Result<Json<ToolResponse>> {
    let Json(request) = payload.map_err(bad_request)?;
    run(&state, ToolCall::CreateFile(request)).await
}

/// POST /generate_and_archive
async fn generate_and_archive(
    State(state): State<ToolsState>,
    payload: Payload<ArchiveRequest>,
) -> Result<Json<ToolResponse>> {
    let Json(request) = payload.map_err(bad_request)?;
    run(&state, ToolCall::GenerateAndArchive(request)).await
}

async fn run(state: &ToolsState, call: ToolCall) -> Result<Json<ToolResponse>> {
    state.service.call(call).await.map(Json)
}

fn bad_request(rejection: JsonRejection) -> Error {
    Error::InvalidInput(rejection.body_text())
}
