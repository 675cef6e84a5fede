//! JSON-RPC 2.0 tool protocol
//!
//! Supports `initialize`, `ping`, `tools/list` and `tools/call`. Requests
//! without an `id` are notifications and get no response: over HTTP
//! (`POST /mcp`) they are acknowledged with `202 Accepted`, over stdio
//! ([`super::stdio`]) nothing is written.

use super::{ToolCall, ToolsState};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PROTOCOL_VERSION: &str = "2025-03-26";
pub const SERVER_NAME: &str = "file_export";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// A JSON-RPC response object
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcResponse {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// POST /mcp
pub async fn handle_rpc(State(state): State<ToolsState>, body: Bytes) -> Response {
    match handle_message(&state, &body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle one raw JSON-RPC message. Returns `None` for notifications.
pub async fn handle_message(state: &ToolsState, message: &[u8]) -> Option<RpcResponse> {
    let raw: Value = match serde_json::from_slice(message) {
        Ok(v) => v,
        Err(e) => return Some(RpcResponse::err(Value::Null, PARSE_ERROR, e.to_string())),
    };
    let request: RpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => return Some(RpcResponse::err(Value::Null, INVALID_REQUEST, e.to_string())),
    };
    if request.jsonrpc.as_deref().is_some_and(|v| v != "2.0") {
        let id = request.id.unwrap_or(Value::Null);
        return Some(RpcResponse::err(
            id,
            INVALID_REQUEST,
            "Unsupported jsonrpc version",
        ));
    }

    let Some(id) = request.id else {
        tracing::debug!(method = %request.method, "Notification received");
        return None;
    };

    Some(dispatch(state, id, &request.method, request.params).await)
}

async fn dispatch(state: &ToolsState, id: Value, method: &str, params: Value) -> RpcResponse {
    match method {
        "initialize" => RpcResponse::ok(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {"listChanged": false}},
                "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
            }),
        ),
        "ping" => RpcResponse::ok(id, json!({})),
        "tools/list" => RpcResponse::ok(id, json!({"tools": tool_definitions()})),
        "tools/call" => {
            let call: ToolCall = match serde_json::from_value(params) {
                Ok(call) => call,
                Err(e) => return RpcResponse::err(id, INVALID_PARAMS, e.to_string()),
            };
            RpcResponse::ok(id, call_tool(state, call).await)
        }
        other => {
            tracing::debug!(method = other, "Unknown JSON-RPC method");
            RpcResponse::err(id, METHOD_NOT_FOUND, format!("Method not found: {}", other))
        }
    }
}

async fn call_tool(state: &ToolsState, call: ToolCall) -> Value {
    let name = call.name();
    match state.service.call(call).await {
        Ok(response) => {
            let structured = json!({"url": response.url});
            json!({
                "content": [{"type": "text", "text": structured.to_string()}],
                "structuredContent": structured,
                "isError": false,
            })
        }
        Err(e) => {
            tracing::warn!(tool = name, error = %e, "Tool call failed");
            json!({
                "content": [{"type": "text", "text": e.to_string()}],
                "isError": true,
            })
        }
    }
}

/// Names, descriptions and input schemas for `tools/list`
pub fn tool_definitions() -> Vec<Value> {
    let persistent = json!({
        "type": "boolean",
        "description": "Keep the generated files instead of deleting them after the retention delay"
    });
    let filename = json!({"type": "string", "description": "Output file name"});
    let rows = json!({
        "type": "array",
        "description": "Rows of cell values",
        "items": {"type": "array", "items": {}}
    });

    vec![
        json!({
            "name": "create_excel",
            "description": "Create an .xlsx workbook from rows of cells and return its download URL",
            "inputSchema": {
                "type": "object",
                "properties": {"data": rows, "filename": filename, "persistent": persistent},
                "required": ["data"]
            }
        }),
        json!({
            "name": "create_csv",
            "description": "Create a CSV file from rows of cells and return its download URL",
            "inputSchema": {
                "type": "object",
                "properties": {"data": rows, "filename": filename, "persistent": persistent},
                "required": ["data"]
            }
        }),
        json!({
            "name": "create_pdf",
            "description": "Create a PDF with one paragraph per entry and return its download URL",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "text": {"type": "array", "items": {"type": "string"}},
                    "filename": filename,
                    "persistent": persistent
                },
                "required": ["text"]
            }
        }),
        json!({
            "name": "create_file",
            "description": "Write text to a file with the given name (subdirectories allowed) and return its download URL",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "content": {"type": "string"},
                    "filename": filename,
                    "persistent": persistent
                },
                "required": ["content", "filename"]
            }
        }),
        json!({
            "name": "generate_and_archive",
            "description": "Generate several files and bundle them into a zip or 7z archive; returns the archive URL",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "files_data": {
                        "type": "array",
                        "description": "Each item is {filename, content, format?}, {filename, code} or {path: content}",
                        "items": {"type": "object"}
                    },
                    "archive_format": {"type": "string", "enum": ["zip", "7z"], "default": "zip"},
                    "archive_name": {"type": "string"},
                    "persistent": persistent
                },
                "required": ["files_data"]
            }
        }),
    ]
}
