//! JSON-RPC over stdio
//!
//! One JSON-RPC message per line in, one response per line out. This is how
//! MCP clients run the tool server as a subprocess. Stdout carries protocol
//! traffic only, so logging must go to stderr in this mode.

use super::rpc::handle_message;
use super::ToolsState;
use crate::error::Result;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Serve JSON-RPC messages from `reader` until it reaches end of input,
/// writing responses to `writer`.
pub async fn serve_stdio<R, W>(state: ToolsState, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        let Some(response) = handle_message(&state, message.as_bytes()).await else {
            continue;
        };
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }

    tracing::info!("Input closed, stopping stdio server");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::tools::rpc::{PARSE_ERROR, PROTOCOL_VERSION};
    use crate::tools::ExportService;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;

    fn make_state(root: &std::path::Path) -> ToolsState {
        let mut config = ExportConfig::default();
        config.export.dir = root.to_path_buf();
        config.export.base_url = "http://files.test/files".to_string();
        config.retention.persistent = true;
        ToolsState {
            service: Arc::new(ExportService::new(&config)),
        }
    }

    /// Feed `input` through the stdio loop over an in-memory pipe and
    /// collect every response line.
    async fn exchange(state: ToolsState, input: String) -> Vec<Value> {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server);
        let server_task = tokio::spawn(serve_stdio(state, server_read, server_write));

        let (mut client_read, mut client_write) = tokio::io::split(client);
        client_write.write_all(input.as_bytes()).await.unwrap();
        client_write.shutdown().await.unwrap();

        let mut output = String::new();
        client_read.read_to_string(&mut output).await.unwrap();
        server_task.await.unwrap().unwrap();

        output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_list_and_call() {
        let root = tempfile::tempdir().unwrap();
        let messages = [
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {"name": "create_csv", "arguments": {"data": [["a", "b"]]}}
            }),
        ];
        let input: String = messages.iter().map(|m| format!("{}\n", m)).collect();

        let responses = exchange(make_state(root.path()), input).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 5);
        assert_eq!(responses[2]["id"], 3);
        assert_eq!(responses[2]["result"]["isError"], false);

        let url = responses[2]["result"]["structuredContent"]["url"]
            .as_str()
            .unwrap();
        let rel = url.strip_prefix("http://files.test/files/").unwrap();
        assert_eq!(
            std::fs::read_to_string(root.path().join(rel)).unwrap(),
            "a,b\r\n"
        );
    }

    #[tokio::test]
    async fn test_blank_and_malformed_lines() {
        let root = tempfile::tempdir().unwrap();
        let input = "\n   \n{oops\n".to_string()
            + &json!({"jsonrpc": "2.0", "id": "p", "method": "ping"}).to_string()
            + "\n";

        let responses = exchange(make_state(root.path()), input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], PARSE_ERROR);
        assert_eq!(responses[1]["id"], "p");
        assert_eq!(responses[1]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_empty_input_exits_cleanly() {
        let root = tempfile::tempdir().unwrap();
        assert!(exchange(make_state(root.path()), String::new())
            .await
            .is_empty());
    }
}
