//! MCP server over stdio: one JSON-RPC message per line in, one response per
//! request out. Notifications get no response.

use anyhow::Result;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use super::protocol::{Request, Response};
use crate::error::{ForgeError, PARSE_ERROR};
use crate::mcp::tools::{self, ToolContext};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Serve stdin/stdout until EOF or cancellation.
pub async fn run_stdio(ctx: ToolContext, token: CancellationToken) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(stdin, stdout, ctx, token).await
}

pub async fn serve<R, W>(mut reader: R, mut writer: W, ctx: ToolContext, token: CancellationToken) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut frame = Vec::new();
    tracing::info!("codesmith MCP server ready");

    loop {
        frame.clear();
        tokio::select! {
            _ = token.cancelled() => {
                tracing::info!("Shutdown requested, closing server");
                break;
            }
            read = reader.read_until(b'\n', &mut frame) => {
                if read? == 0 {
                    tracing::info!("stdin closed, closing server");
                    break;
                }
            }
        }

        if frame.iter().all(|b| b.is_ascii_whitespace()) {
            continue;
        }

        // Raw bytes: invalid UTF-8 is a parse error like any other bad frame.
        let response = match serde_json::from_slice::<Request>(&frame) {
            Ok(req) => handle_request(req, &ctx).await,
            Err(e) => {
                tracing::warn!("Invalid JSON-RPC message: {}", e);
                Some(Response::error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)))
            }
        };

        if let Some(response) = response {
            let s = serde_json::to_string(&response)?;
            writer.write_all(s.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }

    Ok(())
}

/// Route one message. Returns `None` for notifications.
pub async fn handle_request(req: Request, ctx: &ToolContext) -> Option<Response> {
    if req.is_notification() {
        tracing::debug!("Notification: {}", req.method);
        return None;
    }
    let id = req.id.clone().unwrap_or(Value::Null);

    let response = match req.method.as_str() {
        "initialize" => Response::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": {
                    "name": "codesmith",
                    "version": env!("CARGO_PKG_VERSION")
                },
                "capabilities": {
                    "tools": { "listChanged": false }
                }
            }),
        ),
        "ping" => Response::success(id, json!({})),
        "tools/list" => Response::success(id, json!({ "tools": tools::tools_list() })),
        "tools/call" => handle_tools_call(id, &req.params, ctx).await,
        _ => Response::from_error(id, ForgeError::MethodNotFound(req.method.clone())),
    };
    Some(response)
}

async fn handle_tools_call(id: Value, params: &Value, ctx: &ToolContext) -> Response {
    let name = match params.get("name").and_then(|v| v.as_str()) {
        Some(n) => n,
        None => {
            return Response::from_error(id, ForgeError::InvalidParams("Missing tool name".into()))
        }
    };
    let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    match tools::call(name, &args, ctx).await {
        Ok(result) => Response::success(id, result),
        Err(e) => Response::from_error(id, e),
    }
}
