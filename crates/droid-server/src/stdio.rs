//! Local-pipe transport: newline-delimited JSON-RPC on stdin/stdout.
//!
//! Everything else (logs included) must stay off stdout.

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;

use crate::handler::McpHandler;

/// Serve MCP on the process's stdin/stdout until stdin closes.
pub async fn run_stdio(handler: Arc<McpHandler>) -> droid_core::Result<()> {
    info!("serving MCP over stdio");
    serve_lines(
        &handler,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;
    info!("stdin closed, shutting down");
    Ok(())
}

/// Read one message per line from `reader`, write one reply per line to `writer`.
pub async fn serve_lines<R, W>(handler: &McpHandler, reader: R, mut writer: W) -> droid_core::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = handler.handle_message(&line).await {
            let mut out = serde_json::to_string(&response)?;
            out.push('\n');
            writer.write_all(out.as_bytes()).await?;
            writer.flush().await?;
        }
    }
    Ok(())
}
