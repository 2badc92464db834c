// src/ingest/mod.rs

pub mod handler;
pub mod protocol;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

use crate::AppState;
use handler::handle_request;
use protocol::{error_codes, Request, Response};

/// Reads one request per line from `reader` and writes one response per line to `writer`
/// until EOF.
pub async fn run_line_loop<R, W>(state: AppState, reader: R, mut writer: W)
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("EOF received, shutting down ingest loop");
                break;
            }
            Err(e) => {
                error!("Failed to read from input: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        debug!("Received: {}", line);

        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => handle_request(request, &state),
            Err(parse_error) => {
                error!("JSON parse error: {}", parse_error);
                Some(Response::error(
                    serde_json::Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", parse_error),
                ))
            }
        };

        if let Some(response) = response {
            match encode(&response, state.config.pretty_output) {
                Ok(response_json) => {
                    debug!("Sending: {}", response_json);
                    if let Err(e) = writer
                        .write_all(format!("{}\n", response_json).as_bytes())
                        .await
                    {
                        error!("Failed to write response: {}", e);
                        break;
                    }
                }
                Err(e) => error!("Failed to encode response: {}", e),
            }
        }
    }

    if let Err(e) = writer.flush().await {
        error!("Failed to flush output: {}", e);
    }
}

fn encode<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
