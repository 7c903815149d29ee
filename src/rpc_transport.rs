//! Newline-delimited JSON transport for the command surface.
//!
//! Request:  {"id":1, "action":"ADD_KEYWORD", "data":{"keyword":"shop"}}
//!           {"id":2, "event":"visited", "data":{"url":"https://shop.example.com"}}
//! Response: {"id":1, "success":true, "settings":{...}} or {"id":1, "success":false, "error":"..."}
//!
//! Every request runs on its own task and replies go through one writer task,
//! so a long scrub never holds up `visited` events or reads. Mutations still
//! serialize on the App's operation lock. Replies carry the request `id` and
//! may arrive out of order.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::app::App;
use crate::rpc_handler::{handle_action, handle_event, ACTIONS};
use crate::types::rpc::CommandResponse;

/// Requests accepted per second before replies become "rate limited".
pub const MAX_REQUESTS_PER_SECOND: u32 = 200;

const OUTBOUND_CAPACITY: usize = 256;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

/// The response object with `id` added.
pub fn reply(id: &Value, response: CommandResponse) -> Value {
    let mut body = serde_json::to_value(response)
        .unwrap_or_else(|e| json!({"success": false, "error": e.to_string()}));
    if let Value::Object(map) = &mut body {
        map.insert("id".to_string(), id.clone());
    }
    body
}

/// Routes one parsed request to the action or event table.
pub async fn dispatch_request(app: &App, req: &Value) -> CommandResponse {
    let data = req.get("data").cloned().unwrap_or_else(|| json!({}));
    match (
        req.get("action").and_then(Value::as_str),
        req.get("event").and_then(Value::as_str),
    ) {
        (Some(action), _) => handle_action(app, action, &data).await,
        (None, Some(event)) => handle_event(app, event, &data).await,
        (None, None) => CommandResponse::failure("missing action"),
    }
}

async fn write_replies<W>(mut rx: mpsc::Receiver<Value>, mut writer: W) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(value) = rx.recv().await {
        writer.write_all(value.to_string().as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Serves requests from `reader` until EOF, then waits for in-flight replies.
///
/// The first line written is a `ready` announcement listing the actions.
pub async fn serve<R, W>(app: Arc<App>, reader: R, writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Value>(OUTBOUND_CAPACITY);
    let writer_task = tokio::spawn(write_replies(rx, writer));

    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION"), "actions": ACTIONS});
    let _ = tx.send(ready).await;

    let mut rate_limiter = RateLimiter::new(MAX_REQUESTS_PER_SECOND);
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let response = CommandResponse::failure(format!("parse error: {}", e));
                let _ = tx.send(reply(&Value::Null, response)).await;
                continue;
            }
        };
        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            warn!("Request rate limited");
            let _ = tx.send(reply(&id, CommandResponse::failure("rate limited"))).await;
            continue;
        }

        let app = Arc::clone(&app);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = dispatch_request(&app, &req).await;
            if tx.send(reply(&id, response)).await.is_err() {
                debug!("Reply dropped, writer closed");
            }
        });
    }

    // The writer finishes once every in-flight request has dropped its sender.
    drop(tx);
    writer_task
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}
