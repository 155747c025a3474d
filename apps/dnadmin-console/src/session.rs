//! Session layer: consumes the dappmanager event stream and publishes every
//! frame onto the in-process bus.
//!
//! Owns reconnection. Messages sent while disconnected are lost; listeners
//! registered against the bus survive reconnects untouched, so no
//! resubscription step is needed beyond reopening the stream.

use std::time::Duration;

use anyhow::Context as _;
use futures_util::StreamExt as _;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tokio::task::JoinHandle;

use dnadmin_events::Bus;

use crate::config::Config;

/// Incremental `text/event-stream` frame decoder. Feed it lines; it yields
/// a `(topic, payload)` pair whenever a frame completes.
#[derive(Default)]
pub struct SseFrameDecoder {
    event: Option<String>,
    data: String,
}

impl SseFrameDecoder {
    pub fn push_line(&mut self, line: &str) -> Option<(String, Value)> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            let topic = self.event.take();
            let data = std::mem::take(&mut self.data);
            let topic = topic?;
            if data.is_empty() {
                return None;
            }
            return match serde_json::from_str::<Value>(&data) {
                Ok(payload) => Some((topic, payload)),
                Err(err) => {
                    tracing::warn!("bad event payload on {}: {}", topic, err);
                    None
                }
            };
        }
        if let Some(rest) = line.strip_prefix("event:") {
            self.event = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            if !self.data.is_empty() {
                self.data.push('\n');
            }
            self.data.push_str(rest.strip_prefix(' ').unwrap_or(rest));
        }
        // Comment lines (":keepalive") and unknown fields are ignored.
        None
    }
}

/// Spawn the consumer loop for the current session scope.
pub fn spawn(cfg: Config, bus: Bus) -> JoinHandle<()> {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        loop {
            match run_once(&client, &cfg.events_url, &bus).await {
                Ok(()) => tracing::warn!("event stream ended; reconnecting"),
                Err(err) => tracing::warn!("event stream error: {:#}; reconnecting", err),
            }
            tokio::time::sleep(Duration::from_secs(cfg.reconnect_secs)).await;
        }
    })
}

async fn run_once(client: &reqwest::Client, events_url: &str, bus: &Bus) -> anyhow::Result<()> {
    let response = client
        .get(events_url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
        .context("open event stream")?
        .error_for_status()
        .context("event stream handshake status")?;
    tracing::info!("subscribed to {}", events_url);

    let mut stream = response.bytes_stream();
    let mut decoder = SseFrameDecoder::default();
    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("read event stream")?;
        buf.extend_from_slice(&chunk);
        while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some((topic, payload)) = decoder.push_line(&line) {
                bus.publish(&topic, &payload);
            }
        }
    }
    Ok(())
}
