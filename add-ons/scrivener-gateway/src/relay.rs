//! Relay socket: push-mode transport for live transcripts.
//!
//! GET /relay upgrades to a WebSocket. Inbound `"transcript"` frames write
//! the store and are re-broadcast to every connected socket as
//! `"transcript-update"`, so push traffic stays visible to pull readers.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use scrivener_core::types::{RelayFrame, TranscriptUpdate};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::AppState;

pub async fn relay_handler(
    State(state): State<AppState>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    upgrade.on_upgrade(move |socket| handle_relay_socket(state, socket))
}

async fn handle_relay_socket(state: AppState, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let mut updates = state.relay_tx.subscribe();

    let send_task = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) => {
                    let payload = match serde_json::to_string(&RelayFrame::Update(update)) {
                        Ok(p) => p,
                        Err(e) => {
                            warn!(target: "scrivener::relay", "Relay frame failed to serialize: {}", e);
                            continue;
                        }
                    };
                    if sink.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(target: "scrivener::relay", "Slow relay socket skipped {} update(s)", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                ingest_frame(&state, &text);
            }
            Message::Close(_) => break,
            Message::Binary(_) => {
                debug!(target: "scrivener::relay", "Ignoring binary relay frame");
            }
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    send_task.abort();
}

/// Apply one inbound frame: store write plus broadcast. Returns whether the
/// frame carried a transcript. Malformed frames are logged and skipped.
pub(crate) fn ingest_frame(state: &AppState, text: &str) -> bool {
    match serde_json::from_str::<RelayFrame>(text) {
        Ok(RelayFrame::Transcript(update)) => {
            let timestamp = state.store.write(&update.meeting_id, &update.text);
            let rebroadcast = TranscriptUpdate {
                timestamp,
                ..update
            };
            let _ = state.relay_tx.send(rebroadcast);
            true
        }
        // Server-side frames are not accepted from clients.
        Ok(RelayFrame::Update(_)) => false,
        Err(e) => {
            debug!(target: "scrivener::relay", "Ignoring malformed relay frame: {}", e);
            false
        }
    }
}
