//! Push transport: persistent WebSocket to the gateway relay endpoint.
//!
//! Outbound `transcript` frames fan in through a channel owned by a link
//! task; inbound `transcript-update` broadcasts fan out to subscribers. The
//! link reconnects on its own with bounded attempts and linear backoff, and
//! the capture pipeline never blocks on it: while the link is down, sends
//! degrade to a logged, counted drop.

use crate::relay::{RelayChannel, RelayState};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use scrivener_core::error::ScrivenerResult;
use scrivener_core::types::{RelayFrame, TranscriptUpdate};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);
const OUTBOUND_BUFFER: usize = 64;

pub struct PushRelay {
    out_tx: mpsc::Sender<TranscriptUpdate>,
    in_tx: broadcast::Sender<TranscriptUpdate>,
    state: Arc<Mutex<RelayState>>,
    dropped: AtomicU64,
}

impl PushRelay {
    /// Start the link task against the gateway base URL (`http(s)://…`). The
    /// connection is established in the background; sends buffer until then.
    pub fn new(base_url: &str) -> Self {
        let url = relay_ws_url(base_url);
        let (out_tx, out_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let (in_tx, _) = broadcast::channel(OUTBOUND_BUFFER);
        let state = Arc::new(Mutex::new(RelayState::Disconnected));

        tokio::spawn(run_link(url, out_rx, in_tx.clone(), Arc::clone(&state)));

        Self {
            out_tx,
            in_tx,
            state,
            dropped: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> RelayState {
        *self.state.lock().unwrap()
    }

    /// Updates dropped while the link was down or gone.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RelayChannel for PushRelay {
    async fn send(&self, update: TranscriptUpdate) -> ScrivenerResult<()> {
        if self.out_tx.try_send(update).is_err() {
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(
                target: "scrivener::relay",
                "Relay link down, dropped transcript update ({} total)",
                total
            );
        }
        Ok(())
    }

    async fn subscribe(&self) -> ScrivenerResult<mpsc::Receiver<TranscriptUpdate>> {
        let (tx, rx) = mpsc::channel(16);
        let mut updates = self.in_tx.subscribe();
        tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(update) => {
                        if tx.send(update).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(target: "scrivener::relay", "Relay subscriber lagged, skipped {}", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Ok(rx)
    }
}

/// Map the gateway HTTP base to its relay socket URL.
fn relay_ws_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/relay", ws_base)
}

fn set_state(state: &Arc<Mutex<RelayState>>, value: RelayState) {
    *state.lock().unwrap() = value;
}

/// Own the socket for the life of the relay: connect, pump frames both ways,
/// reconnect with linear backoff, give up after the attempt budget.
async fn run_link(
    url: String,
    mut out_rx: mpsc::Receiver<TranscriptUpdate>,
    in_tx: broadcast::Sender<TranscriptUpdate>,
    state: Arc<Mutex<RelayState>>,
) {
    let mut attempt: u32 = 0;
    loop {
        if attempt > 0 {
            set_state(&state, RelayState::Disconnected);
            tokio::time::sleep(RECONNECT_BACKOFF * attempt).await;
        }
        set_state(&state, RelayState::Connecting);

        match connect_async(&url).await {
            Ok((socket, _)) => {
                attempt = 0;
                set_state(&state, RelayState::Connected);
                info!(target: "scrivener::relay", "Relay socket connected: {}", url);

                let (mut sink, mut stream) = socket.split();
                let mut shutdown = false;
                loop {
                    tokio::select! {
                        maybe_update = out_rx.recv() => {
                            match maybe_update {
                                Some(update) => {
                                    let frame = RelayFrame::Transcript(update);
                                    match serde_json::to_string(&frame) {
                                        Ok(text) => {
                                            if sink.send(Message::Text(text)).await.is_err() {
                                                break;
                                            }
                                        }
                                        Err(e) => {
                                            debug!(target: "scrivener::relay", "Frame encode failed: {}", e);
                                        }
                                    }
                                }
                                None => {
                                    shutdown = true;
                                    break;
                                }
                            }
                        }
                        maybe_msg = stream.next() => {
                            match maybe_msg {
                                Some(Ok(Message::Text(text))) => {
                                    match serde_json::from_str::<RelayFrame>(&text) {
                                        Ok(RelayFrame::Update(update)) => {
                                            let _ = in_tx.send(update);
                                        }
                                        Ok(RelayFrame::Transcript(_)) => {}
                                        Err(e) => {
                                            debug!(target: "scrivener::relay", "Unparseable relay frame: {}", e);
                                        }
                                    }
                                }
                                Some(Ok(Message::Close(_))) | None => break,
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    debug!(target: "scrivener::relay", "Relay socket error: {}", e);
                                    break;
                                }
                            }
                        }
                    }
                }

                if shutdown {
                    set_state(&state, RelayState::Disconnected);
                    return;
                }
                warn!(target: "scrivener::relay", "Relay socket lost, reconnecting");
            }
            Err(e) => {
                warn!(target: "scrivener::relay", "Relay connect failed: {}", e);
            }
        }

        attempt += 1;
        if attempt >= MAX_RECONNECT_ATTEMPTS {
            set_state(&state, RelayState::Error);
            warn!(
                target: "scrivener::relay",
                "Relay gave up after {} connection attempts",
                attempt
            );
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_url_derives_scheme_and_path() {
        assert_eq!(
            relay_ws_url("http://127.0.0.1:8787/"),
            "ws://127.0.0.1:8787/relay"
        );
        assert_eq!(
            relay_ws_url("https://gateway.example.com"),
            "wss://gateway.example.com/relay"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_link_degrades_to_silent_drop() {
        // Nothing listens on port 9; every connect attempt is refused and the
        // backoff sleeps fast-forward under paused time.
        let relay = PushRelay::new("http://127.0.0.1:9");

        let mut gave_up = false;
        for _ in 0..200 {
            if relay.state() == RelayState::Error {
                gave_up = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(gave_up, "link should exhaust its attempt budget");

        relay
            .send(TranscriptUpdate::now("m-1", "anyone there"))
            .await
            .unwrap();
        relay
            .send(TranscriptUpdate::now("m-1", "anyone there at all"))
            .await
            .unwrap();
        assert_eq!(relay.dropped_count(), 2);
    }
}
