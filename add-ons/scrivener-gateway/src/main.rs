//! Scrivener gateway: axum server for transcript relay, transcription, and
//! analysis. Holds the speech and LLM keys so capture clients never see
//! them; clients talk to this gateway only.

mod relay;

use axum::extract::{Multipart, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use scrivener_core::config::ScrivenerConfig;
use scrivener_core::error::ScrivenerError;
use scrivener_core::llm::{create_best_analysis, strip_code_fences, AnalysisBackend};
use scrivener_core::prompts::{
    document_breakdown_user_prompt, live_notes_user_prompt, DOCUMENT_BREAKDOWN_SYSTEM,
    LIVE_NOTES_SYSTEM,
};
use scrivener_core::speech::{create_best_speech, AudioEncoding, SpeechBackend};
use scrivener_core::store::TranscriptStore;
use scrivener_core::types::{
    AnalyzeDocumentRequest, AnalyzeTranscriptRequest, AnalyzeTranscriptResponse, DocumentAnalysis,
    LatestTranscriptResponse, ProcessingInfo, StoreWriteRequest, TranscribeResponse,
    TranscriptUpdate, DEFAULT_MEETING_ID,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pending updates a slow relay socket may fall behind by before skipping.
const RELAY_CHANNEL_CAPACITY: usize = 256;

const STORE_EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ScrivenerConfig>,
    pub store: Arc<TranscriptStore>,
    pub speech: Arc<dyn SpeechBackend>,
    pub analysis: Arc<dyn AnalysisBackend>,
    pub relay_tx: broadcast::Sender<TranscriptUpdate>,
}

#[tokio::main]
async fn main() {
    // Keys (speech, Gemini) stay in the backend environment only.
    if let Err(e) = dotenvy::dotenv() {
        eprintln!(
            "[scrivener-gateway] .env not loaded: {} (using system environment)",
            e
        );
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ScrivenerConfig::load() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(target: "scrivener::gateway", "Configuration failed to load: {}", e);
            std::process::exit(1);
        }
    };

    let store = Arc::new(TranscriptStore::new(config.retention_secs));
    let speech: Arc<dyn SpeechBackend> = Arc::from(create_best_speech(&config));
    let analysis: Arc<dyn AnalysisBackend> = Arc::from(create_best_analysis(&config));
    let (relay_tx, _) = broadcast::channel(RELAY_CHANNEL_CAPACITY);

    spawn_store_eviction(Arc::clone(&store));

    let state = AppState {
        config: Arc::clone(&config),
        store,
        speech,
        analysis,
        relay_tx,
    };
    let app = build_app(state);

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!(target: "scrivener::gateway", "{} gateway listening on {}", config.app_name, addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!(target: "scrivener::gateway", "Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(target: "scrivener::gateway", "Shutdown requested");
        }
    }
}

fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route(
            "/api/v1/latest-transcript",
            post(latest_transcript_post).get(latest_transcript_get),
        )
        .route("/api/v1/transcribe", post(transcribe_post))
        .route("/api/v1/analyze-transcript", post(analyze_transcript_post))
        .route("/api/v1/analyze-document", post(analyze_document_post))
        .route("/api/v1/health", get(health_get))
        .route("/relay", get(relay::relay_handler))
        .layer(cors)
        .with_state(state)
}

/// Admit only the configured capture origins (browser extensions and local
/// consoles). Everything else gets no CORS headers.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allowed = allowed_origins.to_vec();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _| match origin.to_str() {
                Ok(s) => allowed.iter().any(|a| a == s),
                Err(_) => false,
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

/// Expired live slots go away on a fixed cadence; archived meetings are the
/// console's concern.
fn spawn_store_eviction(store: Arc<TranscriptStore>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(STORE_EVICTION_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let evicted = store.evict_expired();
            if evicted > 0 {
                tracing::info!(target: "scrivener::store", "Evicted {} expired transcript slot(s)", evicted);
            }
        }
    });
}

/// POST /api/v1/latest-transcript - overwrite the keyed slot (missing
/// meetingId maps to "default") and fan the update out to relay sockets.
async fn latest_transcript_post(
    State(state): State<AppState>,
    Json(body): Json<StoreWriteRequest>,
) -> Json<serde_json::Value> {
    let meeting_id = body
        .meeting_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_MEETING_ID);
    let timestamp = state.store.write(meeting_id, &body.text);
    let _ = state.relay_tx.send(TranscriptUpdate {
        meeting_id: meeting_id.to_string(),
        text: body.text,
        timestamp,
    });
    Json(serde_json::json!({ "success": true }))
}

/// GET /api/v1/latest-transcript - most recently updated slot across all
/// meetings; empty text and null fields when nothing has been written.
async fn latest_transcript_get(State(state): State<AppState>) -> Json<LatestTranscriptResponse> {
    Json(LatestTranscriptResponse::from(state.store.latest()))
}

/// POST /api/v1/transcribe - multipart `audio` field through the speech
/// backend. Upstream recognizer failures pass through status and body.
async fn transcribe_post(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut audio: Option<(Vec<u8>, String)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": format!("Malformed multipart body: {}", e) })),
                )
                    .into_response();
            }
        };
        if field.name() == Some("audio") {
            let mime = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            match field.bytes().await {
                Ok(bytes) => audio = Some((bytes.to_vec(), mime)),
                Err(e) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(serde_json::json!({ "error": format!("Audio field unreadable: {}", e) })),
                    )
                        .into_response();
                }
            }
        }
    }

    let Some((bytes, mime)) = audio else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Missing multipart field 'audio'" })),
        )
            .into_response();
    };

    let encoding = AudioEncoding::from_mime(&mime);
    match state.speech.transcribe(&bytes, &mime).await {
        Ok(fragment) => {
            let is_empty = fragment.is_empty();
            let response = TranscribeResponse {
                text: fragment.text,
                timestamp: Utc::now(),
                encoding: encoding.as_str().to_string(),
                duration: wav_duration(&bytes),
                confidence: fragment.confidence,
                processing_info: ProcessingInfo {
                    language_code: state.config.language_code.clone(),
                    encoding: encoding.as_str().to_string(),
                    vocabulary_size: state.config.vocabulary.len(),
                },
                is_empty,
                message: is_empty.then(|| "No speech detected in this segment.".to_string()),
            };
            Json(response).into_response()
        }
        Err(ScrivenerError::TranscriptionFailed { status, body }) => {
            tracing::warn!(target: "scrivener::speech", "Recognizer rejected segment (status {})", status);
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, body).into_response()
        }
        Err(e) => {
            tracing::warn!(target: "scrivener::speech", "Transcription failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// POST /api/v1/analyze-transcript - trailing-window live notes from the
/// analysis backend.
async fn analyze_transcript_post(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeTranscriptRequest>,
) -> Response {
    let window = trailing_words(&body.transcript, state.config.analysis_window_words);
    let prompt = format!(
        "{}\n\n{}",
        LIVE_NOTES_SYSTEM,
        live_notes_user_prompt(&window)
    );
    match state.analysis.generate(&prompt).await {
        Ok(analysis) => Json(AnalyzeTranscriptResponse {
            analysis,
            meeting_id: body
                .meeting_id
                .unwrap_or_else(|| DEFAULT_MEETING_ID.to_string()),
            timestamp: Utc::now(),
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(target: "scrivener::analysis", "Live notes failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// POST /api/v1/analyze-document - strict-JSON breakdown of a pasted
/// document, fence-stripped and validated before it leaves the gateway.
async fn analyze_document_post(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeDocumentRequest>,
) -> Response {
    let prompt = format!(
        "{}\n\n{}",
        DOCUMENT_BREAKDOWN_SYSTEM,
        document_breakdown_user_prompt(body.title.as_deref(), &body.text)
    );
    let raw = match state.analysis.generate(&prompt).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(target: "scrivener::analysis", "Document breakdown failed: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };
    match serde_json::from_str::<DocumentAnalysis>(strip_code_fences(&raw)) {
        Ok(analysis) => Json(analysis).into_response(),
        Err(e) => {
            tracing::warn!(target: "scrivener::analysis", "Document analysis did not parse: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": format!("Analysis response was not valid JSON: {}", e) })),
            )
                .into_response()
        }
    }
}

/// GET /api/v1/health - liveness plus which backends are wired in.
async fn health_get(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "app": state.config.app_name,
        "speechMode": state.config.speech_mode,
        "llmMode": state.config.llm_mode,
    }))
}

fn trailing_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let start = words.len().saturating_sub(max_words.max(1));
    words[start..].join(" ")
}

/// Duration from a canonical 44-byte WAV header. Non-WAV payloads (the
/// recognizer accepts webm/ogg/mp3 too) report no duration.
fn wav_duration(data: &[u8]) -> Option<f64> {
    if data.len() < 44 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return None;
    }
    let byte_rate = u32::from_le_bytes([data[28], data[29], data[30], data[31]]);
    if byte_rate == 0 {
        return None;
    }
    Some((data.len() - 44) as f64 / byte_rate as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use scrivener_core::llm::MockAnalysis;
    use scrivener_core::speech::PlaceholderSpeech;
    use scrivener_core::types::RelayFrame;
    use tower::ServiceExt;

    fn test_state_with(speech: Arc<dyn SpeechBackend>, retention_secs: u64) -> AppState {
        AppState {
            config: Arc::new(ScrivenerConfig::default()),
            store: Arc::new(TranscriptStore::new(retention_secs)),
            speech,
            analysis: Arc::new(MockAnalysis::new()),
            relay_tx: broadcast::channel(16).0,
        }
    }

    fn test_state() -> AppState {
        test_state_with(Arc::new(PlaceholderSpeech::new()), 3600)
    }

    async fn json_body(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_post_then_get_round_trips_text() {
        let app = build_app(test_state());

        let written = "we agreed on net-30 payment terms";
        let res = app
            .clone()
            .oneshot(post_json(
                "/api/v1/latest-transcript",
                serde_json::json!({ "text": written, "meetingId": "meet-42" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["success"], true);

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/latest-transcript")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json["text"], written);
        assert_eq!(json["meetingId"], "meet-42");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_get_with_empty_store_returns_nulls() {
        let app = build_app(test_state());
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/latest-transcript")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json["text"], "");
        assert!(json["meetingId"].is_null());
        assert!(json["timestamp"].is_null());
    }

    #[tokio::test]
    async fn test_missing_meeting_id_maps_to_default() {
        let app = build_app(test_state());
        let res = app
            .clone()
            .oneshot(post_json(
                "/api/v1/latest-transcript",
                serde_json::json!({ "text": "unkeyed write" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/latest-transcript")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = json_body(res).await;
        assert_eq!(json["meetingId"], "default");
    }

    fn multipart_request(content_type: &str, payload: &[u8]) -> Request<Body> {
        let boundary = "scrivener-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"segment.wav\"\r\nContent-Type: {}\r\n\r\n",
                boundary, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
        Request::builder()
            .method("POST")
            .uri("/api/v1/transcribe")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_transcribe_returns_fragment_with_processing_info() {
        let speech = Arc::new(PlaceholderSpeech::with_response(
            "the indemnity clause was accepted".to_string(),
        ));
        let app = build_app(test_state_with(speech, 3600));

        let res = app
            .oneshot(multipart_request("audio/wav", b"RIFFstub"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json["text"], "the indemnity clause was accepted");
        assert_eq!(json["isEmpty"], false);
        assert_eq!(json["encoding"], "LINEAR16");
        assert_eq!(json["processingInfo"]["languageCode"], "en-US");
        assert!(json["processingInfo"]["vocabularySize"].as_u64().unwrap() > 0);
        assert!(json.get("message").is_none() || json["message"].is_null());
    }

    #[tokio::test]
    async fn test_transcribe_silence_reports_is_empty() {
        let speech = Arc::new(PlaceholderSpeech::with_response(String::new()));
        let app = build_app(test_state_with(speech, 3600));

        let res = app
            .oneshot(multipart_request("audio/webm", b"\x1a\x45\xdf\xa3"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json["isEmpty"], true);
        assert_eq!(json["encoding"], "WEBM_OPUS");
        assert_eq!(json["message"], "No speech detected in this segment.");
    }

    struct RejectingSpeech;

    #[async_trait::async_trait]
    impl SpeechBackend for RejectingSpeech {
        async fn transcribe(
            &self,
            _audio: &[u8],
            _mime: &str,
        ) -> scrivener_core::error::ScrivenerResult<scrivener_core::types::TranscriptFragment>
        {
            Err(ScrivenerError::transcription(429, "quota exhausted"))
        }
    }

    #[tokio::test]
    async fn test_transcribe_passes_upstream_status_through() {
        let app = build_app(test_state_with(Arc::new(RejectingSpeech), 3600));
        let res = app
            .oneshot(multipart_request("audio/wav", b"RIFFstub"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&bytes), "quota exhausted");
    }

    #[tokio::test]
    async fn test_transcribe_without_audio_field_is_rejected() {
        let app = build_app(test_state());
        let boundary = "scrivener-test-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{b}--\r\n",
            b = boundary
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/transcribe")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_transcript_returns_notes() {
        let app = build_app(test_state());
        let transcript = (0..25).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let res = app
            .oneshot(post_json(
                "/api/v1/analyze-transcript",
                serde_json::json!({ "transcript": transcript, "meetingId": "meet-7" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert!(json["analysis"].as_str().unwrap().contains("[mock analysis]"));
        assert_eq!(json["meetingId"], "meet-7");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_document_parses_fenced_mock_output() {
        let app = build_app(test_state());
        let res = app
            .oneshot(post_json(
                "/api/v1/analyze-document",
                serde_json::json!({ "text": "The party of the first part...", "title": "NDA" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert!(json["keyPoints"].is_array());
        assert_eq!(json["risks"].as_array().unwrap().len(), 2);
        assert!(json["clauses"][0]["simplifiedExplanation"].is_string());
    }

    #[tokio::test]
    async fn test_health_reports_backend_modes() {
        let app = build_app(test_state());
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["speechMode"], "placeholder");
        assert_eq!(json["llmMode"], "mock");
    }

    #[tokio::test]
    async fn test_cors_preflight_admits_configured_origin_only() {
        let app = build_app(test_state());

        let preflight = |origin: &str| {
            Request::builder()
                .method("OPTIONS")
                .uri("/api/v1/latest-transcript")
                .header("origin", origin)
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap()
        };

        let res = app
            .clone()
            .oneshot(preflight("http://localhost:3000"))
            .await
            .unwrap();
        assert_eq!(
            res.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );

        let res = app.oneshot(preflight("http://evil.example")).await.unwrap();
        assert!(res.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_relay_frame_writes_store_and_rebroadcasts() {
        let state = test_state();
        let mut rx = state.relay_tx.subscribe();

        let frame = serde_json::json!({
            "event": "transcript",
            "meetingId": "meet-9",
            "text": "pushed over the socket",
            "timestamp": "2026-01-05T10:00:00Z"
        });
        assert!(relay::ingest_frame(&state, &frame.to_string()));

        let stored = state.store.read("meet-9").unwrap();
        assert_eq!(stored.text, "pushed over the socket");

        let update = rx.try_recv().unwrap();
        assert_eq!(update.meeting_id, "meet-9");
        assert_eq!(update.text, "pushed over the socket");

        // Whole-frame serialization back out carries the server event tag.
        let out = serde_json::to_value(RelayFrame::Update(state.store.read("meet-9").unwrap()))
            .unwrap();
        assert_eq!(out["event"], "transcript-update");
    }

    #[tokio::test]
    async fn test_malformed_relay_frame_is_skipped() {
        let state = test_state();
        assert!(!relay::ingest_frame(&state, "{not json"));
        assert!(!relay::ingest_frame(
            &state,
            r#"{"event":"transcript-update","meetingId":"m","text":"t","timestamp":"2026-01-05T10:00:00Z"}"#
        ));
        assert!(state.store.is_empty());
    }

    #[test]
    fn test_trailing_words_clips_to_window() {
        let text = (0..250).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let window = trailing_words(&text, 200);
        assert!(window.starts_with("w50 "));
        assert!(window.ends_with("w249"));
        assert_eq!(window.split_whitespace().count(), 200);
        assert_eq!(trailing_words("a b c", 200), "a b c");
    }

    #[test]
    fn test_wav_duration_reads_canonical_header() {
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&((36u32 + 32_000).to_le_bytes()));
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // mono
        wav.extend_from_slice(&16_000u32.to_le_bytes());
        wav.extend_from_slice(&32_000u32.to_le_bytes()); // byte rate
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&32_000u32.to_le_bytes());
        wav.resize(44 + 32_000, 0);

        let duration = wav_duration(&wav).unwrap();
        assert!((duration - 1.0).abs() < 1e-9);
        assert_eq!(wav_duration(b"RIFFDATA"), None);
    }
}
