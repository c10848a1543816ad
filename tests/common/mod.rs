// Shared by several integration test binaries; not every helper is used by each.
#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing_subscriber::{fmt, EnvFilter};

use character_chat_relay::app_state::build_app_state;
use character_chat_relay::core::config::relay_config::RelayConfig;
use character_chat_relay::routes::app_router;

pub type ChunkSender = mpsc::Sender<Result<Bytes, io::Error>>;

/// How the mock provider answers the next completion request.
pub enum Behavior {
    /// Stream whatever the test pushes through the paired sender.
    Stream(Mutex<Option<mpsc::Receiver<Result<Bytes, io::Error>>>>),
    /// Reply with this status and raw body.
    Error { status: StatusCode, body: &'static str },
    /// Reply 200 with this JSON document.
    Json(Value),
}

impl Behavior {
    pub fn stream(capacity: usize) -> (Self, ChunkSender) {
        let (tx, rx) = mpsc::channel(capacity);
        (Behavior::Stream(Mutex::new(Some(rx))), tx)
    }
}

struct MockState {
    behavior: Behavior,
    calls: AtomicUsize,
    last_body: Mutex<Option<Value>>,
    last_headers: Mutex<Option<HeaderMap>>,
}

/// Test double for the upstream completion endpoint.
pub struct MockUpstream {
    pub url: String,
    state: Arc<MockState>,
}

impl MockUpstream {
    pub async fn start(behavior: Behavior) -> Self {
        let state = Arc::new(MockState {
            behavior,
            calls: AtomicUsize::new(0),
            last_body: Mutex::new(None),
            last_headers: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1/chat/completions", post(completions_handler))
            .with_state(state.clone());

        let url = serve(app).await;
        Self { url, state }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.url)
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Value {
        self.state
            .last_body
            .lock()
            .unwrap()
            .clone()
            .expect("upstream was never called")
    }

    pub fn last_header(&self, name: &str) -> Option<String> {
        self.state
            .last_headers
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|h| h.get(name))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Relay config pointing at this mock with a usable key.
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            upstream_url: self.completions_url(),
            api_key: Some("test-key".into()),
            ..RelayConfig::default()
        }
    }
}

async fn completions_handler(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    *state.last_body.lock().unwrap() = Some(body);
    *state.last_headers.lock().unwrap() = Some(headers);

    match &state.behavior {
        Behavior::Stream(rx) => {
            let rx = rx.lock().unwrap().take().expect("stream behavior used twice");
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/event-stream")
                .body(Body::from_stream(ReceiverStream::new(rx)))
                .unwrap()
        }
        Behavior::Error { status, body } => (*status, *body).into_response(),
        Behavior::Json(value) => Json(value.clone()).into_response(),
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("Server error: {}", e);
        }
    });
    format!("http://{}", addr)
}

/// Start the relay on an ephemeral port and return its base URL.
pub async fn spawn_relay(config: RelayConfig) -> String {
    init_test_tracing();
    let state = build_app_state(config).expect("relay state");
    serve(app_router(state, 10 * 1024 * 1024)).await
}

pub fn init_test_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_target(true)
        .with_test_writer()
        .try_init();
}
