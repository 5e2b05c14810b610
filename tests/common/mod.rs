//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use watermark_gateway::adapter::{ProxyFunction, ProxyRequest, ServicePipeline};
use watermark_gateway::app::{build_router, AppState};
use watermark_gateway::config::WatermarkConfig;
use watermark_gateway::render::PdfStamp;
use watermark_gateway::storage::MemoryStore;

pub type AppFunction = ProxyFunction<ServicePipeline<Router>>;

/// Minimal PDF document used across tests.
pub const SAMPLE_PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF\n";

/// Gateway event for `method path` with optional query and body.
pub fn event(method: &str, path: &str) -> ProxyRequest {
    let mut request = ProxyRequest {
        http_method: method.to_string(),
        path: path.to_string(),
        ..Default::default()
    };
    request.request_context.request_id = format!("gw-{}", uuid::Uuid::new_v4());
    request
}

pub fn with_query(mut request: ProxyRequest, pairs: &[(&str, &str)]) -> ProxyRequest {
    request.query_string_parameters = Some(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    );
    request
}

pub fn with_body(mut request: ProxyRequest, content_type: &str, body: &str) -> ProxyRequest {
    request
        .headers
        .get_or_insert_with(BTreeMap::new)
        .insert("Content-Type".to_string(), content_type.to_string());
    request.body = Some(body.to_string());
    request
}

pub fn watermark_config() -> WatermarkConfig {
    WatermarkConfig {
        default_label: "CONFIDENTIAL".to_string(),
        output_prefix: "temp".to_string(),
        public_base_url: "https://docs.example.com".to_string(),
    }
}

/// The application function backed by an in-memory store.
pub fn app_function(store: MemoryStore) -> AppFunction {
    let state = AppState::new(Arc::new(store), Arc::new(PdfStamp), watermark_config());
    ProxyFunction::builder(ServicePipeline::new(build_router(state))).build()
}

/// An invocation answered (or failed) by the function under test.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub request_id: String,
    pub error_type_header: Option<String>,
    pub body: Bytes,
}

/// Queued invocations and recorded outcomes of a mock runtime API.
#[derive(Default)]
pub struct MockRuntime {
    pending: Mutex<VecDeque<(String, Vec<u8>)>>,
    pub responses: Mutex<Vec<Outcome>>,
    pub errors: Mutex<Vec<Outcome>>,
}

impl MockRuntime {
    pub fn enqueue(&self, request_id: &str, payload: impl Into<Vec<u8>>) {
        self.pending
            .lock()
            .unwrap()
            .push_back((request_id.to_string(), payload.into()));
    }
}

async fn next_invocation(State(mock): State<Arc<MockRuntime>>) -> Response {
    let Some((request_id, payload)) = mock.pending.lock().unwrap().pop_front() else {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };
    (
        StatusCode::OK,
        [
            ("Lambda-Runtime-Aws-Request-Id", request_id),
            ("Lambda-Runtime-Deadline-Ms", "4102444800000".to_string()),
            ("Lambda-Runtime-Invoked-Function-Arn", "arn:aws:lambda:test".to_string()),
        ],
        payload,
    )
        .into_response()
}

fn outcome(request_id: String, headers: &HeaderMap, body: Bytes) -> Outcome {
    Outcome {
        request_id,
        error_type_header: headers
            .get("Lambda-Runtime-Function-Error-Type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    }
}

async fn post_response(
    State(mock): State<Arc<MockRuntime>>,
    Path(request_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    mock.responses
        .lock()
        .unwrap()
        .push(outcome(request_id, &headers, body));
    StatusCode::ACCEPTED
}

async fn post_error(
    State(mock): State<Arc<MockRuntime>>,
    Path(request_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    mock.errors
        .lock()
        .unwrap()
        .push(outcome(request_id, &headers, body));
    StatusCode::ACCEPTED
}

/// Serve a mock runtime API on an ephemeral port.
pub async fn start_mock_runtime() -> (SocketAddr, Arc<MockRuntime>) {
    let mock = Arc::new(MockRuntime::default());
    let router = Router::new()
        .route("/2018-06-01/runtime/invocation/next", get(next_invocation))
        .route("/2018-06-01/runtime/invocation/{id}/response", post(post_response))
        .route("/2018-06-01/runtime/invocation/{id}/error", post(post_error))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    (addr, mock)
}
