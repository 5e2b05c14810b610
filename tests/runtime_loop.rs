//! Runtime loop against a mock runtime API.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use watermark_gateway::adapter::{BoxError, ExecutionContext, Pipeline, ProxyFunction};
use watermark_gateway::runtime::client::FunctionMetadata;
use watermark_gateway::runtime::{poll_once, run_until, PollOutcome, RuntimeClient, RuntimeError};
use watermark_gateway::storage::{MemoryStore, ObjectStore};

mod common;

use common::{app_function, start_mock_runtime, SAMPLE_PDF};

#[tokio::test]
async fn test_poll_once_posts_response() {
    let (addr, mock) = start_mock_runtime().await;
    let store = MemoryStore::new();
    store
        .put("a.pdf", Bytes::from_static(SAMPLE_PDF))
        .await
        .unwrap();
    let function = app_function(store);
    let client = RuntimeClient::new(&addr.to_string(), FunctionMetadata::default());

    let event = json!({
        "httpMethod": "GET",
        "path": "/files/a.pdf",
        "requestContext": { "requestId": "gw-1" }
    });
    mock.enqueue("req-1", event.to_string());

    let outcome = poll_once(&client, &function).await.unwrap();
    assert_eq!(
        outcome,
        PollOutcome::Responded {
            request_id: "req-1".to_string()
        }
    );

    let responses = mock.responses.lock().unwrap().clone();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].request_id, "req-1");

    let value: Value = serde_json::from_slice(&responses[0].body).unwrap();
    assert_eq!(value["statusCode"], 200);
    let body = BASE64_STANDARD
        .decode(value["body"].as_str().unwrap())
        .unwrap();
    assert!(body.starts_with(SAMPLE_PDF));
    assert!(body.ends_with(b"%Watermark: CONFIDENTIAL\n"));
    assert!(mock.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_poll_once_reports_invalid_event() {
    let (addr, mock) = start_mock_runtime().await;
    let function = app_function(MemoryStore::new());
    let client = RuntimeClient::new(&addr.to_string(), FunctionMetadata::default());

    mock.enqueue("req-2", "{\"path\": \"/files/a.pdf\"}");

    let outcome = poll_once(&client, &function).await.unwrap();
    assert_eq!(
        outcome,
        PollOutcome::Failed {
            request_id: "req-2".to_string(),
            error_type: "DeserializationError".to_string(),
        }
    );

    let errors = mock.errors.lock().unwrap().clone();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].request_id, "req-2");
    assert_eq!(errors[0].error_type_header.as_deref(), Some("Unhandled"));

    let payload: Value = serde_json::from_slice(&errors[0].body).unwrap();
    assert_eq!(payload["errorType"], "DeserializationError");
    assert!(payload["errorMessage"].as_str().unwrap().len() > 0);
    assert!(mock.responses.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_handles_invocations_in_order() {
    let (addr, mock) = start_mock_runtime().await;
    let function = app_function(MemoryStore::new());
    let client = RuntimeClient::new(&addr.to_string(), FunctionMetadata::default());

    for id in ["r-1", "r-2", "r-3"] {
        let event = json!({ "httpMethod": "GET", "path": format!("/files/{id}.pdf") });
        mock.enqueue(id, event.to_string());
    }
    for _ in 0..3 {
        poll_once(&client, &function).await.unwrap();
    }

    let ids: Vec<String> = mock
        .responses
        .lock()
        .unwrap()
        .iter()
        .map(|outcome| outcome.request_id.clone())
        .collect();
    assert_eq!(ids, ["r-1", "r-2", "r-3"]);
}

#[tokio::test]
async fn test_runtime_api_failure_is_an_error() {
    let (addr, _mock) = start_mock_runtime().await;
    let function = app_function(MemoryStore::new());
    let client = RuntimeClient::new(&addr.to_string(), FunctionMetadata::default());

    let err = poll_once(&client, &function).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Status(503)));
}

/// Fires the shutdown trigger while it is handling a request.
struct ShutdownMidway {
    trigger: Mutex<Option<oneshot::Sender<()>>>,
}

#[async_trait]
impl Pipeline for ShutdownMidway {
    async fn invoke(&self, ctx: &mut ExecutionContext) -> Result<(), BoxError> {
        if let Some(trigger) = self.trigger.lock().unwrap().take() {
            let _ = trigger.send(());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        ctx.response.append("finished");
        Ok(())
    }
}

#[tokio::test]
async fn test_shutdown_lets_in_flight_invocation_finish() {
    let (addr, mock) = start_mock_runtime().await;
    let (trigger, shutdown) = oneshot::channel();
    let function = ProxyFunction::builder(ShutdownMidway {
        trigger: Mutex::new(Some(trigger)),
    })
    .build();
    let client = RuntimeClient::new(&addr.to_string(), FunctionMetadata::default());

    mock.enqueue("req-live", json!({ "httpMethod": "GET", "path": "/" }).to_string());
    mock.enqueue("req-after", json!({ "httpMethod": "GET", "path": "/" }).to_string());

    tokio::time::timeout(
        Duration::from_secs(5),
        run_until(client, function, async move {
            let _ = shutdown.await;
        }),
    )
    .await
    .unwrap()
    .unwrap();

    let responses = mock.responses.lock().unwrap().clone();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].request_id, "req-live");
    let value: Value = serde_json::from_slice(&responses[0].body).unwrap();
    assert_eq!(
        BASE64_STANDARD.decode(value["body"].as_str().unwrap()).unwrap(),
        b"finished"
    );
    assert!(mock.errors.lock().unwrap().is_empty());
}
