//! Runtime API client.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::Serialize;
use thiserror::Error;

use crate::adapter::{AdapterError, InvocationContext};

const API_VERSION: &str = "2018-06-01";

const REQUEST_ID_HEADER: &str = "lambda-runtime-aws-request-id";
const DEADLINE_HEADER: &str = "lambda-runtime-deadline-ms";
const FUNCTION_ARN_HEADER: &str = "lambda-runtime-invoked-function-arn";
const TRACE_ID_HEADER: &str = "lambda-runtime-trace-id";
const ERROR_TYPE_HEADER: &str = "Lambda-Runtime-Function-Error-Type";

/// Errors talking to the runtime API.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("runtime API returned status {0}")]
    Status(u16),

    #[error("invocation is missing the {0} header")]
    MissingHeader(&'static str),

    #[error("runtime API endpoint not configured")]
    NoEndpoint,
}

/// One pending invocation.
#[derive(Debug)]
pub struct Invocation {
    pub payload: Bytes,
    pub context: InvocationContext,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorPayload<'a> {
    error_message: String,
    error_type: &'a str,
}

/// Static function metadata taken from the process environment.
#[derive(Debug, Clone, Default)]
pub struct FunctionMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub memory_limit_mb: Option<u32>,
}

impl FunctionMetadata {
    pub fn from_env() -> Self {
        Self {
            name: std::env::var("AWS_LAMBDA_FUNCTION_NAME").ok(),
            version: std::env::var("AWS_LAMBDA_FUNCTION_VERSION").ok(),
            memory_limit_mb: std::env::var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}

/// HTTP client for the platform runtime API.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    http: reqwest::Client,
    base_url: String,
    metadata: FunctionMetadata,
}

impl RuntimeClient {
    /// Client for a `host:port` endpoint.
    pub fn new(endpoint: &str, metadata: FunctionMetadata) -> Self {
        let base_url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            format!("{}/{}", endpoint.trim_end_matches('/'), API_VERSION)
        } else {
            format!("http://{}/{}", endpoint, API_VERSION)
        };
        Self {
            http: reqwest::Client::new(),
            base_url,
            metadata,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    /// Block until the platform hands over the next event.
    pub async fn next_invocation(&self) -> Result<Invocation, RuntimeError> {
        let response = self
            .http
            .get(format!("{}/runtime/invocation/next", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RuntimeError::Status(response.status().as_u16()));
        }

        let context = self.context_from_headers(response.headers())?;
        let payload = response.bytes().await?;
        Ok(Invocation { payload, context })
    }

    /// Deliver the serialized proxy response.
    pub async fn send_response(&self, request_id: &str, body: Vec<u8>) -> Result<(), RuntimeError> {
        let response = self
            .http
            .post(format!("{}/runtime/invocation/{}/response", self.base_url, request_id))
            .body(body)
            .send()
            .await?;
        ensure_accepted(response.status())
    }

    /// Report an unhandled invocation failure.
    pub async fn send_error(&self, request_id: &str, error: &AdapterError) -> Result<(), RuntimeError> {
        let payload = ErrorPayload {
            error_message: error.to_string(),
            error_type: error.kind(),
        };
        let response = self
            .http
            .post(format!("{}/runtime/invocation/{}/error", self.base_url, request_id))
            .header(ERROR_TYPE_HEADER, "Unhandled")
            .json(&payload)
            .send()
            .await?;
        ensure_accepted(response.status())
    }

    fn context_from_headers(&self, headers: &HeaderMap) -> Result<InvocationContext, RuntimeError> {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let request_id = text(REQUEST_ID_HEADER).ok_or(RuntimeError::MissingHeader(REQUEST_ID_HEADER))?;
        let deadline = text(DEADLINE_HEADER)
            .and_then(|ms| ms.parse::<u64>().ok())
            .map(|ms| UNIX_EPOCH + Duration::from_millis(ms));

        Ok(InvocationContext {
            request_id,
            deadline,
            invoked_function_arn: text(FUNCTION_ARN_HEADER),
            trace_id: text(TRACE_ID_HEADER),
            function_name: self.metadata.name.clone(),
            function_version: self.metadata.version.clone(),
            memory_limit_mb: self.metadata.memory_limit_mb,
        })
    }
}

fn ensure_accepted(status: reqwest::StatusCode) -> Result<(), RuntimeError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(RuntimeError::Status(status.as_u16()))
    }
}

/// Milliseconds since the epoch, as the deadline header encodes them.
pub fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_base_url() {
        let client = RuntimeClient::new("127.0.0.1:9001", FunctionMetadata::default());
        assert_eq!(client.endpoint(), "http://127.0.0.1:9001/2018-06-01");

        let client = RuntimeClient::new("http://localhost:9001/", FunctionMetadata::default());
        assert_eq!(client.endpoint(), "http://localhost:9001/2018-06-01");
    }

    #[test]
    fn test_context_from_headers() {
        let client = RuntimeClient::new(
            "localhost:1",
            FunctionMetadata {
                name: Some("watermark".into()),
                version: Some("$LATEST".into()),
                memory_limit_mb: Some(512),
            },
        );
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-42"));
        headers.insert(DEADLINE_HEADER, HeaderValue::from_static("1700000000000"));
        headers.insert(FUNCTION_ARN_HEADER, HeaderValue::from_static("arn:fn"));

        let ctx = client.context_from_headers(&headers).unwrap();
        assert_eq!(ctx.request_id, "req-42");
        assert_eq!(epoch_millis(ctx.deadline.unwrap()), 1_700_000_000_000);
        assert_eq!(ctx.invoked_function_arn.as_deref(), Some("arn:fn"));
        assert!(ctx.trace_id.is_none());
        assert_eq!(ctx.function_name.as_deref(), Some("watermark"));
        assert_eq!(ctx.memory_limit_mb, Some(512));
    }

    #[test]
    fn test_missing_request_id() {
        let client = RuntimeClient::new("localhost:1", FunctionMetadata::default());
        let err = client.context_from_headers(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, RuntimeError::MissingHeader(_)));
    }
}
