//! Outbound response marshalling.
//!
//! # Responsibilities
//! - Collect what the pipeline wrote into a `GenericResponse`
//! - Join multi-value headers into the gateway's single-value map
//! - Decide the body encoding once, after headers are final
//!
//! # Design Decisions
//! - The marshaller takes ownership of the response; it is the last reader
//! - Unset status falls back to the caller-supplied default (200)
//! - Binary-safe bodies are standard Base64 of the exact bytes

use std::collections::BTreeMap;

use axum::http::header::{HeaderMap, CONTENT_TYPE};
use axum::http::StatusCode;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use bytes::{BufMut, Bytes, BytesMut};

use crate::adapter::encoding::{EncodingMode, EncodingPolicy};
use crate::adapter::event::ProxyResponse;
use crate::observability::metrics;

/// Response written by the pipeline.
#[derive(Debug, Default)]
pub struct GenericResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<BytesMut>,
}

impl GenericResponse {
    /// Response with an empty, writable body.
    pub fn new() -> Self {
        Self {
            status: None,
            headers: HeaderMap::new(),
            body: Some(BytesMut::new()),
        }
    }

    /// Response with no body at all.
    pub fn without_body() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Current body contents, if a body exists.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Append bytes to the body, creating it if needed.
    pub fn append(&mut self, chunk: impl AsRef<[u8]>) {
        self.body
            .get_or_insert_with(BytesMut::new)
            .put_slice(chunk.as_ref());
    }

    /// Drop the body so the gateway receives none.
    pub fn clear_body(&mut self) {
        self.body = None;
    }

    /// Split into status, headers and frozen body.
    pub fn into_parts(self) -> (Option<StatusCode>, HeaderMap, Option<Bytes>) {
        (self.status, self.headers, self.body.map(BytesMut::freeze))
    }
}

impl std::io::Write for GenericResponse {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Strategy converting the pipeline's response into the gateway event.
pub trait ResponseMarshaller: Send + Sync {
    fn marshal(
        &self,
        response: GenericResponse,
        policy: &EncodingPolicy,
        default_status: StatusCode,
    ) -> ProxyResponse;
}

/// Standard response-to-event mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResponseMarshaller;

impl ResponseMarshaller for DefaultResponseMarshaller {
    fn marshal(
        &self,
        response: GenericResponse,
        policy: &EncodingPolicy,
        default_status: StatusCode,
    ) -> ProxyResponse {
        let (status, header_map, body) = response.into_parts();
        let status = status.unwrap_or(default_status);

        let headers = join_headers(&header_map);
        // Resolve against the value actually emitted
        let content_type = headers.get(CONTENT_TYPE.as_str()).cloned();

        let Some(body) = body else {
            return ProxyResponse {
                status_code: status.as_u16(),
                headers,
                body: None,
                is_base64_encoded: false,
            };
        };

        let mode = policy.resolve(content_type.as_deref());
        metrics::record_response_encoding(mode);

        let (body, is_base64_encoded) = match mode {
            EncodingMode::BinarySafe => (BASE64_STANDARD.encode(&body), true),
            EncodingMode::Direct => (decode_utf8(body), false),
        };

        ProxyResponse {
            status_code: status.as_u16(),
            headers,
            body: Some(body),
            is_base64_encoded,
        }
    }
}

/// Join every value of each header with `,`.
pub fn join_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()))
                .collect::<Vec<_>>()
                .join(",");
            (name.as_str().to_string(), joined)
        })
        .collect()
}

fn decode_utf8(body: Bytes) -> String {
    match String::from_utf8(body.to_vec()) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(
                valid_up_to = err.utf8_error().valid_up_to(),
                "Response body is not valid UTF-8; replacing invalid sequences"
            );
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    }
}
