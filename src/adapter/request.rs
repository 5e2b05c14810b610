//! Inbound request marshalling.
//!
//! # Responsibilities
//! - Convert a `ProxyRequest` into a `GenericRequest`
//! - Split combined header values back into discrete values
//! - Rebuild the query string from the parameter map
//!
//! # Design Decisions
//! - Scheme is always `http`; the event carries no scheme. Callers that need
//!   HTTPS semantics transport it in a header and supply their own marshaller
//! - Header entries that are not valid HTTP are skipped, never fatal
//! - The body buffer is owned by the request and always read from offset 0

use std::collections::BTreeMap;
use std::io::Cursor;

use axum::http::header::{HeaderMap, HeaderName, HeaderValue};
use axum::http::uri::Scheme;
use axum::http::Method;
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::adapter::error::{AdapterError, AdapterResult};
use crate::adapter::event::ProxyRequest;

/// Characters left unescaped in query keys and values (RFC 3986 unreserved).
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Transport-neutral HTTP request handed to the pipeline.
#[derive(Debug, Clone)]
pub struct GenericRequest {
    pub scheme: Scheme,
    pub method: Method,
    pub path: String,
    /// Encoded query string without the leading `?`; empty when absent.
    pub query_string: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl GenericRequest {
    /// A reader over the body positioned at offset 0.
    pub fn body_reader(&self) -> Cursor<Bytes> {
        Cursor::new(self.body.clone())
    }

    /// Path plus `?query` when a query string exists.
    pub fn path_and_query(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }
}

/// Strategy converting the inbound event into a generic request.
pub trait RequestMarshaller: Send + Sync {
    /// Build the request. Fails only on structurally invalid events.
    fn marshal(&self, request: &ProxyRequest) -> AdapterResult<GenericRequest>;
}

/// Standard event-to-request mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRequestMarshaller;

impl RequestMarshaller for DefaultRequestMarshaller {
    fn marshal(&self, request: &ProxyRequest) -> AdapterResult<GenericRequest> {
        let method = Method::from_bytes(request.http_method.as_bytes()).map_err(|_| {
            AdapterError::InvalidEvent(format!("invalid httpMethod {:?}", request.http_method))
        })?;

        let body = request
            .body
            .as_ref()
            .map(|body| Bytes::copy_from_slice(body.as_bytes()))
            .unwrap_or_default();

        Ok(GenericRequest {
            scheme: Scheme::HTTP,
            method,
            path: request.path.clone(),
            query_string: encode_query(request.query_string_parameters.as_ref()),
            headers: split_headers(request.headers.as_ref()),
            body,
        })
    }
}

/// Split each combined header value on `,` into discrete values.
pub fn split_headers(headers: Option<&BTreeMap<String, String>>) -> HeaderMap {
    let mut map = HeaderMap::new();
    let Some(headers) = headers else {
        return map;
    };

    for (name, combined) in headers {
        let header_name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(header_name) => header_name,
            Err(_) => {
                tracing::warn!(header = %name, "Skipping header with invalid name");
                continue;
            }
        };
        for part in combined.split(',') {
            match HeaderValue::from_str(part.trim()) {
                Ok(value) => {
                    map.append(header_name.clone(), value);
                }
                Err(_) => {
                    tracing::warn!(header = %name, "Skipping header value with invalid characters");
                }
            }
        }
    }
    map
}

/// Percent-encode each pair and join them with `&`.
pub fn encode_query(params: Option<&BTreeMap<String, String>>) -> String {
    let Some(params) = params else {
        return String::new();
    };
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_COMPONENT),
                utf8_percent_encode(value, QUERY_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
