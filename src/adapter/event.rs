//! Gateway proxy event envelope.
//!
//! Field names follow the gateway's camelCase JSON. Absent and `null`
//! maps deserialize to `None`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::adapter::error::{AdapterError, AdapterResult};

/// Inbound HTTP-proxy invocation event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    pub http_method: String,

    /// Request path; always starts with `/` once validated.
    pub path: String,

    /// API resource template that matched (e.g. `/files/{proxy+}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    #[serde(default)]
    pub query_string_parameters: Option<BTreeMap<String, String>>,

    /// Single combined value per header name.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_parameters: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_variables: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub request_context: RequestContext,
}

/// Gateway request metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub request_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,
}

impl ProxyRequest {
    /// Deserialize and structurally check a raw event.
    pub fn from_slice(raw: &[u8]) -> AdapterResult<Self> {
        let request: ProxyRequest = serde_json::from_slice(raw).map_err(AdapterError::Deserialize)?;
        request.validate()?;
        Ok(request)
    }

    /// Reject events the marshaller cannot represent.
    pub fn validate(&self) -> AdapterResult<()> {
        if self.http_method.is_empty() {
            return Err(AdapterError::InvalidEvent("missing httpMethod".into()));
        }
        if !self.path.starts_with('/') {
            return Err(AdapterError::InvalidEvent(format!(
                "path must start with '/': {:?}",
                self.path
            )));
        }
        Ok(())
    }

    /// Case-insensitive lookup of a single-value header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    /// Gateway request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_context.request_id
    }
}

/// Outbound event returned to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,

    /// Single combined value per header name.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// `true` when `body` is Base64 text.
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl ProxyResponse {
    /// Serialize to the gateway wire format.
    pub fn to_vec(&self) -> AdapterResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(AdapterError::Serialize)
    }

    /// Case-insensitive lookup of a response header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
