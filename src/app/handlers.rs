//! Request handlers for stored documents.
//!
//! # Routes
//! - `GET /files/{*key}?label=` fetch, watermarking PDFs on the way out
//! - `PUT /files/{*key}` store the request body
//! - `DELETE /files/{*key}` remove an object
//! - `POST /copies` store a watermarked copy and report where it lives

use std::path::Path as FsPath;

use axum::extract::{Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::adapter::RequestExt;
use crate::app::error::AppError;
use crate::app::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LabelQuery {
    pub label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CopyRequest {
    /// Source object key.
    pub key: String,
    pub label: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CopyResponse {
    /// Key of the stored copy.
    pub key: String,
    /// Public location of the stored copy.
    pub location: String,
}

fn extension(key: &str) -> Option<&str> {
    FsPath::new(key).extension().and_then(|ext| ext.to_str())
}

fn is_pdf(key: &str) -> bool {
    extension(key).is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn content_type_for(key: &str) -> &'static str {
    if is_pdf(key) {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

/// Keep a label usable inside an object key.
fn key_safe(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Fetch `key` and watermark it when it is a PDF.
async fn load_marked(state: &AppState, key: &str, label: &str) -> Result<Bytes, AppError> {
    let document = state.store.get(key).await?;
    if !is_pdf(key) {
        return Ok(document);
    }
    let watermarker = state.watermarker.clone();
    let label = label.to_string();
    let marked = tokio::task::spawn_blocking(move || watermarker.apply(document, &label)).await??;
    Ok(marked)
}

pub async fn get_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<LabelQuery>,
    request: Request,
) -> Result<Response, AppError> {
    let request_id = request
        .invocation_context()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();
    let label = query
        .label
        .unwrap_or_else(|| state.watermark.default_label.clone());

    tracing::info!(request_id = %request_id, key = %key, label = %label, "Serving document");
    let body = load_marked(&state, &key, &label).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type_for(&key))],
        body,
    )
        .into_response())
}

pub async fn put_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    tracing::info!(key = %key, bytes = body.len(), "Storing document");
    state.store.put(&key, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, AppError> {
    tracing::info!(key = %key, "Deleting document");
    state.store.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_copy(
    State(state): State<AppState>,
    Json(copy): Json<CopyRequest>,
) -> Result<(StatusCode, Json<CopyResponse>), AppError> {
    let label = copy
        .label
        .unwrap_or_else(|| state.watermark.default_label.clone());
    let body = load_marked(&state, &copy.key, &label).await?;

    let mut key = format!(
        "{}/{}{}",
        state.watermark.output_prefix.trim_end_matches('/'),
        key_safe(&label),
        uuid::Uuid::new_v4()
    );
    if let Some(ext) = extension(&copy.key) {
        key.push('.');
        key.push_str(ext);
    }
    state.store.put(&key, body).await?;

    let location = format!(
        "{}/{}",
        state.watermark.public_base_url.trim_end_matches('/'),
        key
    );
    tracing::info!(source = %copy.key, copy = %key, "Stored watermarked copy");
    Ok((StatusCode::CREATED, Json(CopyResponse { key, location })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a/b.pdf"), "application/pdf");
        assert_eq!(content_type_for("B.PDF"), "application/pdf");
        assert_eq!(content_type_for("sheet.xlsx"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_key_safe() {
        assert_eq!(key_safe("top secret/v1.2"), "top_secret_v1_2");
        assert_eq!(key_safe("机密"), "机密");
    }
}
