//! Metrics collection.
//!
//! # Metrics
//! - `adapter_invocations_total` (counter): invocations by outcome
//! - `adapter_invocation_duration_seconds` (histogram): end-to-end latency
//! - `adapter_response_encoding_total` (counter): bodies by encoding mode
//! - `storage_operations_total` (counter): store calls by operation, result
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; no exporter is bundled
//! - Label values are static strings to keep cardinality bounded

use std::time::Instant;

use crate::adapter::EncodingMode;

/// Record a finished invocation.
pub fn record_invocation(outcome: &'static str, start: Instant) {
    metrics::counter!("adapter_invocations_total", "outcome" => outcome).increment(1);
    metrics::histogram!("adapter_invocation_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// Record the encoding chosen for a response body.
pub fn record_response_encoding(mode: EncodingMode) {
    metrics::counter!("adapter_response_encoding_total", "mode" => mode.as_str()).increment(1);
}

/// Record a storage call.
pub fn record_storage(operation: &'static str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    metrics::counter!("storage_operations_total", "operation" => operation, "result" => result)
        .increment(1);
}
