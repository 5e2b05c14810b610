//! Adapter error definitions.

use thiserror::Error;

/// Error type produced by downstream pipelines.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that end an invocation.
///
/// None of these are turned into an HTTP response; they surface to the
/// platform as an unhandled invocation failure.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Inbound bytes are not a valid proxy event.
    #[error("malformed proxy event: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// Event parsed but is missing required request data.
    #[error("invalid proxy event: {0}")]
    InvalidEvent(String),

    /// The downstream pipeline failed.
    #[error("pipeline failed handling {path}: {source}")]
    Pipeline {
        path: String,
        #[source]
        source: BoxError,
    },

    /// The proxy response could not be encoded.
    #[error("failed to serialize proxy response: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl AdapterError {
    /// Short machine-readable kind, reported to the platform as the error type.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::Deserialize(_) => "DeserializationError",
            AdapterError::InvalidEvent(_) => "InvalidEventError",
            AdapterError::Pipeline { .. } => "PipelineError",
            AdapterError::Serialize(_) => "SerializationError",
        }
    }
}

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdapterError::InvalidEvent("missing httpMethod".into());
        assert_eq!(err.to_string(), "invalid proxy event: missing httpMethod");

        let err = AdapterError::Pipeline {
            path: "/file".into(),
            source: "boom".into(),
        };
        assert!(err.to_string().contains("/file"));
        assert!(err.to_string().contains("boom"));
        assert_eq!(err.kind(), "PipelineError");
    }

    #[test]
    fn test_pipeline_source_is_preserved() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = AdapterError::Pipeline {
            path: "/x".into(),
            source: Box::new(io),
        };
        let source = err.source().unwrap();
        assert!(source.downcast_ref::<std::io::Error>().is_some());
    }
}
