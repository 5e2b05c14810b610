//! Document watermarking collaborator.
//!
//! # Responsibilities
//! - Overlay a text label onto a document as an opaque byte transform
//!
//! # Design Decisions
//! - Transforms are synchronous and CPU-bound; async callers move them off
//!   the runtime threads
//! - Failure is terminal for the calling operation; no partial output

pub mod stamp;

use bytes::Bytes;
use thiserror::Error;

pub use stamp::PdfStamp;

/// Errors raised while watermarking.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// Input is not a document this watermarker understands.
    #[error("unsupported document: {0}")]
    Unsupported(&'static str),

    /// Label cannot be rendered.
    #[error("invalid watermark label: {0}")]
    InvalidLabel(&'static str),
}

/// Byte-in, byte-out watermark transform.
pub trait Watermarker: Send + Sync {
    fn apply(&self, document: Bytes, label: &str) -> Result<Bytes, RenderError>;
}
