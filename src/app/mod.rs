//! Watermarking application served behind the gateway adapter.
//!
//! # Data Flow
//! ```text
//! GenericRequest (via ServicePipeline)
//!     → server.rs (Axum router, trace layer)
//!     → handlers.rs (fetch / store / delete / copy)
//!     → storage (ObjectStore) + render (Watermarker)
//!     → http::Response written back onto the GenericResponse
//! ```
//!
//! # Design Decisions
//! - Collaborator failures become HTTP error statuses here, inside the
//!   pipeline, so the adapter only ever sees genuine pipeline faults
//! - Error bodies never carry internal detail

pub mod error;
pub mod handlers;
pub mod server;

pub use error::AppError;
pub use server::{build_router, AppState};
