//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! adapter, runtime, app, storage produce:
//!     → logging.rs (subscriber setup for structured log events)
//!     → metrics.rs (counters and histograms via the metrics facade)
//!
//! Consumers:
//!     → Platform log stream (stdout)
//!     → Any metrics recorder the embedder installs
//! ```
//!
//! # Design Decisions
//! - Every invocation runs in a span carrying the platform request id
//! - Metric updates are no-ops until a recorder is installed
//! - Diagnostic payload logging is opt-in and never alters output

pub mod logging;
pub mod metrics;
