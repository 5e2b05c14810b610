//! Platform runtime loop.
//!
//! # Data Flow
//! ```text
//! runtime API  ──next──▶ client.rs (event bytes + invocation headers)
//!                          → ProxyFunction::handle
//!              ◀─response─ serialized proxy response
//!              ◀─error──── adapter error (unhandled invocation failure)
//! ```
//!
//! # Design Decisions
//! - One invocation at a time; the platform never overlaps them per process
//! - Adapter errors are reported, not turned into HTTP responses
//! - Transport errors with the runtime API end the loop
//! - Shutdown is honoured between invocations; one already fetched is always
//!   answered before the loop returns

pub mod client;

use std::future::Future;

use tokio::sync::watch;

use crate::adapter::{Pipeline, ProxyFunction};

pub use client::{Invocation, RuntimeClient, RuntimeError};

/// Outcome of handling one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Response was delivered.
    Responded { request_id: String },
    /// Invocation failed and the error was reported.
    Failed { request_id: String, error_type: String },
}

/// Fetch, handle and answer exactly one invocation.
pub async fn poll_once<P: Pipeline>(
    client: &RuntimeClient,
    function: &ProxyFunction<P>,
) -> Result<PollOutcome, RuntimeError> {
    let invocation = client.next_invocation().await?;
    answer(client, function, invocation).await
}

/// Handle a fetched invocation and post its response or error.
pub async fn answer<P: Pipeline>(
    client: &RuntimeClient,
    function: &ProxyFunction<P>,
    invocation: Invocation,
) -> Result<PollOutcome, RuntimeError> {
    let request_id = invocation.context.request_id.clone();

    match function.handle(&invocation.payload, invocation.context).await {
        Ok(body) => {
            client.send_response(&request_id, body).await?;
            Ok(PollOutcome::Responded { request_id })
        }
        Err(err) => {
            let error_type = err.kind().to_string();
            client.send_error(&request_id, &err).await?;
            Ok(PollOutcome::Failed {
                request_id,
                error_type,
            })
        }
    }
}

/// Serve invocations until Ctrl+C or a runtime API failure.
pub async fn run<P: Pipeline>(
    client: RuntimeClient,
    function: ProxyFunction<P>,
) -> Result<(), RuntimeError> {
    run_until(client, function, shutdown_signal()).await
}

/// Serve invocations until `shutdown` resolves or the runtime API fails.
///
/// Only the wait for the next event is interrupted by shutdown.
pub async fn run_until<P, F>(
    client: RuntimeClient,
    function: ProxyFunction<P>,
    shutdown: F,
) -> Result<(), RuntimeError>
where
    P: Pipeline,
    F: Future<Output = ()> + Send + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown.await;
        let _ = stop_tx.send(true);
    });

    tracing::info!(endpoint = %client.endpoint(), "Runtime loop starting");
    loop {
        if *stop_rx.borrow() {
            break;
        }
        let invocation = tokio::select! {
            _ = stop_rx.changed() => break,
            invocation = client.next_invocation() => invocation?,
        };

        match answer(&client, &function, invocation).await? {
            PollOutcome::Responded { request_id } => {
                tracing::debug!(request_id = %request_id, "Invocation completed");
            }
            PollOutcome::Failed { request_id, error_type } => {
                tracing::warn!(request_id = %request_id, error_type = %error_type, "Invocation failed");
            }
        }
    }

    tracing::info!("Shutdown signal received");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
