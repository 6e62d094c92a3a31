//! Shared utilities for use cases.
//!
//! Cancellation checking and the guarded agent call that every fan-out goes
//! through, so each phase normalizes failures the same way.

use crate::ports::agent_adapter::AgentError;
use crate::use_cases::orchestrate::types::PhaseFailure;
use conclave_domain::{AgentId, AgentResponse, Proposal, ResponseKind};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(PhaseFailure::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), PhaseFailure> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(PhaseFailure::Cancelled);
    }
    Ok(())
}

/// Run one adapter call under the per-call timeout, turning a panic inside
/// the adapter into [`AgentError::Internal`].
pub(crate) async fn guarded_call<T, F>(timeout: Duration, call: F) -> Result<T, AgentError>
where
    F: Future<Output = Result<T, AgentError>>,
{
    match tokio::time::timeout(timeout, AssertUnwindSafe(call).catch_unwind()).await {
        Ok(Ok(result)) => result,
        Ok(Err(panic)) => Err(AgentError::Internal(panic_message(panic.as_ref()))),
        Err(_) => Err(AgentError::Timeout(timeout.as_millis())),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("agent panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("agent panicked: {msg}")
    } else {
        "agent panicked".to_string()
    }
}

/// Normalize an analysis or feedback call into a record attributed to `agent`.
pub(crate) fn normalize_response(
    agent: &AgentId,
    kind: ResponseKind,
    result: Result<AgentResponse, AgentError>,
) -> AgentResponse {
    match result {
        Ok(response) => {
            let mut response = response.attributed_to(agent);
            response.kind = kind;
            response
        }
        Err(e) => AgentResponse::failure(agent.clone(), kind, e.to_string()),
    }
}

/// Normalize a proposal call into a record attributed to `agent`.
pub(crate) fn normalize_proposal(
    agent: &AgentId,
    result: Result<Proposal, AgentError>,
) -> Proposal {
    match result {
        Ok(proposal) => proposal.attributed_to(agent),
        Err(e) => Proposal::failure(agent.clone(), e.to_string()),
    }
}

/// Text carried by an `agent_message` event.
pub(crate) fn describe_response(response: &AgentResponse) -> String {
    match &response.error {
        Some(error) => format!("{} failed: {}", response.kind.as_str(), error),
        None => format!(
            "{} ({}): {}",
            response.kind.as_str(),
            response.confidence,
            response.content
        ),
    }
}
