use super::record::Workflow;
use super::strategy::RecoveryError;
use thiserror::Error;

/// Errors raised while executing a recovery strategy.
///
/// Only [`CoordinatorError::RetriesExhausted`] escapes
/// [`ErrorCoordinator::handle_error`](super::ErrorCoordinator::handle_error);
/// cascade rejections are reported to the monitoring sink instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinatorError {
    #[error("max retries exceeded for {workflow}/{operation} after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        workflow: Workflow,
        operation: String,
        attempts: u32,
        #[source]
        source: RecoveryError,
    },

    #[error("{strategy} action failed for {workflow}/{operation}: {source}")]
    ActionFailed {
        strategy: &'static str,
        workflow: Workflow,
        operation: String,
        #[source]
        source: RecoveryError,
    },

    #[error("cascade from {origin} into {target} revisits a workflow already in {chain:?}")]
    CascadeCycle {
        origin: Workflow,
        target: Workflow,
        chain: Vec<Workflow>,
    },

    #[error("cascade into {target} would be hop {hop}, limit is {limit}")]
    CascadeDepthExceeded {
        target: Workflow,
        hop: usize,
        limit: usize,
    },
}
