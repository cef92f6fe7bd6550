//! Handler traits consulted by the coordinator.

use super::record::WorkflowError;
use super::strategy::Strategy;
use thiserror::Error;

/// Failure inside a handler. The coordinator logs it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Decides how to recover from errors raised by one workflow.
///
/// Return `Ok(None)` to defer to the next handler in priority order.
pub trait ErrorHandler<Env>: Send + Sync {
    fn handle(&self, error: &WorkflowError) -> Result<Option<Strategy<Env>>, HandlerError>;

    /// Label used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<Env, F> ErrorHandler<Env> for F
where
    F: Fn(&WorkflowError) -> Result<Option<Strategy<Env>>, HandlerError> + Send + Sync,
{
    fn handle(&self, error: &WorkflowError) -> Result<Option<Strategy<Env>>, HandlerError> {
        self(error)
    }
}

/// Observes every error that is cascaded across workflows.
pub trait CascadeHandler: Send + Sync {
    fn on_cascade(&self, error: &WorkflowError) -> Result<(), HandlerError>;
}

impl<F> CascadeHandler for F
where
    F: Fn(&WorkflowError) -> Result<(), HandlerError> + Send + Sync,
{
    fn on_cascade(&self, error: &WorkflowError) -> Result<(), HandlerError> {
        self(error)
    }
}
