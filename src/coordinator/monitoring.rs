//! Monitoring hooks for coordinated errors.

use super::error::CoordinatorError;
use super::record::{Severity, WorkflowError};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("monitoring sink failed: {0}")]
pub struct SinkError(pub String);

/// Receives every error the coordinator handles.
///
/// Sink failures are logged and never block recovery.
pub trait MonitoringSink: Send + Sync {
    fn record_error(&self, error: &WorkflowError) -> Result<(), SinkError>;

    /// Called when a cascade target is skipped because of a cycle or the
    /// depth limit.
    fn record_cascade_rejected(
        &self,
        error: &WorkflowError,
        reason: &CoordinatorError,
    ) -> Result<(), SinkError> {
        let _ = (error, reason);
        Ok(())
    }
}

/// Default sink: emits structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl MonitoringSink for TracingSink {
    fn record_error(&self, e: &WorkflowError) -> Result<(), SinkError> {
        match e.severity {
            Severity::Critical | Severity::High => error!(
                error_id = %e.id,
                workflow = %e.workflow,
                operation = %e.operation,
                error_type = %e.error_type,
                severity = %e.severity,
                code = e.code.as_deref(),
                cascaded = e.is_cascaded(),
                message = %e.message,
                "workflow error recorded"
            ),
            Severity::Medium => warn!(
                error_id = %e.id,
                workflow = %e.workflow,
                operation = %e.operation,
                error_type = %e.error_type,
                code = e.code.as_deref(),
                cascaded = e.is_cascaded(),
                message = %e.message,
                "workflow error recorded"
            ),
            Severity::Low => info!(
                error_id = %e.id,
                workflow = %e.workflow,
                operation = %e.operation,
                error_type = %e.error_type,
                code = e.code.as_deref(),
                message = %e.message,
                "workflow error recorded"
            ),
        }
        Ok(())
    }

    fn record_cascade_rejected(
        &self,
        e: &WorkflowError,
        reason: &CoordinatorError,
    ) -> Result<(), SinkError> {
        warn!(
            error_id = %e.id,
            workflow = %e.workflow,
            reason = %reason,
            "cascade rejected"
        );
        Ok(())
    }
}
