use super::record::{ErrorType, Severity, Workflow, WorkflowError};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts over the retained error history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorStatistics {
    pub total: usize,
    pub by_workflow: BTreeMap<Workflow, usize>,
    pub by_type: BTreeMap<ErrorType, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
}

impl ErrorStatistics {
    pub fn from_errors<'a>(errors: impl IntoIterator<Item = &'a WorkflowError>) -> Self {
        errors
            .into_iter()
            .fold(Self::default(), |mut stats, error| {
                stats.total += 1;
                *stats.by_workflow.entry(error.workflow).or_default() += 1;
                *stats.by_type.entry(error.error_type).or_default() += 1;
                *stats.by_severity.entry(error.severity).or_default() += 1;
                stats
            })
    }
}
