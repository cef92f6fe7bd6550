//! Error records exchanged between workflows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Back-office workflow an error originates from or cascades into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    Inventory,
    Marketing,
    Executive,
    Role,
}

impl Workflow {
    pub const ALL: [Workflow; 4] = [
        Workflow::Inventory,
        Workflow::Marketing,
        Workflow::Executive,
        Workflow::Role,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Workflow::Inventory => "inventory",
            Workflow::Marketing => "marketing",
            Workflow::Executive => "executive",
            Workflow::Role => "role",
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Validation,
    Permission,
    Network,
    Business,
    System,
}

impl ErrorType {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorType::Validation => "validation",
            ErrorType::Permission => "permission",
            ErrorType::Network => "network",
            ErrorType::Business => "business",
            ErrorType::System => "system",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How urgently an error needs attention. Ordered most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by one workflow.
///
/// `related_workflows` names workflows that should also hear about the
/// failure when it is cascaded. `caused_by` is set on errors derived from
/// another error during a cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowError {
    pub id: Uuid,
    pub workflow: Workflow,
    pub operation: String,
    pub error_type: ErrorType,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub context: Value,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_workflows: Vec<Workflow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caused_by: Option<Uuid>,
}

impl WorkflowError {
    pub fn new(
        workflow: Workflow,
        operation: impl Into<String>,
        error_type: ErrorType,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workflow,
            operation: operation.into(),
            error_type,
            severity,
            message: message.into(),
            code: None,
            context: Value::Null,
            timestamp: Utc::now(),
            related_workflows: Vec::new(),
            caused_by: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    pub fn with_related_workflows(mut self, related: impl IntoIterator<Item = Workflow>) -> Self {
        self.related_workflows = related.into_iter().collect();
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Derive the error `target` receives when this one cascades into it.
    ///
    /// The derived error keeps the payload (type, severity, message, code,
    /// context and related workflows), gets a fresh id and timestamp, and
    /// points back at `self`.
    pub fn cascade_to(&self, target: Workflow) -> WorkflowError {
        WorkflowError {
            id: Uuid::new_v4(),
            workflow: target,
            operation: format!("cascade-from-{}", self.workflow),
            error_type: self.error_type,
            severity: self.severity,
            message: self.message.clone(),
            code: self.code.clone(),
            context: self.context.clone(),
            timestamp: Utc::now(),
            related_workflows: self.related_workflows.clone(),
            caused_by: Some(self.id),
        }
    }

    pub fn is_cascaded(&self) -> bool {
        self.caused_by.is_some()
    }
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {} {} error: {}",
            self.workflow, self.operation, self.severity, self.error_type, self.message
        )?;
        if let Some(code) = &self.code {
            write!(f, " ({code})")?;
        }
        Ok(())
    }
}
