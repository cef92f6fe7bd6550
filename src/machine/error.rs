//! Errors for machine definitions and transitions.

use thiserror::Error;

/// A single problem found while validating a state chart.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefinitionViolation {
    #[error("initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("context not specified. Call .context(value) before .build()")]
    MissingContext,

    #[error("no states declared")]
    NoStates,

    #[error("initial state '{state}' is not declared")]
    UndeclaredInitialState { state: String },

    #[error("transition '{event}' from '{from}' targets undeclared state '{target}'")]
    UndeclaredTarget {
        from: String,
        event: String,
        target: String,
    },

    #[error("final state '{state}' declares outgoing transitions")]
    FinalStateWithTransitions { state: String },
}

/// Errors that can occur when building a machine definition.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("machine '{id}' is invalid: {}", join(.violations))]
    InvalidDefinition {
        id: String,
        violations: Vec<DefinitionViolation>,
    },
}

impl BuildError {
    pub fn violations(&self) -> &[DefinitionViolation] {
        match self {
            Self::InvalidDefinition { violations, .. } => violations,
        }
    }
}

fn join(violations: &[DefinitionViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure reported by a transition action.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by [`Machine::transition`](crate::machine::Machine::transition).
///
/// Guard rejections and unhandled events are not errors; they return
/// `Ok(false)`.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("machine '{machine}' references unregistered guard '{guard}'")]
    UnknownGuard { machine: String, guard: String },

    #[error("machine '{machine}' references unregistered action '{action}'")]
    UnknownAction { machine: String, action: String },

    #[error("action '{action}' failed in machine '{machine}': {source}")]
    ActionFailed {
        machine: String,
        action: String,
        #[source]
        source: ActionError,
    },
}
