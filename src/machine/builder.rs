//! Builder for machine definitions.
//!
//! `build` checks the whole chart and reports every problem at once rather
//! than stopping at the first, using stillwater's `Validation`.

use super::definition::{MachineDefinition, StateNode};
use super::error::{BuildError, DefinitionViolation};
use super::event::EventKind;
use crate::core::State;
use std::collections::HashMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<DefinitionViolation>>;

/// Fluent builder for [`MachineDefinition`].
///
/// # Example
///
/// ```rust
/// use flowguard::machine::{MachineDefinition, StateNode};
/// use flowguard::state_enum;
///
/// state_enum! {
///     enum Power {
///         Idle,
///         Running,
///     }
/// }
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum PowerEvent {
///     Start,
///     Stop,
/// }
///
/// let definition = MachineDefinition::builder("power")
///     .initial(Power::Idle)
///     .context(())
///     .state(Power::Idle, StateNode::new().on(PowerEvent::Start, Power::Running))
///     .state(Power::Running, StateNode::new().on(PowerEvent::Stop, Power::Idle))
///     .build()
///     .unwrap();
///
/// assert_eq!(definition.initial(), &Power::Idle);
/// ```
pub struct MachineBuilder<S, E, C> {
    id: String,
    initial: Option<S>,
    context: Option<C>,
    states: HashMap<S, StateNode<S, E>>,
}

impl<S: State, E: EventKind, C> MachineBuilder<S, E, C> {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            initial: None,
            context: None,
            states: HashMap::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the starting context (required; use `()` when none is needed).
    pub fn context(mut self, context: C) -> Self {
        self.context = Some(context);
        self
    }

    /// Declare a state. Declaring the same state twice keeps the later node.
    pub fn state(mut self, state: S, node: StateNode<S, E>) -> Self {
        self.states.insert(state, node);
        self
    }

    pub fn build(self) -> Result<MachineDefinition<S, E, C>, BuildError> {
        let violations = match Validation::all_vec(self.checks()).map(|_| ()) {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        };

        match (self.initial, self.context) {
            (Some(initial), Some(context)) if violations.is_empty() => Ok(MachineDefinition {
                id: self.id,
                initial,
                context,
                states: self.states,
            }),
            _ => Err(BuildError::InvalidDefinition {
                id: self.id,
                violations,
            }),
        }
    }

    fn checks(&self) -> Vec<Check> {
        let mut checks = Vec::new();

        checks.push(match &self.initial {
            None => Validation::fail(DefinitionViolation::MissingInitialState),
            Some(initial) if !self.states.contains_key(initial) => {
                Validation::fail(DefinitionViolation::UndeclaredInitialState {
                    state: initial.name().to_string(),
                })
            }
            Some(_) => Validation::success(()),
        });

        if self.context.is_none() {
            checks.push(Validation::fail(DefinitionViolation::MissingContext));
        }

        if self.states.is_empty() {
            checks.push(Validation::fail(DefinitionViolation::NoStates));
        }

        for (state, node) in &self.states {
            let is_final = node.is_final() || state.is_final();
            if is_final && node.transitions().next().is_some() {
                checks.push(Validation::fail(
                    DefinitionViolation::FinalStateWithTransitions {
                        state: state.name().to_string(),
                    },
                ));
            }

            for (event, spec) in node.transitions() {
                if !self.states.contains_key(&spec.target) {
                    checks.push(Validation::fail(DefinitionViolation::UndeclaredTarget {
                        from: state.name().to_string(),
                        event: format!("{event:?}"),
                        target: spec.target.name().to_string(),
                    }));
                }
            }
        }

        checks
    }
}
