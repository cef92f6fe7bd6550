//! Declarative state charts.

use super::builder::MachineBuilder;
use super::event::EventKind;
use crate::core::State;
use std::collections::HashMap;

/// Where an event leads, and what must hold and happen on the way.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionSpec<S> {
    pub target: S,
    /// Guard names, evaluated in order; all must pass
    pub guards: Vec<String>,
    /// Action names, awaited in order before the state changes
    pub actions: Vec<String>,
}

impl<S> TransitionSpec<S> {
    pub fn to(target: S) -> Self {
        Self {
            target,
            guards: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn guard(mut self, name: impl Into<String>) -> Self {
        self.guards.push(name.into());
        self
    }

    pub fn action(mut self, name: impl Into<String>) -> Self {
        self.actions.push(name.into());
        self
    }
}

/// A bare target is shorthand for an unguarded transition without actions.
impl<S> From<S> for TransitionSpec<S> {
    fn from(target: S) -> Self {
        Self::to(target)
    }
}

/// Configuration of one state: whether it is final, and its outgoing events.
#[derive(Clone, Debug)]
pub struct StateNode<S, E> {
    final_state: bool,
    on: HashMap<E, TransitionSpec<S>>,
}

impl<S, E> Default for StateNode<S, E> {
    fn default() -> Self {
        Self {
            final_state: false,
            on: HashMap::new(),
        }
    }
}

impl<S, E: EventKind> StateNode<S, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A terminal state. It must not declare transitions.
    pub fn final_state() -> Self {
        Self {
            final_state: true,
            on: HashMap::new(),
        }
    }

    /// Handle `event` with the given transition. Redeclaring an event
    /// replaces the earlier transition.
    pub fn on(mut self, event: E, transition: impl Into<TransitionSpec<S>>) -> Self {
        self.on.insert(event, transition.into());
        self
    }

    pub fn is_final(&self) -> bool {
        self.final_state
    }

    pub fn transition_for(&self, event: &E) -> Option<&TransitionSpec<S>> {
        self.on.get(event)
    }

    pub fn transitions(&self) -> impl Iterator<Item = (&E, &TransitionSpec<S>)> {
        self.on.iter()
    }
}

/// Immutable description of a machine: its states, initial state and
/// starting context. Produced by [`MachineBuilder::build`], which
/// guarantees every referenced state is declared.
#[derive(Debug)]
pub struct MachineDefinition<S, E, C> {
    pub(crate) id: String,
    pub(crate) initial: S,
    pub(crate) context: C,
    pub(crate) states: HashMap<S, StateNode<S, E>>,
}

impl<S: State, E: EventKind, C> MachineDefinition<S, E, C> {
    pub fn builder(id: impl Into<String>) -> MachineBuilder<S, E, C> {
        MachineBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn initial(&self) -> &S {
        &self.initial
    }

    pub fn node(&self, state: &S) -> Option<&StateNode<S, E>> {
        self.states.get(state)
    }

    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.states.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Ev {
        Go,
        Stop,
    }

    #[test]
    fn bare_target_is_shorthand() {
        let spec: TransitionSpec<&str> = "running".into();
        assert_eq!(spec, TransitionSpec::to("running"));
        assert!(spec.guards.is_empty());
        assert!(spec.actions.is_empty());
    }

    #[test]
    fn spec_keeps_declaration_order() {
        let spec = TransitionSpec::to("published")
            .guard("has_title")
            .guard("has_body")
            .action("stamp")
            .action("notify");

        assert_eq!(spec.guards, vec!["has_title", "has_body"]);
        assert_eq!(spec.actions, vec!["stamp", "notify"]);
    }

    #[test]
    fn node_looks_up_events() {
        let node: StateNode<&str, Ev> = StateNode::new()
            .on(Ev::Go, "running")
            .on(Ev::Go, TransitionSpec::to("sprinting").guard("fit"));

        let spec = node.transition_for(&Ev::Go).unwrap();
        assert_eq!(spec.target, "sprinting");
        assert!(node.transition_for(&Ev::Stop).is_none());
        assert_eq!(node.transitions().count(), 1);
        assert!(!node.is_final());
    }

    #[test]
    fn final_node_has_no_transitions() {
        let node: StateNode<&str, Ev> = StateNode::final_state();
        assert!(node.is_final());
        assert_eq!(node.transitions().count(), 0);
    }
}
