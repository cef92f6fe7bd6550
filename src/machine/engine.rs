//! Machine instances that execute transitions over a state chart.

use super::action::{Action, FnAction};
use super::definition::{MachineDefinition, StateNode};
use super::error::{ActionError, MachineError};
use super::event::{Event, EventKind};
use crate::core::{BoundedHistory, Guard, State, StateTransition};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A single entity driven through a state chart.
///
/// Guards and actions are registered by name after construction; the chart
/// refers to them by those names. `transition` takes `&mut self`, so one
/// caller at a time drives a given instance.
pub struct Machine<S: State, E: EventKind, C> {
    id: String,
    current: S,
    context: C,
    states: HashMap<S, StateNode<S, E>>,
    guards: HashMap<String, Guard<C, E>>,
    actions: HashMap<String, Arc<dyn Action<S, C, E>>>,
    history: BoundedHistory<StateTransition<S>>,
}

/// Create a machine positioned at the definition's initial state.
pub fn create_machine<S, E, C>(definition: MachineDefinition<S, E, C>) -> Machine<S, E, C>
where
    S: State,
    E: EventKind,
    C: Send + 'static,
{
    Machine::new(definition)
}

impl<S, E, C> Machine<S, E, C>
where
    S: State,
    E: EventKind,
    C: Send + 'static,
{
    pub fn new(definition: MachineDefinition<S, E, C>) -> Self {
        let MachineDefinition {
            id,
            initial,
            context,
            states,
        } = definition;

        Self {
            id,
            current: initial,
            context,
            states,
            guards: HashMap::new(),
            actions: HashMap::new(),
            history: BoundedHistory::default(),
        }
    }

    /// Register (or replace) the guard known as `name`.
    pub fn register_guard<F>(&mut self, name: impl Into<String>, predicate: F) -> &mut Self
    where
        F: Fn(&C, &Event<E>) -> bool + Send + Sync + 'static,
    {
        self.guards.insert(name.into(), Guard::new(predicate));
        self
    }

    /// Register (or replace) the action known as `name`.
    pub fn register_action<A>(&mut self, name: impl Into<String>, action: A) -> &mut Self
    where
        A: Action<S, C, E> + 'static,
    {
        self.actions.insert(name.into(), Arc::new(action));
        self
    }

    /// Register a synchronous closure as the action known as `name`.
    pub fn register_fn_action<F>(&mut self, name: impl Into<String>, action: F) -> &mut Self
    where
        F: Fn(&mut C, &Event<E>) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.register_action(name, FnAction(action))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &S {
        &self.current
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn history(&self) -> &BoundedHistory<StateTransition<S>> {
        &self.history
    }

    pub fn is_final(&self) -> bool {
        self.current.is_final() || self.current_node().is_some_and(StateNode::is_final)
    }

    /// Whether the current state declares a handler for `kind`.
    ///
    /// Guards are not evaluated, so `transition` may still return `false`.
    /// See [`can_fire`](Self::can_fire) for a check that includes them.
    pub fn can(&self, kind: &E) -> bool {
        self.current_node()
            .is_some_and(|node| node.transition_for(kind).is_some())
    }

    /// Like [`can`](Self::can), but also evaluates the transition's guards
    /// against an event without payload. Unregistered guards count as
    /// rejecting.
    pub fn can_fire(&self, kind: &E) -> bool {
        let Some(spec) = self
            .current_node()
            .and_then(|node| node.transition_for(kind))
        else {
            return false;
        };

        let event = Event::new(kind.clone());
        spec.guards.iter().all(|name| {
            self.guards
                .get(name)
                .is_some_and(|guard| guard.check(&self.context, &event))
        })
    }

    /// Deliver an event without payload.
    pub async fn transition(&mut self, kind: E) -> Result<bool, MachineError> {
        self.transition_with(kind, Value::Null).await
    }

    /// Deliver an event carrying `payload`.
    ///
    /// Returns `Ok(false)` with nothing changed when the current state does
    /// not handle the event or a guard rejects it. Otherwise runs the
    /// actions in order and commits the target state.
    pub async fn transition_with(&mut self, kind: E, payload: Value) -> Result<bool, MachineError> {
        let Some(spec) = self
            .current_node()
            .and_then(|node| node.transition_for(&kind))
            .cloned()
        else {
            debug!(
                machine = %self.id,
                state = self.current.name(),
                event = ?kind,
                "event not handled in current state"
            );
            return Ok(false);
        };

        let event = Event::with_payload(kind, payload);

        for name in &spec.guards {
            let guard = self
                .guards
                .get(name)
                .ok_or_else(|| MachineError::UnknownGuard {
                    machine: self.id.clone(),
                    guard: name.clone(),
                })?;
            if !guard.check(&self.context, &event) {
                debug!(
                    machine = %self.id,
                    state = self.current.name(),
                    event = ?event.kind,
                    guard = %name,
                    "guard rejected transition"
                );
                return Ok(false);
            }
        }

        // Resolve every action before running any of them.
        let actions = spec
            .actions
            .iter()
            .map(|name| {
                self.actions
                    .get(name)
                    .map(|action| (name, Arc::clone(action)))
                    .ok_or_else(|| MachineError::UnknownAction {
                        machine: self.id.clone(),
                        action: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (name, action) in actions {
            if let Err(source) = action
                .execute(&self.current, &mut self.context, &event)
                .await
            {
                warn!(
                    machine = %self.id,
                    state = self.current.name(),
                    action = %name,
                    error = %source,
                    "transition action failed"
                );
                return Err(MachineError::ActionFailed {
                    machine: self.id.clone(),
                    action: name.clone(),
                    source,
                });
            }
        }

        let from = std::mem::replace(&mut self.current, spec.target);
        info!(
            machine = %self.id,
            from = from.name(),
            to = self.current.name(),
            event = ?event.kind,
            "transition committed"
        );
        self.history.push(StateTransition::new(
            from,
            self.current.clone(),
            Some(format!("{:?}", event.kind)),
        ));
        Ok(true)
    }

    fn current_node(&self) -> Option<&StateNode<S, E>> {
        self.states.get(&self.current)
    }
}

impl<S, E, C> Machine<S, E, C>
where
    S: State,
    E: EventKind,
    C: Clone + Send + 'static,
{
    /// Like [`transition_with`](Self::transition_with), but restores the
    /// context to its pre-transition value when an action fails.
    pub async fn transition_atomic(
        &mut self,
        kind: E,
        payload: Value,
    ) -> Result<bool, MachineError> {
        let snapshot = self.context.clone();
        let result = self.transition_with(kind, payload).await;
        if result.is_err() {
            self.context = snapshot;
        }
        result
    }
}
