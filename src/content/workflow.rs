//! State machine for the content publication workflow.

use super::state::ContentState;
use crate::core::{BoundedHistory, State, StateTransition};
use crate::machine::ActionError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the content workflow.
#[derive(Debug, Error)]
pub enum ContentWorkflowError {
    #[error("content cannot move from {from:?} to {to:?}")]
    UnsupportedTransition { from: ContentState, to: ContentState },

    #[error("action for {from:?} -> {to:?} failed: {source}")]
    ActionFailed {
        from: ContentState,
        to: ContentState,
        #[source]
        source: ActionError,
    },
}

/// Side effect attached to one content transition.
#[async_trait]
pub trait ContentAction: Send + Sync {
    async fn run(&self, from: ContentState, to: ContentState) -> Result<(), ActionError>;
}

type Condition = Box<dyn Fn() -> bool + Send + Sync>;

/// Optional condition and action for a single `from -> to` move.
#[derive(Default)]
pub struct TransitionHook {
    condition: Option<Condition>,
    action: Option<Arc<dyn ContentAction>>,
}

impl TransitionHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only allow the move while `condition` holds.
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Run `action` before committing the move.
    pub fn then<A>(mut self, action: A) -> Self
    where
        A: ContentAction + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    fn allows(&self) -> bool {
        self.condition.as_ref().is_none_or(|condition| condition())
    }
}

/// Drives one content item through draft, review, approval, publication
/// and archival.
///
/// Moves are requested by target state; there is no event vocabulary.
pub struct ContentWorkflowStateMachine {
    current: ContentState,
    hooks: HashMap<(ContentState, ContentState), TransitionHook>,
    history: BoundedHistory<StateTransition<ContentState>>,
}

impl Default for ContentWorkflowStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentWorkflowStateMachine {
    /// A machine for new content, starting in `Draft`.
    pub fn new() -> Self {
        Self::with_state(ContentState::Draft)
    }

    /// A machine for content already at `initial`.
    pub fn with_state(initial: ContentState) -> Self {
        Self {
            current: initial,
            hooks: HashMap::new(),
            history: BoundedHistory::default(),
        }
    }

    /// Attach a hook to a permitted move, replacing any earlier one.
    pub fn on_transition(
        &mut self,
        from: ContentState,
        to: ContentState,
        hook: TransitionHook,
    ) -> Result<&mut Self, ContentWorkflowError> {
        if !from.permits(to) {
            return Err(ContentWorkflowError::UnsupportedTransition { from, to });
        }
        self.hooks.insert((from, to), hook);
        Ok(self)
    }

    pub fn current_state(&self) -> ContentState {
        self.current
    }

    pub fn history(&self) -> &BoundedHistory<StateTransition<ContentState>> {
        &self.history
    }

    /// Whether moving to `to` is permitted and its condition (if any) holds.
    pub fn can_transition(&self, to: ContentState) -> bool {
        self.current.permits(to)
            && self
                .hooks
                .get(&(self.current, to))
                .is_none_or(TransitionHook::allows)
    }

    /// Move to `to` if allowed, running the attached action first.
    ///
    /// Returns `Ok(false)` without side effects when the move is not
    /// allowed. An action failure leaves the state unchanged.
    pub async fn transition(&mut self, to: ContentState) -> Result<bool, ContentWorkflowError> {
        let from = self.current;
        if !self.can_transition(to) {
            debug!(from = from.name(), to = to.name(), "content transition refused");
            return Ok(false);
        }

        let action = self
            .hooks
            .get(&(from, to))
            .and_then(|hook| hook.action.clone());
        if let Some(action) = action {
            if let Err(source) = action.run(from, to).await {
                warn!(
                    from = from.name(),
                    to = to.name(),
                    error = %source,
                    "content transition action failed"
                );
                return Err(ContentWorkflowError::ActionFailed { from, to, source });
            }
        }

        self.current = to;
        self.history.push(StateTransition::new(from, to, None));
        info!(from = from.name(), to = to.name(), "content transition committed");
        Ok(true)
    }

    /// Targets currently reachable, in lifecycle order.
    pub fn available_transitions(&self) -> Vec<ContentState> {
        ContentState::ALL
            .iter()
            .copied()
            .filter(|to| self.can_transition(*to))
            .collect()
    }

    /// Force the content back to `Draft`, bypassing the lifecycle rules.
    pub fn reset(&mut self) {
        if self.current != ContentState::Draft {
            info!(from = self.current.name(), "content workflow reset to draft");
        }
        self.current = ContentState::Draft;
    }
}
