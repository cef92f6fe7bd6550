//! Recovery strategies returned by error handlers.

use super::record::Workflow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use stillwater::effect::{BoxedEffect, Effect};
use stillwater::prelude::*;
use thiserror::Error;

/// Failure of a recovery action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RecoveryError {
    message: String,
}

impl RecoveryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

type EffectFactory<Env> = dyn Fn() -> BoxedEffect<(), RecoveryError, Env> + Send + Sync;

/// Side effect a strategy performs when executed.
///
/// Holds a factory rather than an effect: every run (including each retry
/// attempt) builds a fresh effect and runs it against the caller's
/// environment.
pub struct RecoveryAction<Env> {
    factory: Arc<EffectFactory<Env>>,
}

impl<Env> Clone for RecoveryAction<Env> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<Env> fmt::Debug for RecoveryAction<Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecoveryAction")
    }
}

impl<Env> RecoveryAction<Env>
where
    Env: Clone + Send + Sync + 'static,
{
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> BoxedEffect<(), RecoveryError, Env> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Wrap a synchronous function of the environment.
    pub fn from_env_fn<F>(f: F) -> Self
    where
        F: Fn(&Env) -> Result<(), RecoveryError> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::new(move || {
            let f = Arc::clone(&f);
            from_fn(move |env: &Env| f(env)).boxed()
        })
    }

    /// An action that always succeeds and does nothing.
    pub fn noop() -> Self {
        Self::new(|| pure(()).boxed())
    }

    pub(crate) async fn run(&self, env: &Env) -> Result<(), RecoveryError> {
        (self.factory)().run(env).await
    }
}

/// What kind of recovery a strategy performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StrategyKind {
    /// Re-run the action with exponential backoff. `None` uses the
    /// coordinator's configured default.
    Retry { max_retries: Option<u32> },
    Fallback,
    Alert,
    /// Run the action, then propagate the error into other workflows.
    Cascade { related_workflows: Vec<Workflow> },
    Rollback,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Retry { .. } => "retry",
            StrategyKind::Fallback => "fallback",
            StrategyKind::Alert => "alert",
            StrategyKind::Cascade { .. } => "cascade",
            StrategyKind::Rollback => "rollback",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recovery decision: the kind of recovery plus the action to run.
pub struct Strategy<Env> {
    kind: StrategyKind,
    action: RecoveryAction<Env>,
}

impl<Env> Clone for Strategy<Env> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            action: self.action.clone(),
        }
    }
}

impl<Env> fmt::Debug for Strategy<Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("kind", &self.kind).finish()
    }
}

impl<Env> Strategy<Env> {
    pub fn new(kind: StrategyKind, action: RecoveryAction<Env>) -> Self {
        Self { kind, action }
    }

    /// Retry with the coordinator's default attempt limit.
    pub fn retry(action: RecoveryAction<Env>) -> Self {
        Self::new(StrategyKind::Retry { max_retries: None }, action)
    }

    pub fn retry_up_to(max_retries: u32, action: RecoveryAction<Env>) -> Self {
        Self::new(
            StrategyKind::Retry {
                max_retries: Some(max_retries),
            },
            action,
        )
    }

    pub fn fallback(action: RecoveryAction<Env>) -> Self {
        Self::new(StrategyKind::Fallback, action)
    }

    pub fn alert(action: RecoveryAction<Env>) -> Self {
        Self::new(StrategyKind::Alert, action)
    }

    pub fn cascade(
        related_workflows: impl IntoIterator<Item = Workflow>,
        action: RecoveryAction<Env>,
    ) -> Self {
        Self::new(
            StrategyKind::Cascade {
                related_workflows: related_workflows.into_iter().collect(),
            },
            action,
        )
    }

    pub fn rollback(action: RecoveryAction<Env>) -> Self {
        Self::new(StrategyKind::Rollback, action)
    }

    pub fn kind(&self) -> &StrategyKind {
        &self.kind
    }

    pub fn action(&self) -> &RecoveryAction<Env> {
        &self.action
    }
}

/// Merge cascade targets, strategy targets first, dropping repeats.
pub(crate) fn cascade_targets(strategy: &[Workflow], error: &[Workflow]) -> Vec<Workflow> {
    let mut targets = Vec::with_capacity(strategy.len() + error.len());
    for workflow in strategy.iter().chain(error) {
        if !targets.contains(workflow) {
            targets.push(*workflow);
        }
    }
    targets
}
