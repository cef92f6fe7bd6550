use super::error::CoordinatorError;
use super::handler::{CascadeHandler, ErrorHandler};
use super::monitoring::{MonitoringSink, TracingSink};
use super::record::{Severity, Workflow, WorkflowError};
use super::statistics::ErrorStatistics;
use super::strategy::{cascade_targets, RecoveryAction, RecoveryError, Strategy, StrategyKind};
use crate::config::CoordinatorConfig;
use crate::core::BoundedHistory;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

type Dispatch<'a, Env> =
    Pin<Box<dyn Future<Output = Result<Strategy<Env>, CoordinatorError>> + Send + 'a>>;

struct RegisteredHandler<Env> {
    priority: i32,
    handler: Arc<dyn ErrorHandler<Env>>,
}

impl<Env> Clone for RegisteredHandler<Env> {
    fn clone(&self) -> Self {
        Self {
            priority: self.priority,
            handler: Arc::clone(&self.handler),
        }
    }
}

/// Resolves workflow errors into recovery strategies and executes them.
///
/// Each workflow has its own handler chain, consulted in ascending priority
/// order. Errors no handler claims get a default strategy: an alert for
/// critical errors, a short retry otherwise. Cascade strategies broadcast
/// the error to every cascade handler and re-dispatch a derived error into
/// each related workflow.
///
/// `Env` is the environment recovery effects run against.
pub struct ErrorCoordinator<Env = ()> {
    config: CoordinatorConfig,
    handlers: RwLock<HashMap<Workflow, Vec<RegisteredHandler<Env>>>>,
    cascade_handlers: RwLock<BTreeMap<String, Vec<Arc<dyn CascadeHandler>>>>,
    history: RwLock<BoundedHistory<WorkflowError>>,
    sink: Arc<dyn MonitoringSink>,
}

impl<Env> Default for ErrorCoordinator<Env>
where
    Env: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl<Env> ErrorCoordinator<Env>
where
    Env: Clone + Send + Sync + 'static,
{
    pub fn new(config: CoordinatorConfig) -> Self {
        let history = BoundedHistory::with_capacity(config.max_history);
        Self {
            config,
            handlers: RwLock::new(HashMap::new()),
            cascade_handlers: RwLock::new(BTreeMap::new()),
            history: RwLock::new(history),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the monitoring sink.
    pub fn with_sink<M>(mut self, sink: M) -> Self
    where
        M: MonitoringSink + 'static,
    {
        self.sink = Arc::new(sink);
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Add a handler to `workflow`'s chain.
    ///
    /// Lower priorities run first; equal priorities keep registration order.
    pub fn register_error_handler<H>(&self, workflow: Workflow, handler: H, priority: i32)
    where
        H: ErrorHandler<Env> + 'static,
    {
        let mut handlers = self.handlers.write();
        let chain = handlers.entry(workflow).or_default();
        chain.push(RegisteredHandler {
            priority,
            handler: Arc::new(handler),
        });
        chain.sort_by_key(|registered| registered.priority);
        debug!(workflow = %workflow, priority, chain_len = chain.len(), "error handler registered");
    }

    /// Add a handler notified of every cascaded error, filed under `rule`.
    pub fn register_cascade_handler<H>(&self, rule: impl Into<String>, handler: H)
    where
        H: CascadeHandler + 'static,
    {
        let rule = rule.into();
        debug!(rule = %rule, "cascade handler registered");
        self.cascade_handlers
            .write()
            .entry(rule)
            .or_default()
            .push(Arc::new(handler));
    }

    pub fn handler_count(&self, workflow: Workflow) -> usize {
        self.handlers.read().get(&workflow).map_or(0, Vec::len)
    }

    /// Record `error`, choose a strategy for it and execute that strategy.
    ///
    /// Returns the strategy that ran. The only failure surfaced to the
    /// caller is [`CoordinatorError::RetriesExhausted`]; every other
    /// internal failure is logged and answered with a no-op fallback.
    pub async fn handle_error(
        &self,
        error: WorkflowError,
        env: &Env,
    ) -> Result<Strategy<Env>, CoordinatorError> {
        let chain = vec![error.workflow];
        self.dispatch(error, env, chain).await
    }

    /// Errors still retained, oldest first, optionally for one workflow.
    pub fn error_history(&self, workflow: Option<Workflow>) -> Vec<WorkflowError> {
        self.history
            .read()
            .iter()
            .filter(|error| workflow.is_none_or(|w| error.workflow == w))
            .cloned()
            .collect()
    }

    pub fn clear_error_history(&self) {
        self.history.write().clear();
        info!("error history cleared");
    }

    pub fn error_statistics(&self) -> ErrorStatistics {
        ErrorStatistics::from_errors(self.history.read().iter())
    }

    fn dispatch<'a>(
        &'a self,
        error: WorkflowError,
        env: &'a Env,
        chain: Vec<Workflow>,
    ) -> Dispatch<'a, Env> {
        Box::pin(async move {
            let workflow = error.workflow;
            let operation = error.operation.clone();

            match self.resolve(error, env, &chain).await {
                Ok(strategy) => Ok(strategy),
                Err(err @ CoordinatorError::RetriesExhausted { .. }) => Err(err),
                Err(err) => {
                    error!(
                        workflow = %workflow,
                        operation = %operation,
                        error = %err,
                        "error handling failed, using last-resort fallback"
                    );
                    Ok(Strategy::fallback(RecoveryAction::noop()))
                }
            }
        })
    }

    async fn resolve(
        &self,
        error: WorkflowError,
        env: &Env,
        chain: &[Workflow],
    ) -> Result<Strategy<Env>, CoordinatorError> {
        self.history.write().push(error.clone());
        if let Err(sink_error) = self.sink.record_error(&error) {
            warn!(error_id = %error.id, error = %sink_error, "monitoring sink rejected error");
        }

        let strategy = self.select_strategy(&error);
        info!(
            error_id = %error.id,
            workflow = %error.workflow,
            operation = %error.operation,
            strategy = strategy.kind().name(),
            "recovery strategy selected"
        );

        self.execute(&strategy, &error, env, chain).await?;
        Ok(strategy)
    }

    fn select_strategy(&self, error: &WorkflowError) -> Strategy<Env> {
        let chain = self
            .handlers
            .read()
            .get(&error.workflow)
            .cloned()
            .unwrap_or_default();

        for registered in chain {
            match registered.handler.handle(error) {
                Ok(Some(strategy)) => return strategy,
                Ok(None) => {}
                Err(handler_error) => warn!(
                    workflow = %error.workflow,
                    handler = registered.handler.name(),
                    priority = registered.priority,
                    error = %handler_error,
                    "error handler failed"
                ),
            }
        }

        self.default_strategy(error)
    }

    fn default_strategy(&self, error: &WorkflowError) -> Strategy<Env> {
        match error.severity {
            Severity::Critical => {
                let error_id = error.id;
                let workflow = error.workflow;
                let operation = error.operation.clone();
                let message = error.message.clone();
                Strategy::alert(RecoveryAction::from_env_fn(move |_env: &Env| {
                    error!(
                        error_id = %error_id,
                        workflow = %workflow,
                        operation = %operation,
                        message = %message,
                        "critical workflow error requires attention"
                    );
                    Ok(())
                }))
            }
            _ => Strategy::retry_up_to(self.config.fallback_retry_attempts, RecoveryAction::noop()),
        }
    }

    async fn execute(
        &self,
        strategy: &Strategy<Env>,
        error: &WorkflowError,
        env: &Env,
        chain: &[Workflow],
    ) -> Result<(), CoordinatorError> {
        match strategy.kind() {
            StrategyKind::Retry { max_retries } => {
                let attempts = max_retries
                    .unwrap_or(self.config.default_max_retries)
                    .max(1);
                self.run_with_retry(strategy.action(), attempts, error, env)
                    .await
            }
            StrategyKind::Cascade { related_workflows } => {
                self.run_once(strategy, error, env).await?;
                self.broadcast_cascade(error);
                let targets = cascade_targets(related_workflows, &error.related_workflows);
                self.cascade(targets, error, env, chain).await;
                Ok(())
            }
            StrategyKind::Fallback | StrategyKind::Alert | StrategyKind::Rollback => {
                self.run_once(strategy, error, env).await
            }
        }
    }

    async fn run_once(
        &self,
        strategy: &Strategy<Env>,
        error: &WorkflowError,
        env: &Env,
    ) -> Result<(), CoordinatorError> {
        strategy
            .action()
            .run(env)
            .await
            .map_err(|source| CoordinatorError::ActionFailed {
                strategy: strategy.kind().name(),
                workflow: error.workflow,
                operation: error.operation.clone(),
                source,
            })
    }

    async fn run_with_retry(
        &self,
        action: &RecoveryAction<Env>,
        attempts: u32,
        error: &WorkflowError,
        env: &Env,
    ) -> Result<(), CoordinatorError> {
        let mut last_failure = None;

        for attempt in 0..attempts {
            match action.run(env).await {
                Ok(()) => {
                    if attempt > 0 {
                        info!(
                            workflow = %error.workflow,
                            operation = %error.operation,
                            attempt = attempt + 1,
                            "recovery succeeded after retry"
                        );
                    }
                    return Ok(());
                }
                Err(failure) => {
                    let delay = self.config.backoff.delay_for(attempt);
                    warn!(
                        workflow = %error.workflow,
                        operation = %error.operation,
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure,
                        "recovery attempt failed"
                    );
                    last_failure = Some(failure);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        let source = last_failure.unwrap_or_else(|| RecoveryError::new("no attempt was made"));
        error!(
            workflow = %error.workflow,
            operation = %error.operation,
            attempts,
            error = %source,
            "max retries exceeded"
        );
        Err(CoordinatorError::RetriesExhausted {
            workflow: error.workflow,
            operation: error.operation.clone(),
            attempts,
            source,
        })
    }

    fn broadcast_cascade(&self, error: &WorkflowError) {
        let handlers: Vec<(String, Arc<dyn CascadeHandler>)> = self
            .cascade_handlers
            .read()
            .iter()
            .flat_map(|(rule, handlers)| {
                handlers
                    .iter()
                    .map(move |handler| (rule.clone(), Arc::clone(handler)))
            })
            .collect();

        for (rule, handler) in handlers {
            if let Err(handler_error) = handler.on_cascade(error) {
                warn!(
                    rule = %rule,
                    error_id = %error.id,
                    error = %handler_error,
                    "cascade handler failed"
                );
            }
        }
    }

    async fn cascade(
        &self,
        targets: Vec<Workflow>,
        error: &WorkflowError,
        env: &Env,
        chain: &[Workflow],
    ) {
        let hop = chain.len();

        for target in targets {
            let rejection = if chain.contains(&target) {
                Some(CoordinatorError::CascadeCycle {
                    origin: error.workflow,
                    target,
                    chain: chain.to_vec(),
                })
            } else if hop > self.config.max_cascade_depth {
                Some(CoordinatorError::CascadeDepthExceeded {
                    target,
                    hop,
                    limit: self.config.max_cascade_depth,
                })
            } else {
                None
            };

            if let Some(reason) = rejection {
                warn!(
                    error_id = %error.id,
                    from = %error.workflow,
                    to = %target,
                    reason = %reason,
                    "cascade target skipped"
                );
                if let Err(sink_error) = self.sink.record_cascade_rejected(error, &reason) {
                    warn!(error_id = %error.id, error = %sink_error, "monitoring sink rejected cascade report");
                }
                continue;
            }

            info!(error_id = %error.id, from = %error.workflow, to = %target, hop, "cascading error");
            let derived = error.cascade_to(target);
            let mut next_chain = chain.to_vec();
            next_chain.push(target);

            if let Err(nested) = self.dispatch(derived, env, next_chain).await {
                warn!(
                    from = %error.workflow,
                    to = %target,
                    error = %nested,
                    "cascaded recovery failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::handler::HandlerError;
    use crate::coordinator::monitoring::SinkError;
    use crate::coordinator::record::ErrorType;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn error(workflow: Workflow, severity: Severity) -> WorkflowError {
        WorkflowError::new(
            workflow,
            "sync",
            ErrorType::Network,
            severity,
            "upstream unavailable",
        )
    }

    fn assert_elapsed(started: Instant, millis: u64) {
        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_millis(millis) && elapsed < Duration::from_millis(millis + 5),
            "elapsed {elapsed:?}, expected {millis}ms"
        );
    }

    fn coordinator() -> ErrorCoordinator {
        ErrorCoordinator::new(CoordinatorConfig::default())
    }

    /// Always answers with the same strategy kind, counting calls.
    struct Fixed {
        kind: StrategyKind,
        calls: Arc<AtomicUsize>,
    }

    impl ErrorHandler<()> for Fixed {
        fn handle(&self, _error: &WorkflowError) -> Result<Option<Strategy<()>>, HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Strategy::new(self.kind.clone(), RecoveryAction::noop())))
        }
    }

    struct Declines;

    impl ErrorHandler<()> for Declines {
        fn handle(&self, _error: &WorkflowError) -> Result<Option<Strategy<()>>, HandlerError> {
            Ok(None)
        }
    }

    struct Broken;

    impl ErrorHandler<()> for Broken {
        fn handle(&self, _error: &WorkflowError) -> Result<Option<Strategy<()>>, HandlerError> {
            Err(HandlerError::new("lookup table missing"))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        errors: Mutex<Vec<WorkflowError>>,
        rejections: Mutex<Vec<CoordinatorError>>,
    }

    impl MonitoringSink for Arc<RecordingSink> {
        fn record_error(&self, error: &WorkflowError) -> Result<(), SinkError> {
            self.errors.lock().push(error.clone());
            Ok(())
        }

        fn record_cascade_rejected(
            &self,
            _error: &WorkflowError,
            reason: &CoordinatorError,
        ) -> Result<(), SinkError> {
            self.rejections.lock().push(reason.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl MonitoringSink for FailingSink {
        fn record_error(&self, _error: &WorkflowError) -> Result<(), SinkError> {
            Err(SinkError("collector unreachable".to_string()))
        }
    }

    fn cascade_to(targets: &[Workflow]) -> impl ErrorHandler<()> {
        let targets = targets.to_vec();
        move |_error: &WorkflowError| -> Result<Option<Strategy<()>>, HandlerError> {
            Ok(Some(Strategy::cascade(targets.clone(), RecoveryAction::noop())))
        }
    }

    #[tokio::test]
    async fn critical_without_handler_alerts() {
        let coordinator = coordinator();

        let strategy = coordinator
            .handle_error(error(Workflow::Executive, Severity::Critical), &())
            .await
            .unwrap();

        assert_eq!(strategy.kind(), &StrategyKind::Alert);
    }

    #[tokio::test]
    async fn non_critical_without_handler_retries_twice() {
        let coordinator = coordinator();

        let strategy = coordinator
            .handle_error(error(Workflow::Role, Severity::Low), &())
            .await
            .unwrap();

        assert_eq!(
            strategy.kind(),
            &StrategyKind::Retry {
                max_retries: Some(2)
            }
        );
    }

    #[tokio::test]
    async fn handlers_run_by_priority() {
        let coordinator = coordinator();
        let late = Arc::new(AtomicUsize::new(0));
        let early = Arc::new(AtomicUsize::new(0));
        coordinator.register_error_handler(
            Workflow::Inventory,
            Fixed {
                kind: StrategyKind::Rollback,
                calls: Arc::clone(&late),
            },
            20,
        );
        coordinator.register_error_handler(
            Workflow::Inventory,
            Fixed {
                kind: StrategyKind::Fallback,
                calls: Arc::clone(&early),
            },
            10,
        );

        let strategy = coordinator
            .handle_error(error(Workflow::Inventory, Severity::High), &())
            .await
            .unwrap();

        assert_eq!(strategy.kind(), &StrategyKind::Fallback);
        assert_eq!(early.load(Ordering::SeqCst), 1);
        assert_eq!(late.load(Ordering::SeqCst), 0);
        assert_eq!(coordinator.handler_count(Workflow::Inventory), 2);
    }

    #[tokio::test]
    async fn declining_and_failing_handlers_are_skipped() {
        let coordinator = coordinator();
        let calls = Arc::new(AtomicUsize::new(0));
        coordinator.register_error_handler(Workflow::Marketing, Broken, 1);
        coordinator.register_error_handler(Workflow::Marketing, Declines, 2);
        coordinator.register_error_handler(
            Workflow::Marketing,
            Fixed {
                kind: StrategyKind::Rollback,
                calls: Arc::clone(&calls),
            },
            3,
        );

        let strategy = coordinator
            .handle_error(error(Workflow::Marketing, Severity::Medium), &())
            .await
            .unwrap();

        assert_eq!(strategy.kind(), &StrategyKind::Rollback);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handlers_are_scoped_to_their_workflow() {
        let coordinator = coordinator();
        let calls = Arc::new(AtomicUsize::new(0));
        coordinator.register_error_handler(
            Workflow::Marketing,
            Fixed {
                kind: StrategyKind::Fallback,
                calls: Arc::clone(&calls),
            },
            0,
        );

        coordinator
            .handle_error(error(Workflow::Executive, Severity::Critical), &())
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(coordinator.handler_count(Workflow::Executive), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_backs_off_then_gives_up() {
        let coordinator = coordinator();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let action = RecoveryAction::from_env_fn(move |_env: &()| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(RecoveryError::new("still failing"))
        });
        coordinator.register_error_handler(
            Workflow::Inventory,
            move |_error: &WorkflowError| -> Result<Option<Strategy<()>>, HandlerError> {
                Ok(Some(Strategy::retry_up_to(3, action.clone())))
            },
            0,
        );

        let started = Instant::now();
        let result = coordinator
            .handle_error(error(Workflow::Inventory, Severity::High), &())
            .await;

        assert!(matches!(
            result,
            Err(CoordinatorError::RetriesExhausted { attempts: 3, .. })
        ));
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert_elapsed(started, 7000);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_stops_at_first_success() {
        let coordinator = coordinator();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let action = RecoveryAction::from_env_fn(move |_env: &()| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RecoveryError::new("transient"))
            } else {
                Ok(())
            }
        });
        coordinator.register_error_handler(
            Workflow::Inventory,
            move |_error: &WorkflowError| -> Result<Option<Strategy<()>>, HandlerError> {
                Ok(Some(Strategy::retry(action.clone())))
            },
            0,
        );

        let started = Instant::now();
        let strategy = coordinator
            .handle_error(error(Workflow::Inventory, Severity::Medium), &())
            .await
            .unwrap();

        assert_eq!(strategy.kind(), &StrategyKind::Retry { max_retries: None });
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_elapsed(started, 1000);
    }

    #[tokio::test]
    async fn failing_fallback_becomes_last_resort() {
        let coordinator = coordinator();
        coordinator.register_error_handler(
            Workflow::Role,
            |_error: &WorkflowError| -> Result<Option<Strategy<()>>, HandlerError> {
                Ok(Some(Strategy::fallback(RecoveryAction::from_env_fn(
                    |_env: &()| Err(RecoveryError::new("cache unavailable")),
                ))))
            },
            0,
        );

        let strategy = coordinator
            .handle_error(error(Workflow::Role, Severity::High), &())
            .await
            .unwrap();

        assert_eq!(strategy.kind(), &StrategyKind::Fallback);
        assert!(strategy.action().run(&()).await.is_ok());
    }

    #[tokio::test]
    async fn actions_see_the_environment() {
        #[derive(Clone)]
        struct Store {
            restocked: Arc<AtomicUsize>,
        }

        let coordinator = ErrorCoordinator::<Store>::default();
        coordinator.register_error_handler(
            Workflow::Inventory,
            |_error: &WorkflowError| -> Result<Option<Strategy<Store>>, HandlerError> {
                Ok(Some(Strategy::fallback(RecoveryAction::from_env_fn(
                    |env: &Store| {
                        env.restocked.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    },
                ))))
            },
            0,
        );
        let env = Store {
            restocked: Arc::new(AtomicUsize::new(0)),
        };

        coordinator
            .handle_error(error(Workflow::Inventory, Severity::Low), &env)
            .await
            .unwrap();

        assert_eq!(env.restocked.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cascade_reaches_related_workflow_once() {
        let coordinator = coordinator();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let broadcasts = Arc::new(AtomicUsize::new(0));
        coordinator.register_error_handler(Workflow::Inventory, cascade_to(&[Workflow::Marketing]), 0);
        let sink = Arc::clone(&seen);
        coordinator.register_error_handler(
            Workflow::Marketing,
            move |error: &WorkflowError| -> Result<Option<Strategy<()>>, HandlerError> {
                sink.lock().push(error.clone());
                Ok(Some(Strategy::fallback(RecoveryAction::noop())))
            },
            0,
        );
        let counter = Arc::clone(&broadcasts);
        coordinator.register_cascade_handler(
            "stock-alerts",
            move |_error: &WorkflowError| -> Result<(), HandlerError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );
        let origin = error(Workflow::Inventory, Severity::High).with_related_workflows([Workflow::Marketing]);
        let origin_id = origin.id;

        let strategy = coordinator.handle_error(origin, &()).await.unwrap();

        assert_eq!(strategy.kind().name(), "cascade");
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].operation, "cascade-from-inventory");
        assert_eq!(seen[0].caused_by, Some(origin_id));
        assert_eq!(broadcasts.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.error_history(None).len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn handles_errors_from_spawned_tasks() {
        let coordinator = Arc::new(coordinator());
        coordinator.register_error_handler(Workflow::Inventory, cascade_to(&[Workflow::Marketing]), 0);

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let coordinator = Arc::clone(&coordinator);
                tokio::spawn(async move {
                    coordinator
                        .handle_error(error(Workflow::Inventory, Severity::Critical), &())
                        .await
                        .map(|strategy| strategy.kind().name())
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "cascade");
        }
        assert_eq!(coordinator.error_history(None).len(), 8);
        assert_eq!(coordinator.error_history(Some(Workflow::Marketing)).len(), 4);
    }

    #[tokio::test]
    async fn cascaded_error_forwards_related_workflows() {
        let sink = Arc::new(RecordingSink::default());
        let coordinator = coordinator().with_sink(Arc::clone(&sink));
        coordinator.register_error_handler(Workflow::Inventory, cascade_to(&[]), 0);
        coordinator.register_error_handler(Workflow::Marketing, cascade_to(&[]), 0);
        let origin = error(Workflow::Inventory, Severity::High)
            .with_related_workflows([Workflow::Marketing, Workflow::Executive]);

        coordinator.handle_error(origin, &()).await.unwrap();

        let marketing = coordinator.error_history(Some(Workflow::Marketing));
        assert_eq!(marketing.len(), 1);
        assert_eq!(
            marketing[0].related_workflows,
            vec![Workflow::Marketing, Workflow::Executive]
        );
        let executive: Vec<String> = coordinator
            .error_history(Some(Workflow::Executive))
            .into_iter()
            .map(|e| e.operation)
            .collect();
        assert_eq!(
            executive,
            vec!["cascade-from-marketing", "cascade-from-inventory"]
        );
        assert!(matches!(
            sink.rejections.lock().as_slice(),
            [CoordinatorError::CascadeCycle {
                origin: Workflow::Marketing,
                target: Workflow::Marketing,
                ..
            }]
        ));
    }

    #[tokio::test]
    async fn cascade_cycle_is_rejected() {
        let sink = Arc::new(RecordingSink::default());
        let coordinator = coordinator().with_sink(Arc::clone(&sink));
        coordinator.register_error_handler(Workflow::Inventory, cascade_to(&[Workflow::Marketing]), 0);
        coordinator.register_error_handler(Workflow::Marketing, cascade_to(&[Workflow::Inventory]), 0);

        coordinator
            .handle_error(error(Workflow::Inventory, Severity::High), &())
            .await
            .unwrap();

        assert_eq!(sink.errors.lock().len(), 2);
        let rejections = sink.rejections.lock();
        assert_eq!(rejections.len(), 1);
        assert_eq!(
            rejections[0],
            CoordinatorError::CascadeCycle {
                origin: Workflow::Marketing,
                target: Workflow::Inventory,
                chain: vec![Workflow::Inventory, Workflow::Marketing],
            }
        );
    }

    #[tokio::test]
    async fn cascade_depth_is_limited() {
        let sink = Arc::new(RecordingSink::default());
        let config = CoordinatorConfig {
            max_cascade_depth: 1,
            ..CoordinatorConfig::default()
        };
        let coordinator = ErrorCoordinator::new(config).with_sink(Arc::clone(&sink));
        coordinator.register_error_handler(Workflow::Inventory, cascade_to(&[Workflow::Marketing]), 0);
        coordinator.register_error_handler(Workflow::Marketing, cascade_to(&[Workflow::Executive]), 0);

        coordinator
            .handle_error(error(Workflow::Inventory, Severity::High), &())
            .await
            .unwrap();

        let workflows: Vec<Workflow> = coordinator
            .error_history(None)
            .iter()
            .map(|e| e.workflow)
            .collect();
        assert_eq!(workflows, vec![Workflow::Inventory, Workflow::Marketing]);
        assert!(matches!(
            sink.rejections.lock().as_slice(),
            [CoordinatorError::CascadeDepthExceeded {
                target: Workflow::Executive,
                hop: 2,
                limit: 1
            }]
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn nested_cascade_failure_does_not_abort_origin() {
        let coordinator = coordinator();
        coordinator.register_error_handler(Workflow::Inventory, cascade_to(&[Workflow::Marketing]), 0);
        coordinator.register_error_handler(
            Workflow::Marketing,
            |_error: &WorkflowError| -> Result<Option<Strategy<()>>, HandlerError> {
                Ok(Some(Strategy::retry_up_to(
                    1,
                    RecoveryAction::from_env_fn(|_env: &()| Err(RecoveryError::new("campaign api down"))),
                )))
            },
            0,
        );

        let result = coordinator
            .handle_error(error(Workflow::Inventory, Severity::High), &())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn sink_failure_does_not_block_recovery() {
        let coordinator = coordinator().with_sink(FailingSink);

        let strategy = coordinator
            .handle_error(error(Workflow::Executive, Severity::Critical), &())
            .await
            .unwrap();

        assert_eq!(strategy.kind(), &StrategyKind::Alert);
        assert_eq!(coordinator.error_history(None).len(), 1);
    }

    #[tokio::test]
    async fn history_is_bounded_and_filterable() {
        let config = CoordinatorConfig {
            max_history: 3,
            ..CoordinatorConfig::default()
        };
        let coordinator = ErrorCoordinator::<()>::new(config);

        for workflow in [
            Workflow::Inventory,
            Workflow::Marketing,
            Workflow::Inventory,
            Workflow::Executive,
        ] {
            coordinator
                .handle_error(error(workflow, Severity::Critical), &())
                .await
                .unwrap();
        }

        let all = coordinator.error_history(None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].workflow, Workflow::Marketing);
        assert_eq!(coordinator.error_history(Some(Workflow::Inventory)).len(), 1);

        let stats = coordinator.error_statistics();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_severity[&Severity::Critical], 3);

        coordinator.clear_error_history();
        assert!(coordinator.error_history(None).is_empty());
        assert_eq!(coordinator.error_statistics().total, 0);
    }
}
