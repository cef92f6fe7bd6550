//! Flowguard: state machines and cross-workflow error recovery for commerce
//! back offices.
//!
//! # Modules
//!
//! - [`machine`]: declarative state charts with named guards and async
//!   actions, driven by typed events
//! - [`content`]: the draft → review → approved → published → archived
//!   content lifecycle
//! - [`coordinator`]: per-workflow error handler chains, recovery strategies
//!   (retry, fallback, alert, cascade, rollback) and error history
//! - [`core`]: the `State` trait, guards and bounded transition history
//! - [`config`] and [`telemetry`]: layered settings and `tracing` setup
//!
//! # Example
//!
//! ```rust
//! use flowguard::coordinator::{
//!     ErrorCoordinator, ErrorType, HandlerError, RecoveryAction, Severity, Strategy, Workflow,
//!     WorkflowError,
//! };
//! use flowguard::config::CoordinatorConfig;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
//! # rt.block_on(async {
//! let coordinator = ErrorCoordinator::<()>::new(CoordinatorConfig::default());
//! coordinator.register_error_handler(
//!     Workflow::Inventory,
//!     |error: &WorkflowError| -> Result<Option<Strategy<()>>, HandlerError> {
//!         Ok((error.code.as_deref() == Some("OUT_OF_STOCK"))
//!             .then(|| Strategy::cascade([Workflow::Marketing], RecoveryAction::noop())))
//!     },
//!     10,
//! );
//!
//! let error = WorkflowError::new(
//!     Workflow::Inventory,
//!     "reserve-stock",
//!     ErrorType::Business,
//!     Severity::High,
//!     "SKU-42 is out of stock",
//! )
//! .with_code("OUT_OF_STOCK");
//!
//! let strategy = coordinator.handle_error(error, &()).await.unwrap();
//! assert_eq!(strategy.kind().name(), "cascade");
//! assert_eq!(coordinator.error_history(Some(Workflow::Marketing)).len(), 1);
//! # });
//! ```

pub mod config;
pub mod content;
pub mod coordinator;
pub mod core;
pub mod machine;
pub mod telemetry;

// Re-export commonly used types
pub use content::{ContentState, ContentWorkflowStateMachine};
pub use coordinator::{ErrorCoordinator, Strategy, Workflow, WorkflowError};
pub use crate::core::{BoundedHistory, Guard, State, StateTransition};
pub use machine::{create_machine, Machine, MachineDefinition};
