//! Cross-workflow error coordination.
//!
//! Workflows report failures as [`WorkflowError`]s. The [`ErrorCoordinator`]
//! records them, asks the reporting workflow's handlers for a [`Strategy`],
//! and executes it: retrying with exponential backoff, falling back,
//! alerting, rolling back, or cascading the failure into related workflows.
//!
//! Recovery actions are stillwater effects run against a caller-supplied
//! environment, so the same handler set works against production services
//! and test doubles.

mod error;
mod handler;
mod monitoring;
mod record;
mod service;
mod statistics;
mod strategy;

pub use error::CoordinatorError;
pub use handler::{CascadeHandler, ErrorHandler, HandlerError};
pub use monitoring::{MonitoringSink, SinkError, TracingSink};
pub use record::{ErrorType, Severity, Workflow, WorkflowError};
pub use service::ErrorCoordinator;
pub use statistics::ErrorStatistics;
pub use strategy::{RecoveryAction, RecoveryError, Strategy, StrategyKind};
