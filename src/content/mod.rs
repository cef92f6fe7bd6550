//! Content publication workflow.
//!
//! A fixed five-state lifecycle. Unlike the generic [`machine`](crate::machine)
//! engine there are no events: callers ask for a target state directly and
//! the lifecycle table decides whether that move is allowed.

mod state;
mod workflow;

pub use state::ContentState;
pub use workflow::{
    ContentAction, ContentWorkflowError, ContentWorkflowStateMachine, TransitionHook,
};
