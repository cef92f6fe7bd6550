//! Core state machine types.
//!
//! - State definitions via the `State` trait
//! - Guard predicates for transition control
//! - Bounded history shared by machines and the error coordinator
//!
//! Everything here is synchronous and free of side effects.

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{BoundedHistory, StateTransition, DEFAULT_HISTORY_CAPACITY};
pub use state::State;
