//! Generic finite-state-machine engine.
//!
//! A [`MachineDefinition`] declares states, the events each state handles,
//! and for every transition the named guards that must pass and the named
//! actions that run before the target state is committed. A [`Machine`]
//! drives one entity through that chart.
//!
//! # Example
//!
//! ```rust
//! use flowguard::machine::{create_machine, MachineDefinition, StateNode};
//! use flowguard::state_enum;
//!
//! state_enum! {
//!     enum Power {
//!         Idle,
//!         Running,
//!     }
//! }
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum PowerEvent {
//!     Start,
//!     Stop,
//! }
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let definition = MachineDefinition::builder("power")
//!     .initial(Power::Idle)
//!     .context(())
//!     .state(Power::Idle, StateNode::new().on(PowerEvent::Start, Power::Running))
//!     .state(Power::Running, StateNode::new().on(PowerEvent::Stop, Power::Idle))
//!     .build()
//!     .unwrap();
//! let mut machine = create_machine(definition);
//!
//! assert!(!machine.transition(PowerEvent::Stop).await.unwrap());
//! assert!(machine.transition(PowerEvent::Start).await.unwrap());
//! assert_eq!(machine.state(), &Power::Running);
//! # });
//! # }
//! ```

mod action;
mod builder;
mod definition;
mod engine;
mod error;
mod event;
pub mod macros;

pub use action::{Action, FnAction};
pub use builder::MachineBuilder;
pub use definition::{MachineDefinition, StateNode, TransitionSpec};
pub use engine::{create_machine, Machine};
pub use error::{ActionError, BuildError, DefinitionViolation, MachineError};
pub use event::{Event, EventKind};
