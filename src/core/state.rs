//! Core State trait for state machine states.
//!
//! States are plain values. They are used as keys of a machine's state chart,
//! so besides being cloneable and serializable they must be hashable.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// All methods are pure. A state names a position in a chart; the chart
/// itself (which events leave which state) lives in a
/// [`MachineDefinition`](crate::machine::MachineDefinition).
///
/// # Example
///
/// ```rust
/// use flowguard::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum OrderState {
///     Open,
///     Reserved,
///     Shipped,
///     Cancelled,
/// }
///
/// impl State for OrderState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Reserved => "Reserved",
///             Self::Shipped => "Shipped",
///             Self::Cancelled => "Cancelled",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Shipped | Self::Cancelled)
///     }
///
///     fn is_error(&self) -> bool {
///         matches!(self, Self::Cancelled)
///     }
/// }
///
/// assert!(OrderState::Shipped.is_final());
/// ```
pub trait State:
    Clone + PartialEq + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Name used in logs and transition records.
    fn name(&self) -> &str;

    /// Terminal states accept no further events.
    ///
    /// A machine definition may also mark a state final; either source is
    /// enough. Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Error states describe failure positions. Not enforced to be final.
    fn is_error(&self) -> bool {
        false
    }
}
