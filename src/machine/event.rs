//! Events delivered to a machine.

use serde_json::Value;
use std::fmt::Debug;
use std::hash::Hash;

/// Requirements for the type naming events in a state chart.
///
/// Implemented for every type that qualifies, so a plain fieldless enum
/// deriving `Clone, Copy, Debug, PartialEq, Eq, Hash` is enough.
pub trait EventKind: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> EventKind for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// An event as seen by guards and actions: its kind plus optional payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Event<E> {
    pub kind: E,
    /// Data supplied with the event, `Value::Null` when none was given
    pub payload: Value,
}

impl<E> Event<E> {
    pub fn new(kind: E) -> Self {
        Self {
            kind,
            payload: Value::Null,
        }
    }

    pub fn with_payload(kind: E, payload: Value) -> Self {
        Self { kind, payload }
    }
}
