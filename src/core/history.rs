//! Bounded history tracking.
//!
//! Machines log their committed transitions and the error coordinator logs
//! every error it sees. Both logs are capped: once full, recording a new
//! entry evicts the oldest one.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Capacity used by machines and the coordinator unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Record of a single committed state transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Event that caused the move; `None` for direct state requests
    pub trigger: Option<String>,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

impl<S: State> StateTransition<S> {
    pub fn new(from: S, to: S, trigger: Option<String>) -> Self {
        Self {
            from,
            to,
            trigger,
            timestamp: Utc::now(),
        }
    }
}

/// FIFO log with a fixed capacity.
///
/// # Example
///
/// ```rust
/// use flowguard::core::BoundedHistory;
///
/// let mut history = BoundedHistory::with_capacity(2);
/// history.push("a");
/// history.push("b");
/// let evicted = history.push("c");
///
/// assert_eq!(evicted, Some("a"));
/// assert_eq!(history.to_vec(), vec!["b", "c"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "StoredHistory<T>")]
pub struct BoundedHistory<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

/// Serialized form, re-bounded on load.
#[derive(Deserialize)]
struct StoredHistory<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> From<StoredHistory<T>> for BoundedHistory<T> {
    /// Keeps the newest `capacity` entries; a zero capacity becomes one.
    fn from(stored: StoredHistory<T>) -> Self {
        let capacity = stored.capacity.max(1);
        let mut entries = stored.entries;
        let excess = entries.len().saturating_sub(capacity);
        entries.drain(..excess);
        Self { entries, capacity }
    }
}

impl<T> Default for BoundedHistory<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<T> BoundedHistory<T> {
    /// Create an empty history. A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, returning the evicted oldest entry when full.
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> BoundedHistory<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

impl<S: State> BoundedHistory<StateTransition<S>> {
    /// States traversed, starting with the `from` of the oldest retained
    /// transition.
    pub fn path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.entries.len() + 1);
        if let Some(first) = self.entries.front() {
            path.push(&first.from);
        }
        path.extend(self.entries.iter().map(|t| &t.to));
        path
    }

    /// Time between the oldest and newest retained transitions.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.entries.front()?;
        let last = self.entries.back()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }
}
