//! Guard predicates for controlling state transitions.
//!
//! A guard sees the machine context and the event being processed and
//! answers whether the transition may proceed. Guards must not mutate
//! anything; side effects belong in actions.

use crate::machine::Event;

/// Pure predicate that decides whether a transition may proceed.
///
/// # Example
///
/// ```rust
/// use flowguard::core::Guard;
/// use flowguard::machine::Event;
///
/// struct Stock {
///     on_hand: u32,
/// }
///
/// let has_stock = Guard::new(|stock: &Stock, _event: &Event<&str>| stock.on_hand > 0);
///
/// assert!(has_stock.check(&Stock { on_hand: 3 }, &Event::new("reserve")));
/// assert!(!has_stock.check(&Stock { on_hand: 0 }, &Event::new("reserve")));
/// ```
pub struct Guard<C, E> {
    predicate: Box<dyn Fn(&C, &Event<E>) -> bool + Send + Sync>,
}

impl<C, E> Guard<C, E> {
    /// Create a guard from a predicate over `(context, event)`.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C, &Event<E>) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the guard.
    pub fn check(&self, context: &C, event: &Event<E>) -> bool {
        (self.predicate)(context, event)
    }
}

impl<C, E> std::fmt::Debug for Guard<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}
