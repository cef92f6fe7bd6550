//! Side-effecting transition actions.

use super::error::ActionError;
use super::event::Event;
use async_trait::async_trait;

/// Side effect run while committing a transition.
///
/// Actions see the state being left (the machine has not moved yet), may
/// mutate the machine context and may await I/O. They run in declaration
/// order, each one finishing before the next starts. A failing action
/// aborts the transition but does not undo what earlier actions already
/// did to the context.
#[async_trait]
pub trait Action<S, C, E>: Send + Sync
where
    S: Sync,
    C: Send,
    E: Sync,
{
    async fn execute(
        &self,
        state: &S,
        context: &mut C,
        event: &Event<E>,
    ) -> Result<(), ActionError>;
}

/// Adapter turning a synchronous closure over `(context, event)` into an
/// [`Action`].
pub struct FnAction<F>(pub F);

#[async_trait]
impl<S, C, E, F> Action<S, C, E> for FnAction<F>
where
    S: Sync,
    C: Send,
    E: Sync,
    F: Fn(&mut C, &Event<E>) -> Result<(), ActionError> + Send + Sync,
{
    async fn execute(
        &self,
        _state: &S,
        context: &mut C,
        event: &Event<E>,
    ) -> Result<(), ActionError> {
        (self.0)(context, event)
    }
}
