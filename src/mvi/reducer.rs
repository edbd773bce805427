//! Reducer trait for MVI architecture.

use super::action::Action;
use super::effect::Effect;
use super::state::State;

/// Reducer transforms state based on actions.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: `(State, Action, &Environment) -> (State, Effect)`.
/// The only legitimate non-determinism comes from values returned by the
/// environment (clock, uuid source, configuration).
///
/// Actions that are irrelevant for the current state must return the state
/// unchanged together with [`Effect::none`].
pub trait Reducer: Send + Sync + 'static {
    /// The state type this reducer operates on.
    type State: State;

    /// The action type this reducer handles.
    type Action: Action;

    /// Collaborators injected at store construction.
    type Environment: Send + Sync + 'static;

    /// Process an action and return the new state plus the effect to run.
    ///
    /// This must not perform I/O; side effects are described by the
    /// returned [`Effect`] and executed by the store.
    fn reduce(
        &self,
        state: Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> (Self::State, Effect<Self::Action>);
}
