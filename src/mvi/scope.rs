//! Reducer composition.
//!
//! A parent feature embeds a child through explicit projections: a state
//! lens, an action prism (extract/embed) and an environment projection.
//! [`Combine`] runs two reducers over the same state in a fixed order.

use super::action::Action;
use super::effect::Effect;
use super::reducer::Reducer;
use super::state::State;

/// Embeds a child reducer into a parent's state, action and environment.
pub struct Scope<C: Reducer, P, PA, PE> {
    child: C,
    state: fn(&mut P) -> &mut C::State,
    extract: fn(&PA) -> Option<C::Action>,
    embed: fn(C::Action) -> PA,
    env: fn(&PE) -> &C::Environment,
}

impl<C: Reducer, P, PA, PE> Scope<C, P, PA, PE> {
    pub fn new(
        child: C,
        state: fn(&mut P) -> &mut C::State,
        extract: fn(&PA) -> Option<C::Action>,
        embed: fn(C::Action) -> PA,
        env: fn(&PE) -> &C::Environment,
    ) -> Self {
        Self {
            child,
            state,
            extract,
            embed,
            env,
        }
    }
}

impl<C, P, PA, PE> Reducer for Scope<C, P, PA, PE>
where
    C: Reducer,
    P: State,
    PA: Action,
    PE: Send + Sync + 'static,
{
    type State = P;
    type Action = PA;
    type Environment = PE;

    fn reduce(&self, mut state: P, action: PA, env: &PE) -> (P, Effect<PA>) {
        let Some(child_action) = (self.extract)(&action) else {
            return (state, Effect::none());
        };
        let slot = (self.state)(&mut state);
        let (next, effect) = self
            .child
            .reduce(std::mem::take(slot), child_action, (self.env)(env));
        *slot = next;
        (state, effect.map(self.embed))
    }
}

/// Like [`Scope`], for child state that only exists part of the time
/// (e.g. a presented detail screen).
///
/// Child actions arriving while the slot is `None` are ignored.
pub struct OptionalScope<C: Reducer, P, PA, PE> {
    child: C,
    state: fn(&mut P) -> &mut Option<C::State>,
    extract: fn(&PA) -> Option<C::Action>,
    embed: fn(C::Action) -> PA,
    env: fn(&PE) -> &C::Environment,
}

impl<C: Reducer, P, PA, PE> OptionalScope<C, P, PA, PE> {
    pub fn new(
        child: C,
        state: fn(&mut P) -> &mut Option<C::State>,
        extract: fn(&PA) -> Option<C::Action>,
        embed: fn(C::Action) -> PA,
        env: fn(&PE) -> &C::Environment,
    ) -> Self {
        Self {
            child,
            state,
            extract,
            embed,
            env,
        }
    }
}

impl<C, P, PA, PE> Reducer for OptionalScope<C, P, PA, PE>
where
    C: Reducer,
    P: State,
    PA: Action,
    PE: Send + Sync + 'static,
{
    type State = P;
    type Action = PA;
    type Environment = PE;

    fn reduce(&self, mut state: P, action: PA, env: &PE) -> (P, Effect<PA>) {
        let Some(child_action) = (self.extract)(&action) else {
            return (state, Effect::none());
        };
        let slot = (self.state)(&mut state);
        let Some(child_state) = slot.take() else {
            tracing::debug!(action = ?child_action, "Child action received while child state is absent");
            return (state, Effect::none());
        };
        let (next, effect) = self
            .child
            .reduce(child_state, child_action, (self.env)(env));
        *slot = Some(next);
        (state, effect.map(self.embed))
    }
}

/// Runs `first`, then `second`, over the same state; effects are merged.
///
/// `second` observes the state as left by `first`.
pub struct Combine<A, B> {
    first: A,
    second: B,
}

impl<A, B> Combine<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> Reducer for Combine<A, B>
where
    A: Reducer,
    B: Reducer<State = A::State, Action = A::Action, Environment = A::Environment>,
{
    type State = A::State;
    type Action = A::Action;
    type Environment = A::Environment;

    fn reduce(
        &self,
        state: Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> (Self::State, Effect<Self::Action>) {
        let (state, first) = self.first.reduce(state, action.clone(), env);
        let (state, second) = self.second.reduce(state, action, env);
        (state, Effect::merge([first, second]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Counter {
        count: i32,
    }
    impl State for Counter {}

    #[derive(Debug, Clone, PartialEq)]
    enum CounterAction {
        Increment,
    }
    impl Action for CounterAction {}

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = Counter;
        type Action = CounterAction;
        type Environment = ();

        fn reduce(&self, mut state: Counter, action: CounterAction, _: &()) -> (Counter, Effect<CounterAction>) {
            match action {
                CounterAction::Increment => state.count += 1,
            }
            (state, Effect::none())
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Parent {
        counter: Counter,
        detail: Option<Counter>,
        log: Vec<i32>,
    }
    impl State for Parent {}

    #[derive(Debug, Clone, PartialEq)]
    enum ParentAction {
        Counter(CounterAction),
        Detail(CounterAction),
        Other,
    }
    impl Action for ParentAction {}

    struct Env {
        unit: (),
    }

    fn counter_scope() -> Scope<CounterReducer, Parent, ParentAction, Env> {
        Scope::new(
            CounterReducer,
            |p| &mut p.counter,
            |a| match a {
                ParentAction::Counter(a) => Some(a.clone()),
                _ => None,
            },
            ParentAction::Counter,
            |e| &e.unit,
        )
    }

    struct Recorder;

    impl Reducer for Recorder {
        type State = Parent;
        type Action = ParentAction;
        type Environment = Env;

        fn reduce(&self, mut state: Parent, _: ParentAction, _: &Env) -> (Parent, Effect<ParentAction>) {
            state.log.push(state.counter.count);
            (state, Effect::none())
        }
    }

    #[test]
    fn scope_routes_child_actions_into_slice() {
        let scope = counter_scope();
        let env = Env { unit: () };
        let (state, effect) = scope.reduce(
            Parent::default(),
            ParentAction::Counter(CounterAction::Increment),
            &env,
        );
        assert_eq!(state.counter.count, 1);
        assert!(effect.is_none());

        let (state, _) = scope.reduce(state, ParentAction::Other, &env);
        assert_eq!(state.counter.count, 1);
    }

    #[test]
    fn optional_scope_ignores_actions_without_state() {
        let scope: OptionalScope<CounterReducer, Parent, ParentAction, Env> = OptionalScope::new(
            CounterReducer,
            |p| &mut p.detail,
            |a| match a {
                ParentAction::Detail(a) => Some(a.clone()),
                _ => None,
            },
            ParentAction::Detail,
            |e| &e.unit,
        );
        let env = Env { unit: () };
        let action = ParentAction::Detail(CounterAction::Increment);

        let (state, _) = scope.reduce(Parent::default(), action.clone(), &env);
        assert_eq!(state.detail, None);

        let presented = Parent {
            detail: Some(Counter::default()),
            ..Parent::default()
        };
        let (state, _) = scope.reduce(presented, action, &env);
        assert_eq!(state.detail, Some(Counter { count: 1 }));
    }

    #[test]
    fn combine_second_observes_state_after_first() {
        let reducer = Combine::new(counter_scope(), Recorder);
        let env = Env { unit: () };
        let (state, _) = reducer.reduce(
            Parent::default(),
            ParentAction::Counter(CounterAction::Increment),
            &env,
        );
        assert_eq!(state.log, vec![1]);
    }
}
