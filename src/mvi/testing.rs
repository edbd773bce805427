//! Deterministic test harness for reducers.
//!
//! [`TestStore`] applies actions synchronously, polls effects in place on a
//! virtual [`TestClock`], and requires every state change and every
//! effect-produced action to be asserted. A mismatch panics with a line
//! diff, failing the surrounding test.
//!
//! Effects are polled without an async runtime, so environment
//! collaborators used here must complete immediately or wait on the
//! store's [`TestClock`].

use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::BoxStream;
use futures::task::noop_waker_ref;
use futures::StreamExt;

use super::clock::TestClock;
use super::executor::Executor;
use super::reducer::Reducer;

struct InFlight<A> {
    origin: String,
    stream: BoxStream<'static, A>,
}

/// Exhaustive, deterministic store for asserting reducer behavior.
pub struct TestStore<R: Reducer> {
    reducer: R,
    env: R::Environment,
    state: R::State,
    clock: TestClock,
    executor: Executor,
    in_flight: Vec<InFlight<R::Action>>,
    received: VecDeque<R::Action>,
    exhaustive: bool,
    finished: bool,
}

impl<R: Reducer> TestStore<R> {
    pub fn new(initial: R::State, reducer: R, env: R::Environment) -> Self {
        Self::with_clock(initial, reducer, env, TestClock::new())
    }

    /// Use `clock` for effect delays; pass the same clock to the environment
    /// when reducers read the time.
    pub fn with_clock(initial: R::State, reducer: R, env: R::Environment, clock: TestClock) -> Self {
        let executor = Executor::new(Arc::new(clock.clone()));
        Self {
            reducer,
            env,
            state: initial,
            clock,
            executor,
            in_flight: Vec::new(),
            received: VecDeque::new(),
            exhaustive: true,
            finished: false,
        }
    }

    /// When false, unasserted received actions are applied silently and
    /// leftover effects do not fail the test. State assertions still apply.
    pub fn exhaustive(mut self, exhaustive: bool) -> Self {
        self.exhaustive = exhaustive;
        self
    }

    pub fn state(&self) -> &R::State {
        &self.state
    }

    pub fn clock(&self) -> &TestClock {
        &self.clock
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn pending_actions(&self) -> impl Iterator<Item = &R::Action> {
        self.received.iter()
    }

    /// Send an action; `update` describes the exact expected mutation.
    #[track_caller]
    pub fn send(&mut self, action: R::Action, update: impl FnOnce(&mut R::State)) {
        if self.exhaustive && !self.received.is_empty() {
            panic!(
                "Must handle {} received action(s) before sending {:?}:\n{}",
                self.received.len(),
                action,
                list(self.received.iter())
            );
        }
        let mut expected = self.state.clone();
        update(&mut expected);
        self.apply(action, expected);
    }

    /// Assert the oldest pending effect action equals `action` and apply it.
    #[track_caller]
    pub fn receive(&mut self, action: R::Action, update: impl FnOnce(&mut R::State)) {
        self.run_effects();
        let index = if self.exhaustive {
            match self.received.front() {
                None => panic!(
                    "Expected to receive {:?}, but no action was pending ({} effect(s) in flight)",
                    action,
                    self.in_flight.len()
                ),
                Some(front) if *front != action => panic!(
                    "Received unexpected action (expected: -, received: +)\n{}",
                    diff(&format!("{action:#?}"), &format!("{front:#?}"))
                ),
                Some(_) => 0,
            }
        } else {
            match self.received.iter().position(|a| *a == action) {
                Some(index) => index,
                None => panic!(
                    "Expected to receive {:?}, pending were:\n{}",
                    action,
                    list(self.received.iter())
                ),
            }
        };
        self.skip_before(index);
        self.take_received(0, update);
    }

    /// Receive the single pending action matching `predicate`.
    ///
    /// Used when independent effects may complete in either order. Fails if
    /// no pending action matches or if more than one does.
    #[track_caller]
    pub fn receive_where(
        &mut self,
        predicate: impl Fn(&R::Action) -> bool,
        update: impl FnOnce(&mut R::State),
    ) {
        self.run_effects();
        let matches: Vec<usize> = self
            .received
            .iter()
            .enumerate()
            .filter(|(_, a)| predicate(a))
            .map(|(i, _)| i)
            .collect();
        match matches.as_slice() {
            [] => panic!(
                "No pending action matched the predicate, pending were:\n{}",
                list(self.received.iter())
            ),
            [index] => self.take_received(*index, update),
            _ => panic!(
                "Ambiguous receive: {} pending actions matched:\n{}",
                matches.len(),
                list(matches.iter().map(|i| &self.received[*i]))
            ),
        }
    }

    /// Advance virtual time and run whatever became ready.
    pub fn advance(&mut self, by: Duration) {
        self.clock.advance(by);
        self.run_effects();
    }

    /// Apply every pending action without asserting it.
    pub fn skip_received_actions(&mut self) {
        self.run_effects();
        while let Some(action) = self.received.pop_front() {
            tracing::debug!(?action, "Skipping received action");
            self.reduce(action);
            self.run_effects();
        }
    }

    /// Drop every in-flight effect.
    pub fn skip_in_flight_effects(&mut self) {
        for effect in self.in_flight.drain(..) {
            tracing::debug!(origin = %effect.origin, "Discarding in-flight effect");
        }
    }

    /// Assert that nothing is left unhandled.
    #[track_caller]
    pub fn finish(mut self) {
        self.finished = true;
        self.assert_exhausted();
    }

    /// Poll every in-flight effect until none can make progress.
    pub fn run_effects(&mut self) {
        let mut cx = Context::from_waker(noop_waker_ref());
        loop {
            let mut progressed = false;
            let mut index = 0;
            while index < self.in_flight.len() {
                match self.in_flight[index].stream.poll_next_unpin(&mut cx) {
                    Poll::Ready(Some(action)) => {
                        self.received.push_back(action);
                        progressed = true;
                    }
                    Poll::Ready(None) => {
                        self.in_flight.remove(index);
                        progressed = true;
                    }
                    Poll::Pending => index += 1,
                }
            }
            if !progressed {
                return;
            }
        }
    }

    #[track_caller]
    fn take_received(&mut self, index: usize, update: impl FnOnce(&mut R::State)) {
        let Some(action) = self.received.remove(index) else {
            panic!("No received action at index {index}");
        };
        let mut expected = self.state.clone();
        update(&mut expected);
        self.apply(action, expected);
    }

    fn skip_before(&mut self, index: usize) {
        for _ in 0..index {
            if let Some(action) = self.received.pop_front() {
                self.reduce(action);
            }
        }
    }

    #[track_caller]
    fn apply(&mut self, action: R::Action, expected: R::State) {
        let origin = format!("{action:?}");
        self.reduce(action);
        if self.state != expected {
            panic!(
                "State mismatch after {origin} (expected: -, actual: +)\n{}",
                diff(&format!("{expected:#?}"), &format!("{:#?}", self.state))
            );
        }
        self.run_effects();
    }

    fn reduce(&mut self, action: R::Action) {
        let origin = format!("{action:?}");
        let current = std::mem::take(&mut self.state);
        let (next, effect) = self.reducer.reduce(current, action, &self.env);
        self.state = next;
        if let Some(stream) = self.executor.start(effect) {
            self.in_flight.push(InFlight { origin, stream });
        }
    }

    #[track_caller]
    fn assert_exhausted(&mut self) {
        self.run_effects();
        if !self.exhaustive {
            return;
        }
        if !self.received.is_empty() {
            panic!(
                "{} received action(s) were never asserted:\n{}",
                self.received.len(),
                list(self.received.iter())
            );
        }
        if !self.in_flight.is_empty() {
            let origins: Vec<_> = self.in_flight.iter().map(|e| e.origin.as_str()).collect();
            panic!(
                "{} effect(s) still in flight, started by:\n{}",
                origins.len(),
                list(origins.iter())
            );
        }
    }
}

impl<R: Reducer> Drop for TestStore<R> {
    fn drop(&mut self) {
        if self.finished || std::thread::panicking() {
            return;
        }
        self.finished = true;
        self.assert_exhausted();
    }
}

fn list<'a, T: Debug + 'a>(items: impl Iterator<Item = &'a T>) -> String {
    items
        .map(|item| format!("  {item:?}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Line-by-line diff of two pretty-printed values.
pub fn diff(expected: &str, actual: &str) -> String {
    let expected: Vec<&str> = expected.lines().collect();
    let actual: Vec<&str> = actual.lines().collect();
    let mut out = Vec::new();
    for i in 0..expected.len().max(actual.len()) {
        match (expected.get(i), actual.get(i)) {
            (Some(e), Some(a)) if e == a => out.push(format!("  {e}")),
            (e, a) => {
                if let Some(e) = e {
                    out.push(format!("- {e}"));
                }
                if let Some(a) = a {
                    out.push(format!("+ {a}"));
                }
            }
        }
    }
    out.join("\n")
}
