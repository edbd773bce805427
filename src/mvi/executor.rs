//! Turns [`Effect`] descriptions into streams of follow-up actions.
//!
//! The executor never touches state. Whoever drives the returned stream (the
//! live [`Store`](super::store::Store) on Tokio tasks, or the
//! [`TestStore`](super::testing::TestStore) by polling in place) forwards each
//! produced action back into its serialized dispatch path.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::{self, Either};
use futures::stream::{self, AbortHandle, Abortable, BoxStream};
use futures::{Future, Stream, StreamExt};

use super::cancel::{CancellationRegistry, EffectId};
use super::clock::Clock;
use super::effect::Effect;

/// Effect runner shared by one store.
#[derive(Clone)]
pub struct Executor {
    clock: Arc<dyn Clock>,
    registry: CancellationRegistry,
}

impl Executor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            registry: CancellationRegistry::new(),
        }
    }

    pub fn registry(&self) -> &CancellationRegistry {
        &self.registry
    }

    /// Start an effect returned by a reducer.
    ///
    /// Top-level cancellation (a bare `Cancel`, or one directly inside a
    /// `Merge`) happens right here, before any later action is reduced.
    /// Returns `None` when nothing is left to drive.
    pub fn start<A: Send + 'static>(&self, effect: Effect<A>) -> Option<BoxStream<'static, A>> {
        match effect {
            Effect::None => None,
            Effect::Cancel(id) => {
                self.registry.cancel(&id);
                None
            }
            Effect::Merge(effects) => {
                let streams: Vec<_> = effects.into_iter().filter_map(|e| self.start(e)).collect();
                if streams.is_empty() {
                    None
                } else {
                    Some(stream::select_all(streams).boxed())
                }
            }
            Effect::Cancellable {
                id,
                cancel_in_flight: true,
                effect,
            } => {
                self.registry.cancel(&id);
                Some(self.tagged(id, false, *effect))
            }
            other => Some(self.stream(other)),
        }
    }

    fn stream<A: Send + 'static>(&self, effect: Effect<A>) -> BoxStream<'static, A> {
        match effect {
            Effect::None => stream::empty().boxed(),
            Effect::FireAndForget(work) => silent(async move {
                if let Err(err) = work.await {
                    tracing::warn!(error = %err, "Fire-and-forget effect failed");
                }
            }),
            Effect::Task(work) => stream::once(work).filter_map(future::ready).boxed(),
            Effect::Timeout {
                task,
                after,
                on_timeout,
            } => {
                let clock = Arc::clone(&self.clock);
                stream::once(async move {
                    match future::select(task, clock.sleep(after)).await {
                        Either::Left((output, _)) => output,
                        Either::Right(((), _)) => {
                            tracing::debug!(?after, "Effect timed out");
                            Some(on_timeout)
                        }
                    }
                })
                .filter_map(future::ready)
                .boxed()
            }
            Effect::Keyframes(frames) => {
                let clock = Arc::clone(&self.clock);
                let started = clock.now();
                // Deadlines are offsets from the start of the effect, so a
                // clock jump past several frames releases them all, in order.
                let mut offset = Duration::ZERO;
                let timeline: Vec<_> = frames
                    .into_iter()
                    .map(|(action, delay)| {
                        offset += delay;
                        (action, offset)
                    })
                    .collect();
                stream::iter(timeline)
                    .then(move |(action, due)| {
                        let remaining = (started + due)
                            .duration_since(clock.now())
                            .unwrap_or(Duration::ZERO);
                        let sleep = clock.sleep(remaining);
                        async move {
                            sleep.await;
                            action
                        }
                    })
                    .boxed()
            }
            Effect::Concatenate(effects) => {
                let executor = self.clone();
                stream::iter(effects)
                    .flat_map(move |e| executor.stream(e))
                    .boxed()
            }
            Effect::Merge(effects) => {
                stream::select_all(effects.into_iter().map(|e| self.stream(e))).boxed()
            }
            Effect::Cancellable {
                id,
                cancel_in_flight,
                effect,
            } => self.tagged(id, cancel_in_flight, *effect),
            Effect::Cancel(id) => {
                let registry = self.registry.clone();
                silent(async move {
                    registry.cancel(&id);
                })
            }
        }
    }

    fn tagged<A: Send + 'static>(
        &self,
        id: EffectId,
        cancel_in_flight: bool,
        effect: Effect<A>,
    ) -> BoxStream<'static, A> {
        let (handle, registration) = AbortHandle::new_pair();
        // Registered right away so a cancel arriving before the first poll
        // still reaches it.
        let token = if cancel_in_flight {
            None
        } else {
            Some(self.registry.register(id.clone(), handle.clone()))
        };
        Tagged {
            id,
            registry: self.registry.clone(),
            pending: if cancel_in_flight { Some(handle) } else { None },
            token,
            inner: Abortable::new(self.stream(effect), registration),
        }
        .boxed()
    }
}

fn silent<A: Send + 'static>(work: impl Future<Output = ()> + Send + 'static) -> BoxStream<'static, A> {
    stream::once(work)
        .filter_map(|()| future::ready(None::<A>))
        .boxed()
}

/// Stream tagged with an [`EffectId`]; unregisters itself when done.
struct Tagged<A> {
    id: EffectId,
    registry: CancellationRegistry,
    /// Handle waiting for first poll, when in-flight effects must be
    /// cancelled before this one registers.
    pending: Option<AbortHandle>,
    token: Option<u64>,
    inner: Abortable<BoxStream<'static, A>>,
}

impl<A> Stream for Tagged<A> {
    type Item = A;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<A>> {
        let this = self.get_mut();
        if let Some(handle) = this.pending.take() {
            this.registry.cancel(&this.id);
            this.token = Some(this.registry.register(this.id.clone(), handle));
        }
        match this.inner.poll_next_unpin(cx) {
            Poll::Ready(None) => {
                if let Some(token) = this.token.take() {
                    this.registry.unregister(&this.id, token);
                }
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl<A> Drop for Tagged<A> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.registry.unregister(&self.id, token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvi::clock::TestClock;
    use futures::task::noop_waker_ref;
    use std::time::Duration;

    fn drain_ready<A>(stream: &mut BoxStream<'static, A>) -> (Vec<A>, bool) {
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut out = Vec::new();
        loop {
            match stream.as_mut().poll_next(&mut cx) {
                Poll::Ready(Some(a)) => out.push(a),
                Poll::Ready(None) => return (out, true),
                Poll::Pending => return (out, false),
            }
        }
    }

    fn executor() -> (Executor, TestClock) {
        let clock = TestClock::new();
        (Executor::new(Arc::new(clock.clone())), clock)
    }

    #[test]
    fn none_and_top_level_cancel_start_nothing() {
        let (executor, _) = executor();
        assert!(executor.start::<u8>(Effect::none()).is_none());
        assert!(executor.start::<u8>(Effect::cancel("unknown")).is_none());
    }

    #[test]
    fn concatenate_preserves_order() {
        let (executor, _) = executor();
        let mut stream = executor
            .start(Effect::concatenate([Effect::send(1u8), Effect::send(2), Effect::send(3)]))
            .unwrap();
        assert_eq!(drain_ready(&mut stream), (vec![1, 2, 3], true));
    }

    #[test]
    fn keyframe_delays_accumulate() {
        let (executor, clock) = executor();
        let mut stream = executor
            .start(Effect::keyframes([
                ('a', Duration::ZERO),
                ('b', Duration::from_millis(500)),
                ('c', Duration::from_millis(600)),
            ]))
            .unwrap();

        assert_eq!(drain_ready(&mut stream), (vec!['a'], false));
        clock.advance(Duration::from_millis(500));
        assert_eq!(drain_ready(&mut stream), (vec!['b'], false));
        clock.advance(Duration::from_millis(599));
        assert_eq!(drain_ready(&mut stream), (vec![], false));
        clock.advance(Duration::from_millis(1));
        assert_eq!(drain_ready(&mut stream), (vec!['c'], true));
    }

    #[test]
    fn clock_jump_releases_overdue_frames_in_order() {
        let (executor, clock) = executor();
        let mut stream = executor
            .start(Effect::keyframes([
                ('a', Duration::from_millis(100)),
                ('b', Duration::from_millis(100)),
                ('c', Duration::from_millis(100)),
            ]))
            .unwrap();

        assert_eq!(drain_ready(&mut stream), (vec![], false));
        clock.advance(Duration::from_millis(250));
        assert_eq!(drain_ready(&mut stream), (vec!['a', 'b'], false));
        clock.advance(Duration::from_millis(50));
        assert_eq!(drain_ready(&mut stream), (vec!['c'], true));
    }

    #[test]
    fn cancelled_stream_ends_without_delivering() {
        let (executor, clock) = executor();
        let mut stream = executor
            .start(Effect::keyframes([(1u8, Duration::from_secs(1))]).cancellable("tick"))
            .unwrap();
        assert_eq!(drain_ready(&mut stream), (vec![], false));

        assert!(executor.start::<u8>(Effect::cancel("tick")).is_none());
        clock.advance(Duration::from_secs(1));
        assert_eq!(drain_ready(&mut stream), (vec![], true));
        assert!(!executor.registry().is_in_flight(&EffectId::new("tick")));
    }

    #[test]
    fn cancel_in_flight_replaces_previous_effect() {
        let (executor, clock) = executor();
        let mut first = executor
            .start(Effect::keyframes([(1u8, Duration::from_secs(1))]).cancellable_in_flight("odo"))
            .unwrap();
        drain_ready(&mut first);
        let mut second = executor
            .start(Effect::keyframes([(2u8, Duration::from_secs(1))]).cancellable_in_flight("odo"))
            .unwrap();
        assert_eq!(drain_ready(&mut second), (vec![], false));

        clock.advance(Duration::from_secs(1));
        assert_eq!(drain_ready(&mut first), (vec![], true));
        assert_eq!(drain_ready(&mut second), (vec![2], true));
    }

    #[test]
    fn timeout_delivers_fallback_when_task_is_slow() {
        let (executor, clock) = executor();
        let slow_clock = clock.clone();
        let mut stream = executor
            .start(Effect::timeout(
                async move {
                    slow_clock.sleep(Duration::from_secs(5)).await;
                    "done"
                },
                Duration::from_secs(2),
                "timed out",
            ))
            .unwrap();

        assert_eq!(drain_ready(&mut stream), (vec![], false));
        clock.advance(Duration::from_secs(2));
        assert_eq!(drain_ready(&mut stream), (vec!["timed out"], true));
    }
}
