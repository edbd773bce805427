//! Declarative descriptions of asynchronous work returned by reducers.
//!
//! An [`Effect`] never runs by itself. The store hands it to the
//! [`Executor`](super::executor::Executor), which turns it into a stream of
//! follow-up actions fed back through the same serialized dispatch path.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::cancel::EffectId;

/// Asynchronous work that may produce follow-up actions.
pub enum Effect<A> {
    /// No async work.
    None,

    /// Run a side effect that never produces an action.
    /// Errors are logged and dropped.
    FireAndForget(BoxFuture<'static, anyhow::Result<()>>),

    /// Run async work producing at most one action.
    Task(BoxFuture<'static, Option<A>>),

    /// Race a task against a delay measured on the store clock.
    Timeout {
        task: BoxFuture<'static, Option<A>>,
        after: Duration,
        on_timeout: A,
    },

    /// Emit each action after its delay, delays accumulating in order.
    Keyframes(Vec<(A, Duration)>),

    /// Run effects one after another.
    Concatenate(Vec<Effect<A>>),

    /// Run effects concurrently; completions arrive in any order.
    Merge(Vec<Effect<A>>),

    /// Tag an effect so a later [`Effect::Cancel`] can stop it.
    Cancellable {
        id: EffectId,
        cancel_in_flight: bool,
        effect: Box<Effect<A>>,
    },

    /// Stop delivery from every in-flight effect tagged with the id.
    Cancel(EffectId),
}

impl<A: Send + 'static> Effect<A> {
    pub fn none() -> Self {
        Effect::None
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Effect::None)
    }

    /// Feed an action back immediately.
    pub fn send(action: A) -> Self {
        Effect::Task(futures::future::ready(Some(action)).boxed())
    }

    pub fn fire_and_forget<F, E>(work: F) -> Self
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<anyhow::Error>,
    {
        Effect::FireAndForget(async move { work.await.map_err(Into::into) }.boxed())
    }

    pub fn task<F>(work: F) -> Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        Effect::Task(work.map(Some).boxed())
    }

    /// Map a fallible result into the feature's success or failure action.
    pub fn try_task<F, T, E, Ok, Err>(work: F, ok: Ok, err: Err) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        Ok: FnOnce(T) -> A + Send + 'static,
        Err: FnOnce(E) -> A + Send + 'static,
    {
        Effect::Task(
            async move {
                Some(match work.await {
                    Ok(value) => ok(value),
                    Err(error) => err(error),
                })
            }
            .boxed(),
        )
    }

    /// Wrap a whole `Result` into one action, e.g. `Action::Loaded(result)`.
    pub fn from_result<F, T, E, W>(work: F, wrap: W) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        W: FnOnce(Result<T, E>) -> A + Send + 'static,
    {
        Effect::Task(async move { Some(wrap(work.await)) }.boxed())
    }

    /// Run work whose failure channel is uninhabited.
    ///
    /// Features without a failure action must use this constructor, which
    /// only accepts collaborators that cannot fail.
    pub fn infallible<F, T, Ok>(work: F, ok: Ok) -> Self
    where
        F: Future<Output = Result<T, Infallible>> + Send + 'static,
        Ok: FnOnce(T) -> A + Send + 'static,
    {
        Effect::Task(
            async move {
                match work.await {
                    Ok(value) => Some(ok(value)),
                    Err(never) => match never {},
                }
            }
            .boxed(),
        )
    }

    /// Run `work`, delivering `on_timeout` instead if it takes longer than `after`.
    pub fn timeout<F>(work: F, after: Duration, on_timeout: A) -> Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        Effect::Timeout {
            task: work.map(Some).boxed(),
            after,
            on_timeout,
        }
    }

    pub fn keyframes(frames: impl IntoIterator<Item = (A, Duration)>) -> Self {
        let frames: Vec<_> = frames.into_iter().collect();
        if frames.is_empty() {
            return Effect::None;
        }
        Effect::Keyframes(frames)
    }

    pub fn concatenate(effects: impl IntoIterator<Item = Effect<A>>) -> Self {
        let mut effects: Vec<_> = effects.into_iter().filter(|e| !e.is_none()).collect();
        match effects.len() {
            0 => Effect::None,
            1 => effects.remove(0),
            _ => Effect::Concatenate(effects),
        }
    }

    pub fn merge(effects: impl IntoIterator<Item = Effect<A>>) -> Self {
        let mut effects: Vec<_> = effects.into_iter().filter(|e| !e.is_none()).collect();
        match effects.len() {
            0 => Effect::None,
            1 => effects.remove(0),
            _ => Effect::Merge(effects),
        }
    }

    pub fn cancel(id: impl Into<EffectId>) -> Self {
        Effect::Cancel(id.into())
    }

    pub fn cancellable(self, id: impl Into<EffectId>) -> Self {
        self.tagged(id.into(), false)
    }

    /// Like [`cancellable`](Effect::cancellable), but first cancels any
    /// in-flight effect already tagged with the same id.
    pub fn cancellable_in_flight(self, id: impl Into<EffectId>) -> Self {
        self.tagged(id.into(), true)
    }

    fn tagged(self, id: EffectId, cancel_in_flight: bool) -> Self {
        if self.is_none() && !cancel_in_flight {
            return Effect::None;
        }
        Effect::Cancellable {
            id,
            cancel_in_flight,
            effect: Box::new(self),
        }
    }

    /// Convert every action this effect may produce.
    ///
    /// Used when embedding a child feature's effects into its parent.
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.map_shared(Arc::new(f))
    }

    fn map_shared<B: Send + 'static>(self, f: Arc<dyn Fn(A) -> B + Send + Sync>) -> Effect<B> {
        match self {
            Effect::None => Effect::None,
            Effect::FireAndForget(work) => Effect::FireAndForget(work),
            Effect::Task(work) => Effect::Task(work.map(move |out| out.map(|a| f(a))).boxed()),
            Effect::Timeout {
                task,
                after,
                on_timeout,
            } => {
                let on_timeout = f(on_timeout);
                Effect::Timeout {
                    task: task.map(move |out| out.map(|a| f(a))).boxed(),
                    after,
                    on_timeout,
                }
            }
            Effect::Keyframes(frames) => {
                Effect::Keyframes(frames.into_iter().map(|(a, d)| (f(a), d)).collect())
            }
            Effect::Concatenate(effects) => Effect::Concatenate(
                effects
                    .into_iter()
                    .map(|e| e.map_shared(Arc::clone(&f)))
                    .collect(),
            ),
            Effect::Merge(effects) => Effect::Merge(
                effects
                    .into_iter()
                    .map(|e| e.map_shared(Arc::clone(&f)))
                    .collect(),
            ),
            Effect::Cancellable {
                id,
                cancel_in_flight,
                effect,
            } => Effect::Cancellable {
                id,
                cancel_in_flight,
                effect: Box::new(effect.map_shared(f)),
            },
            Effect::Cancel(id) => Effect::Cancel(id),
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::None => f.write_str("None"),
            Effect::FireAndForget(_) => f.write_str("FireAndForget(..)"),
            Effect::Task(_) => f.write_str("Task(..)"),
            Effect::Timeout {
                after, on_timeout, ..
            } => f
                .debug_struct("Timeout")
                .field("after", after)
                .field("on_timeout", on_timeout)
                .finish_non_exhaustive(),
            Effect::Keyframes(frames) => f.debug_tuple("Keyframes").field(frames).finish(),
            Effect::Concatenate(effects) => f.debug_tuple("Concatenate").field(effects).finish(),
            Effect::Merge(effects) => f.debug_tuple("Merge").field(effects).finish(),
            Effect::Cancellable {
                id,
                cancel_in_flight,
                effect,
            } => f
                .debug_struct("Cancellable")
                .field("id", id)
                .field("cancel_in_flight", cancel_in_flight)
                .field("effect", effect)
                .finish(),
            Effect::Cancel(id) => f.debug_tuple("Cancel").field(id).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenate_drops_none_and_unwraps_single() {
        let effect: Effect<u8> = Effect::concatenate([Effect::none(), Effect::send(1), Effect::none()]);
        assert!(matches!(effect, Effect::Task(_)));

        let empty: Effect<u8> = Effect::merge([Effect::none(), Effect::none()]);
        assert!(empty.is_none());
    }

    #[test]
    fn empty_keyframes_are_none() {
        let effect: Effect<u8> = Effect::keyframes(Vec::new());
        assert!(effect.is_none());
    }

    #[test]
    fn map_rewrites_keyframe_actions() {
        let effect = Effect::keyframes([(1u8, Duration::ZERO), (2, Duration::from_millis(5))])
            .cancellable("frames")
            .map(|n| n as u32 * 10);
        match effect {
            Effect::Cancellable { id, effect, .. } => {
                assert_eq!(id.as_str(), "frames");
                match *effect {
                    Effect::Keyframes(frames) => assert_eq!(
                        frames,
                        vec![(10, Duration::ZERO), (20, Duration::from_millis(5))]
                    ),
                    other => panic!("expected keyframes, got {other:?}"),
                }
            }
            other => panic!("expected cancellable, got {other:?}"),
        }
    }

    #[test]
    fn cancellable_none_collapses_unless_cancelling_in_flight() {
        let plain: Effect<u8> = Effect::none().cancellable("x");
        assert!(plain.is_none());

        let restart: Effect<u8> = Effect::none().cancellable_in_flight("x");
        assert!(matches!(restart, Effect::Cancellable { cancel_in_flight: true, .. }));
    }
}
