//! Live store: owns one state value and serializes every action through
//! its reducer on a single Tokio task.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use thiserror::Error;
use tokio::sync::{mpsc, watch, Notify};

use super::action::Action;
use super::cancel::EffectId;
use super::clock::{Clock, SystemClock};
use super::executor::Executor;
use super::reducer::Reducer;
use crate::shutdown::ShutdownHandle;

/// Errors returned by [`Store`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store is shut down")]
    Closed,
}

/// Runtime object serializing action application against one state.
///
/// `send` may be called from any task or thread; actions are applied in
/// send order, one at a time. Effect completions enter through the same
/// queue. Cloning yields another handle to the same store.
pub struct Store<R: Reducer> {
    sender: mpsc::UnboundedSender<R::Action>,
    state: watch::Receiver<R::State>,
    executor: Executor,
    work: Arc<WorkTracker>,
    shutdown: ShutdownHandle,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            state: self.state.clone(),
            executor: self.executor.clone(),
            work: Arc::clone(&self.work),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<R: Reducer> Store<R> {
    /// Create a store measuring effect delays on the wall clock.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(initial: R::State, reducer: R, env: R::Environment) -> Self {
        Self::with_clock(initial, reducer, env, Arc::new(SystemClock))
    }

    pub fn with_clock(
        initial: R::State,
        reducer: R,
        env: R::Environment,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(initial.clone());
        let executor = Executor::new(clock);
        let work = Arc::new(WorkTracker::default());
        let shutdown = ShutdownHandle::new();

        let dispatch = DispatchLoop {
            reducer,
            env,
            state: initial,
            receiver,
            sender: sender.clone(),
            state_tx,
            executor: executor.clone(),
            work: Arc::clone(&work),
            shutdown: shutdown.clone(),
        };
        tokio::spawn(dispatch.run());

        Self {
            sender,
            state: state_rx,
            executor,
            work,
            shutdown,
        }
    }

    /// Queue an action for the reducer.
    pub fn send(&self, action: R::Action) -> Result<(), StoreError> {
        if self.shutdown.is_shutting_down() {
            return Err(StoreError::Closed);
        }
        self.work.begin();
        self.sender.send(action).map_err(|_| {
            self.work.end();
            StoreError::Closed
        })
    }

    /// Snapshot of the most recently published state.
    pub fn state(&self) -> R::State {
        self.state.borrow().clone()
    }

    /// Receiver notified whenever a reduced action changes the state.
    pub fn subscribe(&self) -> watch::Receiver<R::State> {
        self.state.clone()
    }

    /// Wait until no action is queued and no effect is running.
    ///
    /// Returns early if the store shuts down.
    pub async fn settled(&self) {
        tokio::select! {
            _ = self.work.idle() => {}
            _ = self.shutdown.wait() => {}
        }
    }

    /// Stop delivery from effects tagged `id`. Returns how many were stopped.
    pub fn cancel(&self, id: &EffectId) -> usize {
        self.executor.registry().cancel(id)
    }

    /// Stop the dispatch loop and abort in-flight effects.
    pub fn shutdown(&self) {
        if self.shutdown.signal() {
            self.executor.registry().cancel_all();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_shutting_down()
    }
}

struct DispatchLoop<R: Reducer> {
    reducer: R,
    env: R::Environment,
    state: R::State,
    receiver: mpsc::UnboundedReceiver<R::Action>,
    sender: mpsc::UnboundedSender<R::Action>,
    state_tx: watch::Sender<R::State>,
    executor: Executor,
    work: Arc<WorkTracker>,
    shutdown: ShutdownHandle,
}

impl<R: Reducer> DispatchLoop<R> {
    async fn run(mut self) {
        loop {
            let action = tokio::select! {
                biased;
                _ = self.shutdown.wait() => break,
                next = self.receiver.recv() => match next {
                    Some(action) => action,
                    None => break,
                },
            };

            tracing::debug!(?action, "Dispatching action");
            let current = std::mem::take(&mut self.state);
            let (next, effect) = self.reducer.reduce(current, action, &self.env);
            self.state = next;
            self.state_tx.send_if_modified(|published| {
                if *published == self.state {
                    return false;
                }
                *published = self.state.clone();
                true
            });

            if let Some(stream) = self.executor.start(effect) {
                spawn_effect(stream, self.sender.clone(), Arc::clone(&self.work), self.shutdown.clone());
            }
            self.work.end();
        }
        self.executor.registry().cancel_all();
        tracing::debug!("Dispatch loop stopped");
    }
}

fn spawn_effect<A: Action>(
    stream: BoxStream<'static, A>,
    sender: mpsc::UnboundedSender<A>,
    work: Arc<WorkTracker>,
    shutdown: ShutdownHandle,
) {
    work.begin();
    tokio::spawn(async move {
        let _done = scopeguard::guard(Arc::clone(&work), |work| work.end());
        let stop = async move { shutdown.wait().await };
        let stream = stream.take_until(stop);
        tokio::pin!(stream);
        while let Some(action) = stream.next().await {
            work.begin();
            if sender.send(action).is_err() {
                work.end();
                break;
            }
        }
    });
}

/// Counts queued actions plus running effects.
#[derive(Default)]
struct WorkTracker {
    pending: AtomicUsize,
    idle: Notify,
}

impl WorkTracker {
    fn begin(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    fn end(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }

    async fn idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}
