//! Wall and virtual clocks.
//!
//! The store measures keyframe delays with a [`Clock`], and features read
//! the current time through the clock held in their environment. Tests use
//! [`TestClock`] so that time only moves when the test says so.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;

/// Source of time for reducers (via the environment) and the executor.
pub trait Clock: Send + Sync + 'static {
    /// Current wall-clock time.
    fn now(&self) -> SystemTime;

    /// Future that resolves once `duration` has elapsed on this clock.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Seconds since the Unix epoch for a clock reading.
pub fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Real time backed by Tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed()
    }
}

/// 2024-01-01T00:00:00Z
const TEST_CLOCK_START_SECS: u64 = 1_704_067_200;

/// Virtual clock that advances only through [`TestClock::advance`].
#[derive(Clone)]
pub struct TestClock {
    inner: Arc<Mutex<TestClockInner>>,
}

struct TestClockInner {
    start: SystemTime,
    elapsed: Duration,
    sleepers: Vec<(Duration, Waker)>,
}

impl TestClock {
    pub fn new() -> Self {
        Self::starting_at(UNIX_EPOCH + Duration::from_secs(TEST_CLOCK_START_SECS))
    }

    fn starting_at(start: SystemTime) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TestClockInner {
                start,
                elapsed: Duration::ZERO,
                sleepers: Vec::new(),
            })),
        }
    }

    /// Virtual time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.inner.lock().elapsed
    }

    /// Move time forward and wake every sleeper whose deadline has passed.
    pub fn advance(&self, by: Duration) {
        let expired: Vec<Waker> = {
            let mut inner = self.inner.lock();
            inner.elapsed += by;
            let now = inner.elapsed;
            let (due, pending): (Vec<_>, Vec<_>) = inner
                .sleepers
                .drain(..)
                .partition(|(deadline, _)| *deadline <= now);
            inner.sleepers = pending;
            due.into_iter().map(|(_, waker)| waker).collect()
        };
        for waker in expired {
            waker.wake();
        }
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TestClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestClock")
            .field("elapsed", &self.elapsed())
            .finish()
    }
}

impl Clock for TestClock {
    fn now(&self) -> SystemTime {
        let inner = self.inner.lock();
        inner.start + inner.elapsed
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        let deadline = self.elapsed() + duration;
        VirtualSleep {
            inner: Arc::clone(&self.inner),
            deadline,
        }
        .boxed()
    }
}

struct VirtualSleep {
    inner: Arc<Mutex<TestClockInner>>,
    deadline: Duration,
}

impl Future for VirtualSleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut inner = self.inner.lock();
        if inner.elapsed >= self.deadline {
            return Poll::Ready(());
        }
        inner.sleepers.push((self.deadline, cx.waker().clone()));
        Poll::Pending
    }
}
