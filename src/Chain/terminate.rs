// Broadcast-once termination event shared by the producer cursor and its observers

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

struct State {
    fired: bool,
    /// One slot per pending future, keyed by registration order.
    wakers: HashMap<u64, Waker>,
    next_key: u64,
}

struct Inner {
    state: Mutex<State>,
    cond: Condvar,
}

/// Observable side of a chain's termination.
///
/// Cheap to clone. Can be waited on from threads ([`wait`](Self::wait),
/// [`wait_timeout`](Self::wait_timeout)), polled with
/// [`is_terminated`](Self::is_terminated), or awaited through
/// [`terminated`](Self::terminated) so it can race other events in a `select`.
#[derive(Clone)]
pub struct Terminated {
    inner: Arc<Inner>,
}

impl Terminated {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    fired: false,
                    wakers: HashMap::new(),
                    next_key: 0,
                }),
                cond: Condvar::new(),
            }),
        }
    }

    /// Fire the event. Returns `false` if it had already fired.
    pub(crate) fn fire(&self) -> bool {
        let wakers = {
            let mut state = self.inner.state.lock();
            if state.fired {
                return false;
            }
            state.fired = true;
            std::mem::take(&mut state.wakers)
        };
        self.inner.cond.notify_all();
        for waker in wakers.into_values() {
            waker.wake();
        }
        true
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.state.lock().fired
    }

    /// Block until the event fires.
    pub fn wait(&self) {
        let mut state = self.inner.state.lock();
        while !state.fired {
            self.inner.cond.wait(&mut state);
        }
    }

    /// Block until the event fires or `timeout` elapses. Returns whether it fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };
        let mut state = self.inner.state.lock();
        while !state.fired {
            if self.inner.cond.wait_until(&mut state, deadline).timed_out() {
                return state.fired;
            }
        }
        true
    }

    /// A future that resolves once the event fires.
    pub fn terminated(&self) -> TerminatedFuture {
        TerminatedFuture {
            signal: self.clone(),
            key: None,
        }
    }
}

impl std::fmt::Debug for Terminated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminated")
            .field("fired", &self.is_terminated())
            .finish()
    }
}

/// Returned by [`Terminated::terminated`].
#[must_use = "futures do nothing unless polled"]
pub struct TerminatedFuture {
    signal: Terminated,
    key: Option<u64>,
}

impl Future for TerminatedFuture {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        let mut state = this.signal.inner.state.lock();
        if state.fired {
            return Poll::Ready(());
        }
        let key = match this.key {
            Some(key) => key,
            None => {
                let key = state.next_key;
                state.next_key += 1;
                this.key = Some(key);
                key
            }
        };
        let stale = state
            .wakers
            .get(&key)
            .map_or(true, |waker| !waker.will_wake(cx.waker()));
        if stale {
            state.wakers.insert(key, cx.waker().clone());
        }
        Poll::Pending
    }
}

impl Drop for TerminatedFuture {
    fn drop(&mut self) {
        if let Some(key) = self.key {
            self.signal.inner.state.lock().wakers.remove(&key);
        }
    }
}
