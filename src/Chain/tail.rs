use parking_lot::RwLock;
use std::sync::Arc;

use super::segment::{Segment, SegmentBuffer};
use super::terminate::Terminated;
use crate::Core::trace;

/// Continuation handed back by an attempt that found its segment stale.
pub type Retry<'a, B> = Box<dyn FnMut(&Arc<Segment<B>>) -> Enqueue<'a, B> + 'a>;

/// Outcome of one enqueue attempt against a segment.
pub enum Enqueue<'a, B> {
    /// The message is in the segment.
    Accepted,
    /// The segment has no room; the tail grows the chain and retries the original attempt.
    Full,
    /// The segment is behind the tail's current one; retry with this continuation.
    Stale(Retry<'a, B>),
}

/// Builds the buffer for a new segment of the given capacity.
pub type Initializer<B> = Box<dyn Fn(usize) -> B + Send + Sync>;

struct Cursor<B> {
    /// `None` once terminated.
    segment: Option<Arc<Segment<B>>>,
    capacity: usize,
}

struct Inner<B> {
    cursor: RwLock<Cursor<B>>,
    init: Initializer<B>,
    terminated: Terminated,
}

/// Producer-side cursor: the segment producers currently write into.
///
/// Clones share one cursor.
pub struct Tail<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for Tail<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: SegmentBuffer> Tail<B> {
    pub(crate) fn new(first: Arc<Segment<B>>, init: Initializer<B>) -> Self {
        let capacity = first.capacity();
        Self {
            inner: Arc::new(Inner {
                cursor: RwLock::new(Cursor {
                    segment: Some(first),
                    capacity,
                }),
                init,
                terminated: Terminated::new(),
            }),
        }
    }

    /// Run `attempt` against the current segment until it is accepted.
    ///
    /// `Full` grows the chain and re-runs `attempt`; `Stale(retry)` re-runs with
    /// `retry` instead. The attempt runs under the cursor's shared lock, so it
    /// must not block on the buffer. Returns `false` only if the chain was
    /// terminated when an attempt was due.
    pub fn with_segment<'a, F>(&self, mut attempt: F) -> bool
    where
        F: FnMut(&Arc<Segment<B>>) -> Enqueue<'a, B>,
    {
        let mut retry: Option<Retry<'a, B>> = None;
        loop {
            let cursor = self.inner.cursor.read();
            let Some(segment) = cursor.segment.as_ref() else {
                return false;
            };
            let outcome = match retry.as_mut() {
                Some(retry) => retry(segment),
                None => attempt(segment),
            };
            let segment = Arc::clone(segment);
            drop(cursor);

            match outcome {
                Enqueue::Accepted => return true,
                Enqueue::Full => {
                    self.grow(&segment);
                    retry = None;
                }
                Enqueue::Stale(next) => retry = Some(next),
            }
        }
    }

    /// Replace `stale` with a segment of twice the capacity, unless another
    /// producer already did.
    pub fn grow(&self, stale: &Arc<Segment<B>>) {
        let mut cursor = self.inner.cursor.write();
        match cursor.segment.as_ref() {
            Some(current) if Arc::ptr_eq(current, stale) => {}
            _ => return,
        }
        cursor.capacity *= 2;
        let fresh = Arc::new(Segment::new(
            (self.inner.init)(cursor.capacity),
            cursor.capacity,
            stale.index() + 1,
        ));
        stale.link_next(Arc::clone(&fresh));
        cursor.segment = Some(fresh);
        trace::debug!(
            segment = stale.index() + 1,
            capacity = cursor.capacity,
            "chain grew"
        );
        stale.close();
    }

    /// Stop accepting writes and fire the termination signal.
    ///
    /// The final segment is closed so readers can observe end-of-stream; messages
    /// already buffered stay readable. Calling this twice is a caller bug: the
    /// second call only logs a warning.
    pub fn terminate(&self) {
        let last = self.inner.cursor.write().segment.take();
        match last {
            Some(last) => {
                trace::debug!(segment = last.index(), "chain terminated");
                last.close();
            }
            None => {
                trace::warn!("chain terminated twice");
            }
        }
        self.inner.terminated.fire();
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.cursor.read().segment.is_none()
    }

    /// Block until [`terminate`](Self::terminate) has been called.
    pub fn wait(&self) {
        self.inner.terminated.wait();
    }

    /// Handle on the termination event, for timed waits and `select`-style races.
    pub fn terminated(&self) -> Terminated {
        self.inner.terminated.clone()
    }

    /// Capacity of the segment producers currently write into (or of the last
    /// one, once terminated).
    pub fn capacity(&self) -> usize {
        self.inner.cursor.read().capacity
    }

    /// The segment producers currently write into, `None` once terminated.
    pub fn current(&self) -> Option<Arc<Segment<B>>> {
        self.inner.cursor.read().segment.clone()
    }
}

impl<B> std::fmt::Debug for Tail<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cursor = self.inner.cursor.read();
        crate::Debug::StructDebug::debug_tail(cursor.segment.as_deref(), cursor.capacity, f)
    }
}
