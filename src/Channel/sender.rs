// In src/Channel/sender.rs
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{PushError, SendError};
use crate::Chain::Buffer::BoundedBuffer;
use crate::Chain::{Enqueue, Segment, Tail, Terminated};

type Link<T> = Arc<Segment<BoundedBuffer<T>>>;

/// The sending half of an unbounded channel.
///
/// `send` never blocks on capacity: a full segment is replaced by one twice its
/// size. Cloning shares the producer cursor; dropping the last clone terminates
/// the channel.
pub struct Sender<T: Send> {
    tail: Tail<BoundedBuffer<T>>,
    senders: Arc<AtomicUsize>,
}

impl<T: Send> Sender<T> {
    pub(crate) fn new(tail: Tail<BoundedBuffer<T>>) -> Self {
        Self {
            tail,
            senders: Arc::new(AtomicUsize::new(1)),
        }
    }

    /// Enqueue `value`.
    ///
    /// # Returns
    /// * `Ok(())` once the value is buffered
    /// * `Err(SendError(value))` if the channel has been terminated
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        let slot = Cell::new(Some(value));
        if self.tail.with_segment(|segment| offer(&slot, segment)) {
            return Ok(());
        }
        match slot.take() {
            Some(value) => Err(SendError(value)),
            // The last attempt consumed the value before the chain was terminated.
            None => Ok(()),
        }
    }

    /// Terminate the channel. Buffered messages stay readable.
    pub fn close(&self) {
        if !self.tail.is_terminated() {
            self.tail.terminate();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tail.is_terminated()
    }

    /// Block until the channel is terminated.
    pub fn wait(&self) {
        self.tail.wait();
    }

    pub fn terminated(&self) -> Terminated {
        self.tail.terminated()
    }

    /// Capacity of the segment currently taking writes.
    pub fn capacity(&self) -> usize {
        self.tail.capacity()
    }
}

/// Try to put the value held in `slot` into `segment`.
///
/// A sealed segment means another producer grew the chain after this attempt
/// picked the segment up, so the attempt hands back a continuation for the newer
/// segment. If the continuation is handed the same sealed segment again, the
/// segment was sealed from outside the chain and is treated as full.
fn offer<'a, T: Send>(slot: &'a Cell<Option<T>>, segment: &Link<T>) -> Enqueue<'a, BoundedBuffer<T>> {
    let Some(value) = slot.take() else {
        return Enqueue::Accepted;
    };
    match segment.buffer().try_push(value) {
        Ok(()) => Enqueue::Accepted,
        Err(PushError::Full(value)) => {
            slot.set(Some(value));
            Enqueue::Full
        }
        Err(PushError::Sealed(value)) => {
            slot.set(Some(value));
            let stale = Arc::clone(segment);
            Enqueue::Stale(Box::new(move |current: &Link<T>| {
                if Arc::ptr_eq(current, &stale) {
                    Enqueue::Full
                } else {
                    offer(slot, current)
                }
            }))
        }
    }
}

impl<T: Send> Clone for Sender<T> {
    fn clone(&self) -> Self {
        self.senders.fetch_add(1, Ordering::Relaxed);
        Self {
            tail: self.tail.clone(),
            senders: Arc::clone(&self.senders),
        }
    }
}

impl<T: Send> Drop for Sender<T> {
    fn drop(&mut self) {
        if self.senders.fetch_sub(1, Ordering::AcqRel) == 1 && !self.tail.is_terminated() {
            self.tail.terminate();
        }
    }
}

impl<T: Send> std::fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender").field("tail", &self.tail).finish()
    }
}
