// src/Channel/receiver.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{RecvTimeoutError, TryRecvError};
use crate::Chain::Buffer::{BoundedBuffer, TryPop};
use crate::Chain::{Head, Segment};

/// The receiving half of an unbounded channel.
///
/// Clones share the consumer cursor, so any number of threads can drain the
/// same channel. Each message is delivered to exactly one receiver.
pub struct Receiver<T: Send> {
    head: Head<BoundedBuffer<T>>,
}

impl<T: Send> Receiver<T> {
    pub(crate) fn new(head: Head<BoundedBuffer<T>>) -> Self {
        Self { head }
    }

    /// Move past an exhausted segment. `None` means the chain ends here.
    fn step(&self, exhausted: &Arc<Segment<BoundedBuffer<T>>>) -> Option<()> {
        let next = self.head.next(exhausted);
        (!Arc::ptr_eq(&next, exhausted)).then_some(())
    }

    /// Receives a message, blocking until one is available.
    ///
    /// Returns `None` once the channel has been terminated and every buffered
    /// message has been received.
    pub fn recv(&self) -> Option<T> {
        loop {
            let segment = self.head.current();
            match segment.buffer().pop_blocking() {
                Some(value) => return Some(value),
                None => self.step(&segment)?,
            }
        }
    }

    /// Receives a message if one is available right now.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        loop {
            let segment = self.head.current();
            match segment.buffer().poll_pop() {
                TryPop::Item(value) => return Ok(value),
                TryPop::Empty => return Err(TryRecvError::Empty),
                TryPop::Closed => {
                    if self.step(&segment).is_none() {
                        return Err(TryRecvError::Disconnected);
                    }
                }
            }
        }
    }

    /// Receives a message, waiting up to `timeout`.
    ///
    /// A timeout too large to express as a deadline waits like [`recv`](Self::recv).
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.recv().ok_or(RecvTimeoutError::Disconnected);
        };
        loop {
            let segment = self.head.current();
            match segment.buffer().pop_until(deadline) {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {
                    if self.step(&segment).is_none() {
                        return Err(RecvTimeoutError::Disconnected);
                    }
                }
                Err(()) => return Err(RecvTimeoutError::Timeout),
            }
        }
    }

    /// Blocking iterator that ends when the channel is terminated and drained.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { receiver: self }
    }

    /// Iterator over the messages available without blocking.
    pub fn try_iter(&self) -> TryIter<'_, T> {
        TryIter { receiver: self }
    }

    /// Capacity of the segment currently being read.
    pub fn capacity(&self) -> usize {
        self.head.current().capacity()
    }
}

impl<T: Send> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
        }
    }
}

impl<T: Send> std::fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver").field("head", &self.head).finish()
    }
}

pub struct Iter<'a, T: Send> {
    receiver: &'a Receiver<T>,
}

impl<T: Send> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.receiver.recv()
    }
}

pub struct TryIter<'a, T: Send> {
    receiver: &'a Receiver<T>,
}

impl<T: Send> Iterator for TryIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

impl<'a, T: Send> IntoIterator for &'a Receiver<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
