use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::Ordering::{AcqRel, Acquire, Relaxed, Release, SeqCst};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize};
use std::time::{Duration, Instant};

use crossbeam_utils::{Backoff, CachePadded};

use super::Buffer::{BoundedBuffer, Slot};
use crate::error::{Error, PushError};
use crate::Chain::segment::SegmentBuffer;
use crate::Core::futex;

/// Result of a non-blocking pop that distinguishes "nothing yet" from "nothing ever again".
#[derive(Debug, PartialEq, Eq)]
pub enum TryPop<T> {
    Item(T),
    Empty,
    /// Sealed and fully drained.
    Closed,
}

impl<T> BoundedBuffer<T> {
    /// Create a buffer with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is less than 2 or not a power of two.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "capacity must be at least 2");
        assert!(capacity.is_power_of_two(), "capacity must be a power of 2");
        // Initialize per-slot sequence numbers to k for k in 0..capacity.
        let slots = (0..capacity)
            .map(|k| Slot {
                sequence: AtomicUsize::new(k),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            slots,
            mask: capacity - 1,
            tail: CachePadded::new(AtomicUsize::new(0)),
            head: CachePadded::new(AtomicUsize::new(0)),
            signal: AtomicU32::new(0),
            sealed: AtomicBool::new(false),
            writers: AtomicUsize::new(0),
        }
    }

    /// Fallible form of [`new`](Self::new).
    pub fn try_new(capacity: usize) -> Result<Self, Error> {
        if capacity < 2 || !capacity.is_power_of_two() {
            return Err(Error::InvalidCapacity(capacity));
        }
        Ok(Self::new(capacity))
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Approximate number of buffered values.
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Acquire);
        let head = self.head.load(Acquire);
        tail.wrapping_sub(head).min(self.capacity())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(SeqCst)
    }

    /// Stop admitting pushes and wake every parked consumer. Values already in the
    /// ring stay poppable.
    pub fn seal(&self) {
        self.sealed.store(true, SeqCst);
        self.signal.fetch_add(1, Release);
        futex::futex_wake_all(&self.signal);
    }

    /// Enqueue without blocking. Hands the value back if the ring is full or sealed.
    pub fn try_push(&self, value: T) -> Result<(), PushError<T>> {
        self.writers.fetch_add(1, SeqCst);
        if self.sealed.load(SeqCst) {
            self.writers.fetch_sub(1, Release);
            return Err(PushError::Sealed(value));
        }
        let result = self.enqueue(value);
        self.writers.fetch_sub(1, Release);
        if result.is_ok() {
            self.signal_consumer();
        }
        result.map_err(PushError::Full)
    }

    fn enqueue(&self, value: T) -> Result<(), T> {
        let backoff = Backoff::new();
        loop {
            let tail = self.tail.load(Relaxed);
            let slot = &self.slots[tail & self.mask];
            let seq = slot.sequence.load(Acquire);
            let dif = seq as isize - tail as isize;

            if dif == 0 {
                if self
                    .tail
                    .compare_exchange_weak(tail, tail + 1, AcqRel, Relaxed)
                    .is_ok()
                {
                    // We own this slot now
                    unsafe { (*slot.value.get()).write(value) };
                    // Publish
                    slot.sequence.store(tail + 1, Release);
                    return Ok(());
                }
            } else if dif < 0 {
                // full
                return Err(value);
            } else {
                // someone else is producing; backoff and retry
                backoff.spin();
            }
        }
    }

    /// Dequeue acquires a ready slot and returns its content.
    /// Returns None if the ring appears empty.
    fn dequeue(&self) -> Option<T> {
        let backoff = Backoff::new();
        loop {
            let head = self.head.load(Relaxed);
            let slot = &self.slots[head & self.mask];
            let seq = slot.sequence.load(Acquire);
            let dif = seq as isize - (head as isize + 1);

            if dif == 0 {
                if self
                    .head
                    .compare_exchange_weak(head, head + 1, AcqRel, Relaxed)
                    .is_ok()
                {
                    let value = unsafe { (*slot.value.get()).assume_init_read() };
                    // free slot for future producers
                    slot.sequence.store(head + self.capacity(), Release);
                    return Some(value);
                }
            } else if dif < 0 {
                // empty, unless a producer claimed tail but has not published yet
                if self.tail.load(Acquire) == head {
                    return None;
                }
                backoff.snooze();
            } else {
                // another consumer took it; retry
                backoff.spin();
            }
        }
    }

    /// Pop without blocking.
    pub fn try_pop(&self) -> Option<T> {
        self.dequeue()
    }

    /// Pop without blocking, reporting whether the buffer is finished for good.
    pub fn poll_pop(&self) -> TryPop<T> {
        if let Some(v) = self.dequeue() {
            return TryPop::Item(v);
        }
        if !self.is_sealed() {
            return TryPop::Empty;
        }
        // Sealed: wait out pushes that passed their sealed check before the seal.
        let backoff = Backoff::new();
        while self.writers.load(SeqCst) != 0 {
            backoff.snooze();
        }
        match self.dequeue() {
            Some(v) => TryPop::Item(v),
            None => TryPop::Closed,
        }
    }

    /// Pop, parking the thread until a value arrives. Returns `None` once the buffer
    /// is sealed and empty.
    pub fn pop_blocking(&self) -> Option<T> {
        loop {
            let observed = self.signal.load(Acquire);
            match self.poll_pop() {
                TryPop::Item(v) => return Some(v),
                TryPop::Closed => return None,
                TryPop::Empty => futex::futex_wait(&self.signal, observed),
            }
        }
    }

    /// Like [`pop_blocking`](Self::pop_blocking) with a deadline. `Err(())` means
    /// the deadline passed with the buffer still open and empty.
    pub fn pop_until(&self, deadline: Instant) -> Result<Option<T>, ()> {
        loop {
            let observed = self.signal.load(Acquire);
            match self.poll_pop() {
                TryPop::Item(v) => return Ok(Some(v)),
                TryPop::Closed => return Ok(None),
                TryPop::Empty => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining == Duration::ZERO {
                        return Err(());
                    }
                    futex::futex_wait_timeout(&self.signal, observed, remaining);
                }
            }
        }
    }

    /// Signal consumers that new data is available
    fn signal_consumer(&self) {
        self.signal.fetch_add(1, Release);
        futex::futex_wake(&self.signal);
    }
}

impl<T> Drop for BoundedBuffer<T> {
    fn drop(&mut self) {
        while self.dequeue().is_some() {}
    }
}

impl<T: Send> SegmentBuffer for BoundedBuffer<T> {
    fn close(&self) {
        self.seal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_capacity() {
        assert_eq!(
            BoundedBuffer::<u8>::try_new(3).err(),
            Some(Error::InvalidCapacity(3))
        );
        assert_eq!(
            BoundedBuffer::<u8>::try_new(1).err(),
            Some(Error::InvalidCapacity(1))
        );
        assert!(BoundedBuffer::<u8>::try_new(2).is_ok());
    }

    #[test]
    #[should_panic(expected = "capacity must be a power of 2")]
    fn new_panics_on_odd_capacity() {
        BoundedBuffer::<u8>::new(6);
    }

    #[test]
    fn full_then_free() {
        let buf = BoundedBuffer::new(4);
        for i in 0..4 {
            buf.try_push(i).unwrap();
        }
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.try_push(9), Err(PushError::Full(9)));
        assert_eq!(buf.try_pop(), Some(0));
        buf.try_push(4).unwrap();
        let drained: Vec<_> = std::iter::from_fn(|| buf.try_pop()).collect();
        assert_eq!(drained, vec![1, 2, 3, 4]);
    }

    #[test]
    fn sealed_rejects_push_but_keeps_items() {
        let buf = BoundedBuffer::new(4);
        buf.try_push("a").unwrap();
        buf.seal();
        assert!(buf.is_sealed());
        assert_eq!(buf.try_push("b"), Err(PushError::Sealed("b")));
        assert_eq!(buf.poll_pop(), TryPop::Item("a"));
        assert_eq!(buf.poll_pop(), TryPop::Closed);
        assert_eq!(buf.pop_blocking(), None);
    }

    #[test]
    fn open_empty_reports_empty() {
        let buf = BoundedBuffer::<u32>::new(2);
        assert_eq!(buf.poll_pop(), TryPop::Empty);
        let deadline = Instant::now() + Duration::from_millis(10);
        assert_eq!(buf.pop_until(deadline), Err(()));
    }

    #[test]
    fn drop_releases_buffered_values() {
        use std::sync::Arc;
        let marker = Arc::new(());
        {
            let buf = BoundedBuffer::new(8);
            for _ in 0..5 {
                buf.try_push(marker.clone()).unwrap();
            }
            assert_eq!(Arc::strong_count(&marker), 6);
        }
        assert_eq!(Arc::strong_count(&marker), 1);
    }

    #[test]
    fn blocked_consumer_wakes_on_seal() {
        use std::sync::Arc;
        let buf = Arc::new(BoundedBuffer::<u32>::new(4));
        let consumer = {
            let buf = buf.clone();
            std::thread::spawn(move || buf.pop_blocking())
        };
        std::thread::sleep(Duration::from_millis(20));
        buf.seal();
        assert_eq!(consumer.join().unwrap(), None);
    }
}
