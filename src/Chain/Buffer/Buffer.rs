// Bounded per-segment ring buffer - one of these backs every segment of a chain

use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize};

/// Default capacity of the first segment of a chain.
pub const DEFAULT_CAPACITY: usize = 16;

/// A single slot in the ring buffer.
#[repr(align(64))]
pub(crate) struct Slot<T> {
    /// The sequence number of the slot. This is the core of the synchronization.
    /// - A producer claims a `tail` sequence and waits for the `sequence` in
    ///   the target slot to equal `tail`.
    /// - After writing, it sets the `sequence` to `tail + 1`, signaling completion.
    /// - A consumer waits for the `sequence` in its `head` slot to equal
    ///   `head + 1`.
    pub(crate) sequence: AtomicUsize,

    pub(crate) value: UnsafeCell<MaybeUninit<T>>,
}

/// A lock-free, fixed-capacity, multi-producer multi-consumer ring buffer with a
/// one-way "sealed" state.
///
/// ### Concurrency Design:
/// - **Producers**: claim a slot by advancing `tail` with a CAS, then publish it by
///   bumping the slot's `sequence`.
/// - **Consumers**: claim a message by advancing `head` with a CAS once the slot's
///   `sequence` says it has been published.
/// - **Sealing**: after `seal()` no new push is admitted. Pushers register in
///   `writers` before checking `sealed`, so a consumer that sees `sealed` with zero
///   writers knows nothing else can land in the ring.
/// - **Blocking**: consumers park on the `signal` futex word; producers bump it
///   and wake one waiter per push, sealing wakes everyone.
pub struct BoundedBuffer<T> {
    pub(crate) slots: Box<[Slot<T>]>,

    /// A bitmask used to wrap sequence numbers around the buffer.
    /// Calculated as `capacity - 1`.
    pub(crate) mask: usize,

    pub(crate) tail: CachePadded<AtomicUsize>,
    pub(crate) head: CachePadded<AtomicUsize>,

    /// Signal word for futex-based blocking/waking.
    pub(crate) signal: AtomicU32,

    pub(crate) sealed: AtomicBool,

    /// Pushes currently between their sealed check and their publish.
    pub(crate) writers: AtomicUsize,
}

// SAFETY: values only move between threads through the slot sequence protocol,
// each slot is owned by exactly one producer or consumer at a time.
unsafe impl<T: Send> Send for BoundedBuffer<T> {}
unsafe impl<T: Send> Sync for BoundedBuffer<T> {}
