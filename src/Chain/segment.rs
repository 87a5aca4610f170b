// One link of the chain: a bounded buffer plus the hand-off state to its successor

use parking_lot::Mutex;
use std::sync::Arc;

use crate::Core::trace;

/// Lifecycle hooks every per-segment buffer provides.
///
/// `open` runs exactly once, when the segment becomes the active read segment.
/// `close` runs exactly once, when the segment stops accepting writes.
pub trait SegmentBuffer: Send + Sync {
    fn open(&self) {}
    fn close(&self) {}
}

impl SegmentBuffer for () {}

/// Wraps a buffer with boxed `open` / `close` callbacks, for initializers that
/// prefer to attach behavior at segment creation time. The wrapped buffer's own
/// hooks run first.
pub struct Hooked<B> {
    buffer: B,
    on_open: Option<Box<dyn Fn(&B) + Send + Sync>>,
    on_close: Option<Box<dyn Fn(&B) + Send + Sync>>,
}

impl<B> Hooked<B> {
    pub fn new(buffer: B) -> Self {
        Self {
            buffer,
            on_open: None,
            on_close: None,
        }
    }

    pub fn on_open(mut self, f: impl Fn(&B) + Send + Sync + 'static) -> Self {
        self.on_open = Some(Box::new(f));
        self
    }

    pub fn on_close(mut self, f: impl Fn(&B) + Send + Sync + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    pub fn inner(&self) -> &B {
        &self.buffer
    }
}

impl<B: SegmentBuffer> SegmentBuffer for Hooked<B> {
    fn open(&self) {
        self.buffer.open();
        if let Some(f) = &self.on_open {
            f(&self.buffer);
        }
    }

    fn close(&self) {
        self.buffer.close();
        if let Some(f) = &self.on_close {
            f(&self.buffer);
        }
    }
}

/// Guarded by the segment lock.
struct Link<B> {
    next: Option<Arc<Segment<B>>>,
    drained: bool,
    closed: bool,
}

/// One bounded buffer in the chain.
///
/// `next` is written once by the producer cursor while this segment is its
/// current segment, so the chain only ever grows forward.
pub struct Segment<B> {
    buffer: B,
    capacity: usize,
    index: usize,
    link: Mutex<Link<B>>,
}

impl<B> Segment<B> {
    pub(crate) fn new(buffer: B, capacity: usize, index: usize) -> Self {
        Self {
            buffer,
            capacity,
            index,
            link: Mutex::new(Link {
                next: None,
                drained: false,
                closed: false,
            }),
        }
    }

    #[inline]
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Capacity this segment was created with.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Position in the chain, the first segment is 0.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_drained(&self) -> bool {
        self.link.lock().drained
    }

    pub fn has_next(&self) -> bool {
        self.link.lock().next.is_some()
    }

    /// Whether the segment has stopped accepting writes.
    pub fn is_closed(&self) -> bool {
        self.link.lock().closed
    }
}

impl<B: SegmentBuffer> Segment<B> {
    pub(crate) fn open(&self) {
        trace::trace!(segment = self.index, capacity = self.capacity, "segment opened");
        self.buffer.open();
    }

    /// Runs the buffer's `close` hook. Later calls are ignored.
    pub(crate) fn close(&self) {
        let already = std::mem::replace(&mut self.link.lock().closed, true);
        if already {
            trace::warn!(segment = self.index, "segment closed twice");
            return;
        }
        trace::trace!(segment = self.index, "segment closed");
        self.buffer.close();
    }

    pub(crate) fn link_next(&self, next: Arc<Segment<B>>) {
        let mut link = self.link.lock();
        debug_assert!(link.next.is_none(), "segment linked twice");
        link.next = Some(next);
    }

    /// Returns the segment to read after `self`.
    ///
    /// The first caller marks `self` drained and opens the successor; racing callers
    /// all get the same successor back. Successors that were already drained are
    /// skipped. A segment without a successor is returned unchanged.
    pub fn advance(self: &Arc<Self>) -> Arc<Segment<B>> {
        let mut segment = Arc::clone(self);
        loop {
            let next = {
                let mut link = segment.link.lock();
                let next = link.next.clone();
                if let Some(next) = &next {
                    if !link.drained {
                        link.drained = true;
                        next.open();
                    }
                }
                next
            };
            let Some(next) = next else {
                return segment;
            };
            if !next.is_drained() {
                return next;
            }
            trace::trace!(from = segment.index, to = next.index, "skipping drained segment");
            segment = next;
        }
    }
}
