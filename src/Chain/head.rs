use parking_lot::RwLock;
use std::sync::Arc;

use super::segment::{Segment, SegmentBuffer};
use crate::Core::trace;

/// Consumer-side cursor: the segment readers are currently draining.
///
/// Clones share one cursor. Reading it takes a shared lock for the length of an
/// `Arc` clone; moving it forward is arbitrated by the segment's own lock.
pub struct Head<B> {
    current: Arc<RwLock<Arc<Segment<B>>>>,
}

impl<B> Clone for Head<B> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl<B: SegmentBuffer> Head<B> {
    pub(crate) fn new(first: Arc<Segment<B>>) -> Self {
        Self {
            current: Arc::new(RwLock::new(first)),
        }
    }

    /// The active read segment.
    pub fn current(&self) -> Arc<Segment<B>> {
        Arc::clone(&self.current.read())
    }

    /// Move past `prior` and return the segment to read next.
    ///
    /// Call only once `prior`'s buffer reported it is sealed and empty, otherwise
    /// messages still in it are skipped. Racing callers get the same segment back.
    pub fn next(&self, prior: &Arc<Segment<B>>) -> Arc<Segment<B>> {
        let next = prior.advance();
        if !Arc::ptr_eq(&next, prior) {
            let mut current = self.current.write();
            // Only move forward; a slower caller must not rewind the cursor.
            if current.index() < next.index() {
                trace::debug!(from = current.index(), to = next.index(), "head advanced");
                *current = Arc::clone(&next);
            }
        }
        next
    }
}

impl<B> std::fmt::Debug for Head<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::Debug::StructDebug::debug_head(&**self.current.read(), f)
    }
}
