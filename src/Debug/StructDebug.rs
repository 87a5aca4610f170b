use std::fmt;

use crate::Chain::Buffer::BoundedBuffer;
use crate::Chain::Segment;

/// Debug function for Segment
///
/// Shows the segment's chain position, capacity and hand-off state without
/// touching the buffer contents.
pub fn debug_segment<B>(segment: &Segment<B>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Segment")
        .field("index", &segment.index())
        .field("capacity", &segment.capacity())
        .field("drained", &segment.is_drained())
        .field("has_next", &segment.has_next())
        .finish_non_exhaustive()
}

/// Debug function for Head
pub fn debug_head<B>(current: &Segment<B>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Head")
        .field("segment", &current.index())
        .field("capacity", &current.capacity())
        .finish()
}

/// Debug function for Tail
///
/// A terminated tail has no current segment.
pub fn debug_tail<B>(
    current: Option<&Segment<B>>,
    capacity: usize,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.debug_struct("Tail")
        .field("segment", &current.map(|s| s.index()))
        .field("capacity", &capacity)
        .field("terminated", &current.is_none())
        .finish()
}

/// Debug function for BoundedBuffer
///
/// Reports counters only; values are never read.
pub fn debug_bounded_buffer<T>(buffer: &BoundedBuffer<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BoundedBuffer")
        .field("capacity", &buffer.capacity())
        .field("len", &buffer.len())
        .field("sealed", &buffer.is_sealed())
        .finish_non_exhaustive()
}

impl<B> fmt::Debug for Segment<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_segment(self, f)
    }
}

impl<T> fmt::Debug for BoundedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_bounded_buffer(self, f)
    }
}
