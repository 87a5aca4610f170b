mod builder;
mod head;
pub mod segment;
mod tail;
mod terminate;

pub use builder::{chain, ChainBuilder};
pub use head::Head;
pub use segment::{Hooked, Segment, SegmentBuffer};
pub use tail::{Enqueue, Initializer, Retry, Tail};
pub use terminate::{Terminated, TerminatedFuture};

pub mod Buffer {
    pub mod Buffer;
    pub mod Buffer_impl;
    pub use Buffer::{BoundedBuffer, DEFAULT_CAPACITY}; // re-export for stable path
    pub use Buffer_impl::TryPop;
}
