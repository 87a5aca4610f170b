use std::sync::Arc;

use super::segment::{Segment, SegmentBuffer};
use super::{Head, Tail};
use crate::error::Error;
use crate::Chain::Buffer::DEFAULT_CAPACITY;

pub struct ChainBuilder {
    initial_capacity: usize,
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity of the first segment; every later segment doubles the previous one.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Create the first segment through `init`, open it, and return both cursors.
    pub fn build<B, F>(self, init: F) -> Result<(Head<B>, Tail<B>), Error>
    where
        B: SegmentBuffer,
        F: Fn(usize) -> B + Send + Sync + 'static,
    {
        let capacity = self.initial_capacity;
        if capacity < 2 || !capacity.is_power_of_two() {
            return Err(Error::InvalidCapacity(capacity));
        }
        Ok(assemble(capacity, init))
    }
}

/// Start a chain whose first segment has the default capacity of 16.
pub fn chain<B, F>(init: F) -> (Head<B>, Tail<B>)
where
    B: SegmentBuffer,
    F: Fn(usize) -> B + Send + Sync + 'static,
{
    assemble(DEFAULT_CAPACITY, init)
}

fn assemble<B, F>(capacity: usize, init: F) -> (Head<B>, Tail<B>)
where
    B: SegmentBuffer,
    F: Fn(usize) -> B + Send + Sync + 'static,
{
    let first = Arc::new(Segment::new(init(capacity), capacity, 0));
    first.open();
    (Head::new(Arc::clone(&first)), Tail::new(first, Box::new(init)))
}
