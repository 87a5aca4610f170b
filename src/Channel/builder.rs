use super::{Receiver, Sender};
use crate::error::Error;
use crate::Chain::Buffer::{BoundedBuffer, DEFAULT_CAPACITY};
use crate::Chain::ChainBuilder;

pub struct ChannelBuilder {
    initial_capacity: usize,
}

impl Default for ChannelBuilder {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ChannelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn build<T: Send + 'static>(self) -> Result<(Sender<T>, Receiver<T>), Error> {
        let (head, tail) = ChainBuilder::new()
            .with_initial_capacity(self.initial_capacity)
            .build(BoundedBuffer::<T>::new)?;
        Ok((Sender::new(tail), Receiver::new(head)))
    }
}

/// Create an unbounded channel whose first segment holds 16 messages.
pub fn unbounded<T: Send + 'static>() -> (Sender<T>, Receiver<T>) {
    let (head, tail) = crate::Chain::chain(BoundedBuffer::<T>::new);
    (Sender::new(tail), Receiver::new(head))
}
