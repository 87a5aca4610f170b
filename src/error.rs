use std::fmt;

/// Configuration errors raised by the builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Segment capacities are used as ring masks, so they must be a power of two and at least 2.
    #[error("invalid segment capacity {0}: must be a power of two >= 2")]
    InvalidCapacity(usize),
}

/// Returned by [`BoundedBuffer::try_push`](crate::Chain::Buffer::BoundedBuffer::try_push);
/// the rejected value is handed back.
#[derive(Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PushError<T> {
    #[error("segment is full")]
    Full(T),
    #[error("segment is sealed")]
    Sealed(T),
}

impl<T> PushError<T> {
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(v) | PushError::Sealed(v) => v,
        }
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => f.write_str("Full(..)"),
            PushError::Sealed(_) => f.write_str("Sealed(..)"),
        }
    }
}

/// The chain was terminated before the message could be enqueued.
#[derive(Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("sending on a terminated channel")]
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SendError(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TryRecvError {
    #[error("receiving on an empty channel")]
    Empty,
    #[error("channel terminated and drained")]
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecvTimeoutError {
    #[error("timed out waiting on channel")]
    Timeout,
    #[error("channel terminated and drained")]
    Disconnected,
}
