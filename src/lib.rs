//! An unbounded multi-producer multi-consumer queue built from a chain of
//! bounded buffers.
//!
//! Producers write into the newest segment through a [`Tail`](Chain::Tail);
//! when it fills up, the tail links in a segment of twice the capacity and
//! seals the old one. Consumers walk the chain through a [`Head`](Chain::Head),
//! moving on only once a segment is sealed and empty, so FIFO order holds
//! across segments.
//!
//! [`Channel`] packages the chain with [`BoundedBuffer`](Chain::Buffer::BoundedBuffer)
//! segments into a typed `Sender` / `Receiver` pair.

// Module naming follows project convention
#[allow(non_snake_case)]
pub mod Chain;
#[allow(non_snake_case)]
pub mod Channel;
#[allow(non_snake_case)]
pub mod Core {
    pub mod futex;
    pub mod trace;
    pub use trace::init_tracing;
}
#[allow(non_snake_case)]
pub mod Debug {
    pub mod StructDebug;
}
pub mod error;

pub use error::{Error, PushError, RecvTimeoutError, SendError, TryRecvError};
