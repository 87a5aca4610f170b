mod builder;
mod receiver;
mod sender;

pub use builder::{unbounded, ChannelBuilder};
pub use receiver::{Iter, Receiver, TryIter};
pub use sender::Sender;
