//! Chain lifecycle logging.
//!
//! Growth, head advances, segment open/close and termination are reported at
//! `trace`/`debug` level; misuse such as a second terminate at `warn`. Build with
//! `--features tracing` to emit them; otherwise the macros compile away.

/// Install a `fmt` subscriber for chain events.
///
/// `RUST_LOG` overrides the default `dmxp_chancell=trace` filter. If a global
/// subscriber is already set this does nothing, so tests and demos can each
/// call it.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(concat!(env!("CARGO_CRATE_NAME"), "=trace")));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
pub const fn init_tracing() {}

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace, warn};

// Swallows the arguments so disabled call sites cost nothing.
#[cfg(not(feature = "tracing"))]
macro_rules! discard {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use discard as debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use discard as trace;
#[cfg(not(feature = "tracing"))]
pub(crate) use discard as warn;

#[cfg(test)]
mod tests {
    use super::{init_tracing, warn};

    #[test]
    fn init_is_repeatable() {
        init_tracing();
        init_tracing();
        warn!(reason = "test", "second init ignored");
    }
}
