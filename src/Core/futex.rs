use std::sync::atomic::AtomicU32;
use std::time::Duration;

#[cfg(target_os = "linux")]
pub fn futex_wait(atomic: &AtomicU32, expected: u32) {
    futex_wait_inner(atomic, expected, None);
}

/// Like [`futex_wait`] but gives up after `timeout`. Spurious returns are allowed,
/// callers must re-check their condition.
#[cfg(target_os = "linux")]
pub fn futex_wait_timeout(atomic: &AtomicU32, expected: u32, timeout: Duration) {
    futex_wait_inner(atomic, expected, Some(timeout));
}

#[cfg(target_os = "linux")]
fn futex_wait_inner(atomic: &AtomicU32, expected: u32, timeout: Option<Duration>) {
    use std::ptr;
    use std::sync::atomic::Ordering;

    // Check condition first to avoid syscall if possible
    if atomic.load(Ordering::Relaxed) != expected {
        return;
    }

    let ts = timeout.map(|d| libc::timespec {
        tv_sec: d.as_secs().min(libc::time_t::MAX as u64) as libc::time_t,
        tv_nsec: d.subsec_nanos() as libc::c_long,
    });
    let ts_ptr = ts
        .as_ref()
        .map_or(ptr::null::<libc::timespec>(), |ts| ts as *const libc::timespec);

    unsafe {
        libc::syscall(
            libc::SYS_futex,
            atomic as *const AtomicU32 as *const u32,
            libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
            expected,
            ts_ptr,
            ptr::null::<u32>(),
            0u32,
        );
    }
}

#[cfg(target_os = "linux")]
pub fn futex_wake(atomic: &AtomicU32) {
    futex_wake_n(atomic, 1);
}

/// Wakes every thread parked on `atomic`. Used when a buffer is sealed, since all
/// blocked consumers have to observe end-of-segment.
#[cfg(target_os = "linux")]
pub fn futex_wake_all(atomic: &AtomicU32) {
    futex_wake_n(atomic, i32::MAX);
}

#[cfg(target_os = "linux")]
fn futex_wake_n(atomic: &AtomicU32, n: i32) {
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            atomic as *const AtomicU32 as *const u32,
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            n,
            std::ptr::null::<libc::timespec>(),
            std::ptr::null::<u32>(),
            0u32,
        );
    }
}

#[cfg(not(target_os = "linux"))]
pub fn futex_wait(_atomic: &AtomicU32, _expected: u32) {
    // Fallback for non-Linux: busy wait with yield
    std::thread::yield_now();
}

#[cfg(not(target_os = "linux"))]
pub fn futex_wait_timeout(_atomic: &AtomicU32, _expected: u32, _timeout: Duration) {
    std::thread::yield_now();
}

#[cfg(not(target_os = "linux"))]
pub fn futex_wake(_atomic: &AtomicU32) {
    // No-op on non-Linux
}

#[cfg(not(target_os = "linux"))]
pub fn futex_wake_all(_atomic: &AtomicU32) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn wait_returns_immediately_on_mismatch() {
        let word = AtomicU32::new(7);
        let start = Instant::now();
        futex_wait(&word, 3);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn timed_wait_gives_up() {
        let word = AtomicU32::new(0);
        let start = Instant::now();
        futex_wait_timeout(&word, 0, Duration::from_millis(20));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn wake_all_releases_waiters() {
        let word = Arc::new(AtomicU32::new(0));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let word = word.clone();
            handles.push(thread::spawn(move || {
                while word.load(Ordering::Acquire) == 0 {
                    futex_wait(&word, 0);
                }
            }));
        }
        thread::sleep(Duration::from_millis(20));
        word.store(1, Ordering::Release);
        futex_wake_all(&word);
        for h in handles {
            h.join().unwrap();
        }
    }
}
