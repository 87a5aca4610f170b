use dmxp_chancell::Channel::{unbounded, ChannelBuilder};
use dmxp_chancell::{RecvTimeoutError, SendError, TryRecvError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn send_recv_in_order_across_growth() {
    let (tx, rx) = unbounded::<u64>();
    for i in 0..1000 {
        tx.send(i).unwrap();
    }
    // 16 + 32 + 64 + 128 + 256 + 512 >= 1000
    assert_eq!(tx.capacity(), 512);
    for i in 0..1000 {
        assert_eq!(rx.recv(), Some(i));
    }
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
}

#[test]
fn send_after_close_returns_value() {
    let (tx, rx) = unbounded::<String>();
    tx.send("kept".to_string()).unwrap();
    tx.close();
    assert!(tx.is_closed());

    let err = tx.send("lost".to_string()).unwrap_err();
    assert_eq!(err, SendError("lost".to_string()));
    assert_eq!(err.into_inner(), "lost");

    assert_eq!(rx.recv().as_deref(), Some("kept"));
    assert_eq!(rx.recv(), None);
    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
}

#[test]
fn dropping_last_sender_terminates() {
    let (tx, rx) = unbounded::<u32>();
    let tx2 = tx.clone();
    let signal = tx.terminated();
    tx.send(1).unwrap();
    drop(tx);
    assert!(!signal.is_terminated());
    tx2.send(2).unwrap();
    drop(tx2);
    assert!(signal.is_terminated());
    assert_eq!(rx.iter().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn recv_timeout_reports_timeout_then_disconnect() {
    let (tx, rx) = unbounded::<u32>();
    let start = Instant::now();
    assert_eq!(
        rx.recv_timeout(Duration::from_millis(20)),
        Err(RecvTimeoutError::Timeout)
    );
    assert!(start.elapsed() >= Duration::from_millis(20));

    tx.send(7).unwrap();
    assert_eq!(rx.recv_timeout(Duration::from_millis(20)), Ok(7));
    drop(tx);
    assert_eq!(
        rx.recv_timeout(Duration::from_millis(20)),
        Err(RecvTimeoutError::Disconnected)
    );
}

#[test]
fn unbounded_timeouts_behave_like_blocking_calls() {
    let (tx, rx) = unbounded::<u32>();
    tx.send(1).unwrap();
    assert_eq!(rx.recv_timeout(Duration::MAX), Ok(1));

    let late = {
        let tx = tx.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            tx.send(2).unwrap();
        })
    };
    assert_eq!(rx.recv_timeout(Duration::MAX), Ok(2));
    late.join().unwrap();

    tx.close();
    assert!(tx.terminated().wait_timeout(Duration::MAX));
    assert_eq!(
        rx.recv_timeout(Duration::MAX),
        Err(RecvTimeoutError::Disconnected)
    );
}

#[test]
fn blocked_receiver_wakes_on_send_and_close() {
    let (tx, rx) = unbounded::<u32>();
    let consumer = thread::spawn(move || rx.iter().collect::<Vec<_>>());
    thread::sleep(Duration::from_millis(10));
    for i in 0..40 {
        tx.send(i).unwrap();
        if i % 10 == 0 {
            thread::sleep(Duration::from_millis(1));
        }
    }
    tx.close();
    assert_eq!(consumer.join().unwrap(), (0..40).collect::<Vec<_>>());
}

#[test]
fn builder_sets_first_segment() {
    assert!(ChannelBuilder::new()
        .with_initial_capacity(0)
        .build::<u8>()
        .is_err());
    let (tx, rx) = ChannelBuilder::new()
        .with_initial_capacity(2)
        .build::<u8>()
        .unwrap();
    assert_eq!(rx.capacity(), 2);
    for i in 0..3 {
        tx.send(i).unwrap();
    }
    assert_eq!(tx.capacity(), 4);
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    // The reader moved onto the second segment.
    assert_eq!(rx.capacity(), 4);
}

#[test]
fn per_producer_fifo_with_single_consumer() {
    let producers = 4u64;
    let per_producer = 5_000u64;
    let (tx, rx) = unbounded::<(u64, u64)>();

    let handles: Vec<_> = (0..producers)
        .map(|p| {
            let tx = tx.clone();
            thread::spawn(move || {
                for i in 0..per_producer {
                    tx.send((p, i)).unwrap();
                    if fastrand::u8(..) == 0 {
                        thread::yield_now();
                    }
                }
            })
        })
        .collect();
    drop(tx);

    let mut next = vec![0u64; producers as usize];
    for (p, i) in rx.iter() {
        assert_eq!(next[p as usize], i, "producer {p} out of order");
        next[p as usize] += 1;
    }
    for h in handles {
        h.join().unwrap();
    }
    assert!(next.iter().all(|&n| n == per_producer));
}

#[test]
fn mpmc_no_loss_no_duplication() {
    let producers = 4u64;
    let consumers = 4;
    let per_producer = 10_000u64;
    let (tx, rx) = unbounded::<u64>();

    let mut handles = vec![];
    for p in 0..producers {
        let tx = tx.clone();
        handles.push(thread::spawn(move || {
            for i in 0..per_producer {
                tx.send(p * per_producer + i).unwrap();
            }
        }));
    }
    drop(tx);

    let received = Arc::new(AtomicU64::new(0));
    let readers: Vec<_> = (0..consumers)
        .map(|_| {
            let rx = rx.clone();
            let received = received.clone();
            thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(v) = rx.recv() {
                    received.fetch_add(1, Ordering::Relaxed);
                    seen.push(v);
                }
                seen
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    let mut all = HashSet::new();
    for r in readers {
        for v in r.join().unwrap() {
            assert!(all.insert(v), "duplicate {v}");
        }
    }
    assert_eq!(received.load(Ordering::SeqCst), producers * per_producer);
    assert_eq!(all.len() as u64, producers * per_producer);
}

#[test]
fn completed_send_is_seen_before_later_send() {
    // A send that returned before another began must be received first, even
    // when the two come from different threads and straddle a growth.
    let (tx, rx) = ChannelBuilder::new()
        .with_initial_capacity(2)
        .build::<u32>()
        .unwrap();
    for round in 0..200u32 {
        let tx_a = tx.clone();
        thread::spawn(move || tx_a.send(round * 2).unwrap())
            .join()
            .unwrap();
        let tx_b = tx.clone();
        thread::spawn(move || tx_b.send(round * 2 + 1).unwrap())
            .join()
            .unwrap();
    }
    drop(tx);
    assert_eq!(rx.iter().collect::<Vec<_>>(), (0..400).collect::<Vec<_>>());
}
