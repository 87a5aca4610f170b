// Allocation tracking tests for the chain
//
// Note: Tests using dhat are marked with #[serial_test::serial] because
// dhat only allows one profiler to run at a time. They will run sequentially.
//
// cargo test --test allocation_tracking -- --nocapture

use dmxp_chancell::Channel::{unbounded, ChannelBuilder};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[test]
#[serial_test::serial]
fn steady_state_send_recv_does_not_allocate() {
    let _dhat = dhat::Profiler::builder().testing().build();

    let (tx, rx) = ChannelBuilder::new()
        .with_initial_capacity(1024)
        .build::<u64>()
        .unwrap();

    // Warm up so lazily initialised thread state is out of the way.
    tx.send(0).unwrap();
    assert_eq!(rx.recv(), Some(0));

    let before = dhat::HeapStats::get();
    for i in 0..10_000u64 {
        tx.send(i).unwrap();
        assert_eq!(rx.recv(), Some(i));
    }
    let after = dhat::HeapStats::get();

    dhat::assert_eq!(after.total_blocks, before.total_blocks);
}

#[test]
#[serial_test::serial]
fn growth_allocates_one_segment_at_a_time() {
    let _dhat = dhat::Profiler::builder().testing().build();

    let (tx, rx) = unbounded::<u64>();
    let before = dhat::HeapStats::get();
    for i in 0..16u64 {
        tx.send(i).unwrap();
    }
    let filled = dhat::HeapStats::get();
    dhat::assert_eq!(filled.total_blocks, before.total_blocks);

    tx.send(16).unwrap();
    let grown = dhat::HeapStats::get();
    // The new segment (Arc) and its slot array.
    dhat::assert!(grown.total_blocks > filled.total_blocks);
    dhat::assert!(grown.total_blocks - filled.total_blocks <= 3);

    assert_eq!(rx.try_iter().count(), 17);
    // Once the reader leaves the first segment it is freed.
    let drained = dhat::HeapStats::get();
    dhat::assert!(drained.curr_blocks < grown.curr_blocks);
}
