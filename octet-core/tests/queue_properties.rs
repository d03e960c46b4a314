//! Ring buffer properties: model equivalence and concurrent SPSC use

use std::collections::VecDeque;

use octet_core::queue::{QueueError, RingBuffer};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Enqueue(u8),
    Dequeue,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![any::<u8>().prop_map(Op::Enqueue), Just(Op::Dequeue)]
}

/// Replay `ops` against a capacity-`N` buffer and an unbounded model
fn check_against_model<const N: usize>(ops: &[Op]) -> Result<(), TestCaseError> {
    let mut queue: RingBuffer<u8, N> = RingBuffer::new();
    let (mut producer, mut consumer) = queue.split();
    let mut model: VecDeque<u8> = VecDeque::new();

    for op in ops {
        match *op {
            Op::Enqueue(value) => {
                let result = producer.enqueue(value);
                if model.len() == N {
                    prop_assert_eq!(result, Err(QueueError::Full));
                } else {
                    prop_assert_eq!(result, Ok(()));
                    model.push_back(value);
                }
            }
            Op::Dequeue => {
                let expected = model.pop_front().ok_or(QueueError::Empty);
                prop_assert_eq!(consumer.dequeue(), expected);
            }
        }
        prop_assert!(producer.size() <= N);
        prop_assert_eq!(consumer.size(), model.len());
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_fifo_matches_model_capacity_8(ops in prop::collection::vec(op(), 0..200)) {
        check_against_model::<8>(&ops)?;
    }

    #[test]
    fn prop_fifo_matches_model_capacity_3(ops in prop::collection::vec(op(), 0..200)) {
        check_against_model::<3>(&ops)?;
    }

    #[test]
    fn prop_fifo_matches_model_capacity_1(ops in prop::collection::vec(op(), 0..50)) {
        check_against_model::<1>(&ops)?;
    }
}

#[test]
fn test_concurrent_producer_and_consumer_preserve_order() {
    const TOTAL: u32 = 100_000;
    let mut queue: RingBuffer<u32, 8> = RingBuffer::new();
    let (mut producer, mut consumer) = queue.split();

    std::thread::scope(|s| {
        s.spawn(move || {
            for value in 0..TOTAL {
                while producer.enqueue(value).is_err() {
                    std::thread::yield_now();
                }
            }
        });

        s.spawn(move || {
            let mut expected = 0;
            while expected < TOTAL {
                match consumer.dequeue() {
                    Ok(value) => {
                        assert_eq!(value, expected);
                        expected += 1;
                    }
                    Err(QueueError::Empty) => std::thread::yield_now(),
                    Err(QueueError::Full) => unreachable!(),
                }
                assert!(consumer.size() <= 8);
            }
        });
    });

    assert!(queue.is_empty());
}

#[test]
fn test_static_buffer() {
    static QUEUE: RingBuffer<u8, 4> = RingBuffer::new();

    // SAFETY: this test is the only user of QUEUE, in one thread
    unsafe {
        QUEUE.enqueue(b'a').unwrap();
        QUEUE.enqueue(b'b').unwrap();
        assert_eq!(QUEUE.size(), 2);
        assert_eq!(QUEUE.dequeue(), Ok(b'a'));
        assert_eq!(QUEUE.dequeue(), Ok(b'b'));
    }
    assert_eq!(QUEUE.capacity(), 4);
}
