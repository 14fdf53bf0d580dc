//! Property-based tests for the MPSC queue using proptest
//!
//! These tests verify that the queue maintains its invariants across chunk
//! sizes, growth policies, and operation mixes.

use crate::queue::growth::DoublingChunks;
use crate::queue::mpsc::UnboundedMpscQueue;
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;
use std::vec::Vec;

/// Property: FIFO ordering survives any chunk size
mod fifo_properties {
    use super::*;

    proptest! {
        #[test]
        fn test_fifo_single_thread(
            chunk_size in 2usize..64,
            elements in prop::collection::vec(any::<i32>(), 0..500)
        ) {
            let queue: UnboundedMpscQueue<i32> = UnboundedMpscQueue::new(chunk_size);

            for &value in &elements {
                prop_assert!(queue.offer(value).is_ok());
            }
            for &expected in &elements {
                prop_assert_eq!(queue.poll(), Some(expected));
            }
            prop_assert_eq!(queue.poll(), None);
            prop_assert!(queue.is_empty());
        }

        #[test]
        fn test_fifo_interleaved_offer_poll(
            chunk_size in 2usize..32,
            operations in prop::collection::vec(prop::bool::weighted(0.6), 1..400)
        ) {
            let queue: UnboundedMpscQueue<usize> = UnboundedMpscQueue::new(chunk_size);
            let mut next_in = 0;
            let mut next_out = 0;

            for &should_offer in &operations {
                if should_offer {
                    prop_assert!(queue.offer(next_in).is_ok());
                    next_in += 1;
                } else if let Some(value) = queue.poll() {
                    // Single consumer sees its own offers strictly in order.
                    prop_assert_eq!(value, next_out);
                    next_out += 1;
                }
                prop_assert_eq!(queue.len(), next_in - next_out);
            }
        }
    }
}

/// Property: growth is transparent to the consumer
mod growth_properties {
    use super::*;

    proptest! {
        #[test]
        fn test_growth_count_matches_boundaries(
            chunk_size in 2usize..32,
            extra in 0usize..100
        ) {
            let queue: UnboundedMpscQueue<usize> = UnboundedMpscQueue::new(chunk_size);
            let chunk_size = queue.initial_chunk_size();
            let elements_per_chunk = chunk_size - 1;
            let total = elements_per_chunk + extra;

            for i in 0..total {
                prop_assert!(queue.offer(i).is_ok());
            }

            // One growth event per claimed boundary index, plus the initial
            // chunk. The boundary of chunk k sits at index (k + 1) * (C - 1).
            let expected_chunks = 1 + (total - 1) / elements_per_chunk;
            prop_assert_eq!(queue.metrics().segments_allocated, expected_chunks);

            for i in 0..total {
                prop_assert_eq!(queue.poll(), Some(i));
            }
        }

        #[test]
        fn test_doubling_policy_transparent(
            initial in 2usize..16,
            max in 16usize..128,
            count in 1usize..800
        ) {
            let queue: UnboundedMpscQueue<usize, _> =
                UnboundedMpscQueue::with_policy(initial, DoublingChunks::new(max));

            for i in 0..count {
                prop_assert!(queue.offer(i).is_ok());
            }
            for i in 0..count {
                prop_assert_eq!(queue.poll(), Some(i));
            }
            prop_assert!(queue.is_empty());

            let metrics = queue.metrics();
            prop_assert!(metrics.current_chunk_size <= max.next_power_of_two());
        }
    }
}

/// Property: concurrent producers deliver exactly once
mod concurrent_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]
        #[test]
        fn test_concurrent_exactly_once(
            num_producers in 2usize..6,
            items_per_producer in 10usize..200,
            chunk_size in 2usize..32
        ) {
            let queue = Arc::new(UnboundedMpscQueue::<usize>::new(chunk_size));
            let mut handles = Vec::new();

            for producer_id in 0..num_producers {
                let queue = Arc::clone(&queue);
                handles.push(thread::spawn(move || {
                    for i in 0..items_per_producer {
                        queue.offer(producer_id * items_per_producer + i).unwrap();
                    }
                }));
            }

            let consumer = thread::spawn({
                let queue = Arc::clone(&queue);
                move || {
                    let total = num_producers * items_per_producer;
                    let mut received = Vec::with_capacity(total);
                    while received.len() < total {
                        if let Some(value) = queue.poll() {
                            received.push(value);
                        } else {
                            thread::yield_now();
                        }
                    }
                    received
                }
            });

            for handle in handles {
                handle.join().unwrap();
            }
            let mut received = consumer.join().unwrap();

            let expected_total = num_producers * items_per_producer;
            prop_assert_eq!(received.len(), expected_total);

            received.sort_unstable();
            received.dedup();
            prop_assert_eq!(received.len(), expected_total);
        }
    }
}

/// Property: edge cases and boundary conditions
mod edge_case_properties {
    use super::*;

    proptest! {
        #[test]
        fn test_empty_queue_operations(polls in 0usize..50) {
            let queue: UnboundedMpscQueue<i32> = UnboundedMpscQueue::new(16);

            for _ in 0..polls {
                prop_assert_eq!(queue.poll(), None);
                prop_assert_eq!(queue.peek(), None);
            }
            prop_assert!(queue.is_empty());
            prop_assert_eq!(queue.len(), 0);
        }

        #[test]
        fn test_minimum_chunk_size(count in 1usize..200) {
            // One element per chunk: the degenerate all-boundaries case.
            let queue: UnboundedMpscQueue<usize> = UnboundedMpscQueue::new(2);

            for i in 0..count {
                prop_assert!(queue.offer(i).is_ok());
            }
            for i in 0..count {
                prop_assert_eq!(queue.poll(), Some(i));
            }
            prop_assert_eq!(queue.poll(), None);
        }

        #[test]
        fn test_no_memory_leaks(
            offers in 1usize..200,
            polls in 0usize..200
        ) {
            use std::sync::atomic::{AtomicUsize, Ordering};

            let drops = Arc::new(AtomicUsize::new(0));

            struct DropTracker(Arc<AtomicUsize>);

            impl Drop for DropTracker {
                fn drop(&mut self) {
                    self.0.fetch_add(1, Ordering::Relaxed);
                }
            }

            let queue: UnboundedMpscQueue<DropTracker> = UnboundedMpscQueue::new(4);

            for _ in 0..offers {
                queue.offer(DropTracker(Arc::clone(&drops))).unwrap();
            }
            for _ in 0..polls.min(offers) {
                drop(queue.poll());
            }
            drop(queue);

            prop_assert_eq!(drops.load(Ordering::Relaxed), offers);
        }
    }
}
