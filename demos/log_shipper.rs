//! Log shipper demo: many worker threads emit log records into one unbounded
//! MPSC queue; a single shipper thread drains them in bounded batches.
//!
//! Run with: cargo run --example log_shipper

use chunkq::UnboundedMpscQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[derive(Debug)]
struct LogRecord {
    worker: usize,
    seq: usize,
    message: String,
}

fn main() {
    let queue = Arc::new(UnboundedMpscQueue::new(256));
    let workers = 4;
    let records_per_worker = 100_000;
    let done = Arc::new(AtomicBool::new(false));

    let start = Instant::now();

    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for seq in 0..records_per_worker {
                    queue
                        .offer(LogRecord {
                            worker,
                            seq,
                            message: format!("worker {} event {}", worker, seq),
                        })
                        .expect("offer only fails on allocation failure");
                }
            })
        })
        .collect();

    let shipper = thread::spawn({
        let queue = Arc::clone(&queue);
        let done = Arc::clone(&done);
        move || {
            let mut shipped = 0usize;
            let mut batches = 0usize;
            loop {
                let drained = queue.drain(|record| {
                    // A real shipper would serialize and send here.
                    debug_assert!(!record.message.is_empty());
                    debug_assert!(record.worker < 8);
                    let _ = record.seq;
                    true
                });
                shipped += drained;
                if drained > 0 {
                    batches += 1;
                } else if done.load(Ordering::Acquire) && queue.is_empty() {
                    break;
                }
            }
            (shipped, batches)
        }
    });

    for handle in handles {
        handle.join().unwrap();
    }
    done.store(true, Ordering::Release);

    let (shipped, batches) = shipper.join().unwrap();
    let elapsed = start.elapsed();

    println!(
        "shipped {} records in {} batches over {:?} ({:.0} records/s)",
        shipped,
        batches,
        elapsed,
        shipped as f64 / elapsed.as_secs_f64()
    );
    println!("final queue state: {:?}", queue);
}
