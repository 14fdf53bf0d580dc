//! # ChunkQ
//!
//! A lock-free, multi-producer/single-consumer (MPSC) queue whose storage grows
//! on demand by linking fixed-size array chunks, never by copying elements.
//!
//! ## Features
//!
//! - **Unbounded MPSC Queue**: any number of producers, one consumer, no
//!   capacity planning required
//! - **Linked-chunk growth**: a full chunk publishes a one-shot link to its
//!   successor; existing elements stay where they were written
//! - **Pluggable growth policy**: fixed-size chunks or bounded doubling
//!
//! ## Philosophy
//!
//! ChunkQ focuses on providing:
//! - Non-blocking progress for every producer and for the consumer
//! - Exactly-once delivery in producer-reservation order
//! - An API that guides users toward the single-consumer contract
//!
//! ## Quick Start
//!
//! ```rust
//! use chunkq::UnboundedMpscQueue;
//!
//! let queue = UnboundedMpscQueue::new(16);
//! queue.offer(42)?;
//! assert_eq!(queue.poll(), Some(42));
//! # Ok::<(), chunkq::Error>(())
//! ```
//!
//! ## Thread Safety
//!
//! The queue is safe to share across threads. Any number of threads may call
//! [`UnboundedMpscQueue::offer`] concurrently; exactly one designated thread
//! may call the consumer-side operations (`poll`, `peek`, `drain`, `clear`).
//! Violating the single-consumer contract is undefined behavior; debug builds
//! carry a detector that panics on concurrent consumer entry.
//!
//! ## Performance
//!
//! ChunkQ is optimized for modern multi-core processors with careful attention
//! to:
//! - Cache-line isolation of the producer and consumer indices
//! - Acquire/release memory ordering on every cross-thread edge
//! - Amortized O(1) growth: one allocation per chunk of elements

#![no_std]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
pub mod queue;

#[cfg(feature = "std")]
pub use crate::queue::{
    Capacity, DoublingChunks, FixedChunks, GrowthPolicy, QueueMetrics, UnboundedMpscQueue,
};

/// Common utilities and helper types
pub mod util {
    /// Padding granularity for the hot-index wrappers.
    ///
    /// Twice the common 64-byte line so a padded value stays isolated from its
    /// neighbors even on processors that prefetch cache lines in pairs.
    pub const CACHE_PAD_SIZE: usize = 128;

    /// Align a size up to the padding granularity
    #[inline]
    pub const fn align_to_cache_pad(size: usize) -> usize {
        (size + CACHE_PAD_SIZE - 1) & !(CACHE_PAD_SIZE - 1)
    }

    /// Isolate a value on its own cache-line region.
    ///
    /// Wrapping each hot atomic counter in `CachePadded` keeps producer-side
    /// reservations from contending with the consumer's index on the same
    /// line. Correctness never depends on this, only throughput.
    #[repr(align(128))]
    #[derive(Default)]
    pub struct CachePadded<T> {
        value: T,
    }

    impl<T> CachePadded<T> {
        /// Create a new cache-padded value
        #[inline]
        pub const fn new(value: T) -> Self {
            Self { value }
        }

        /// Get the inner value
        #[inline]
        pub fn into_inner(self) -> T {
            self.value
        }
    }

    impl<T> core::ops::Deref for CachePadded<T> {
        type Target = T;

        #[inline]
        fn deref(&self) -> &T {
            &self.value
        }
    }

    impl<T> core::ops::DerefMut for CachePadded<T> {
        #[inline]
        fn deref_mut(&mut self) -> &mut T {
            &mut self.value
        }
    }

    impl<T: Clone> Clone for CachePadded<T> {
        fn clone(&self) -> Self {
            Self::new(self.value.clone())
        }
    }

    impl<T: Copy> Copy for CachePadded<T> {}

    impl<T: core::fmt::Debug> core::fmt::Debug for CachePadded<T> {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            core::fmt::Debug::fmt(&self.value, f)
        }
    }
}

/// Error types for ChunkQ operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The growth protocol could not allocate a new chunk. Fatal to the offer
    /// that triggered it: the unbounded-capacity promise cannot be honored.
    AllocationFailed,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::AllocationFailed => write!(f, "Failed to allocate a new queue chunk"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type for ChunkQ operations
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_cache_pad_alignment() {
        assert_eq!(util::align_to_cache_pad(1), 128);
        assert_eq!(util::align_to_cache_pad(128), 128);
        assert_eq!(util::align_to_cache_pad(129), 256);
        assert_eq!(util::align_to_cache_pad(255), 256);
        assert_eq!(util::align_to_cache_pad(256), 256);
    }

    #[test]
    fn test_cache_padded() {
        use core::mem;

        let padded = util::CachePadded::new(42);
        assert_eq!(*padded, 42);
        assert_eq!(padded.into_inner(), 42);

        assert_eq!(mem::align_of::<util::CachePadded<u8>>(), 128);
        assert!(mem::size_of::<util::CachePadded<u8>>() >= 128);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::AllocationFailed.to_string(),
            "Failed to allocate a new queue chunk"
        );
    }
}
