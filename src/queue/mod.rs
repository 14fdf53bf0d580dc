//! Queue implementations
//!
//! This module provides the unbounded MPSC queue and its growth policies.
//!
//! ## Design
//!
//! - **Lock-free**: every operation uses only atomic primitives
//! - **Linked-chunk storage**: growth links a fresh chunk instead of copying
//! - **Memory ordering**: careful use of Acquire/Release on every
//!   cross-thread edge
//! - **Reclamation**: retired chunks are freed through epoch-based
//!   reclamation, so a lagging producer can never observe freed storage
//! - **Comprehensive testing**: unit tests, stress tests, property tests, and
//!   loom interleaving models
//!
//! ## Performance Characteristics
//!
//! | Operation | Cost | Notes |
//! |-----------|------|-------|
//! | offer     | O(1) amortized | one chunk allocation per chunk of elements |
//! | poll      | O(1) | never blocks, never spins on in-flight writes |
//! | len       | O(1) | advisory estimate |
//!
//! ## Examples
//!
//! ```rust
//! use chunkq::queue::mpsc::UnboundedMpscQueue;
//!
//! let queue = UnboundedMpscQueue::new(64);
//! queue.offer("event")?;
//! assert_eq!(queue.poll(), Some("event"));
//! # Ok::<(), chunkq::Error>(())
//! ```
pub mod growth;
pub mod mpsc;

// Re-export main types for convenience
pub use growth::{DoublingChunks, FixedChunks, GrowthPolicy};
pub use mpsc::{Capacity, QueueMetrics, UnboundedMpscQueue};


#[cfg(test)]
mod proptests;
