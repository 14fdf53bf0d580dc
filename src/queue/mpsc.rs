//! Multi-Producer, Single-Consumer (MPSC) unbounded queue
//!
//! This module implements a lock-free MPSC queue whose storage is a chain of
//! fixed-size array chunks. The queue grows by linking a fresh chunk onto the
//! chain; elements are never copied on growth.
//!
//! ## Design Philosophy
//!
//! The queue is designed for maximum producer throughput while keeping strict
//! correctness guarantees:
//! - **Lock-free**: producers and the consumer only ever use atomic operations
//! - **No copy on growth**: a full chunk ends with a jump marker and a
//!   one-shot link to its successor; the consumer follows links transparently
//! - **Cache optimization**: the producer and consumer indices live on
//!   isolated cache-line regions to prevent false sharing
//! - **Tagged slots**: every slot carries an explicit state tag
//!   (empty / value / jump), so no user element can alias a sentinel
//!
//! ## Memory Ordering Model
//!
//! ```text
//! Producer (offer)                   Consumer (poll)
//! ----------------                   ---------------
//! Write payload                      Load slot state   (Acquire)
//! Store slot state    (Release) ---> Read payload
//!
//! Store jump marker   (Release) ---> Load slot state   (Acquire)
//! Store chunk link    (Release) ---> Load chunk link   (Acquire)
//! ```
//!
//! - **Element publication** uses `Release` on the slot state so the consumer
//!   never observes a partially written payload
//! - **Chunk transition** publishes the marker strictly before the link; the
//!   consumer spins through the narrow window where the marker is visible but
//!   the link is not
//! - **Index reservation** is a relaxed `fetch_add`: slot states, not indices,
//!   carry the payload synchronization
//!
//! ## Algorithm Details
//!
//! Logical indices are monotonic and dense over elements. A chunk of `N` slots
//! covers `N - 1` elements; its last slot is the boundary slot. The producer
//! whose reserved index lands on the boundary slot performs the growth
//! protocol alone: allocate the successor chunk, write the jump marker,
//! advance the shared producer chunk, store the link, then retry its own
//! index against the new chunk (where it maps to offset zero). Every other
//! producer either publishes into its in-range slot or chases links until its
//! index is in range.
//!
//! The consumer walks the same chain with its own index: a value slot is
//! taken and cleared, a jump marker moves the consumer to the linked chunk
//! (retiring the old one through the epoch collector), and an unpublished slot
//! reports "not yet available" rather than spinning: the producer index is an
//! optimistic reservation count, not a publication fence.
//!
//! ## When to Use
//!
//! - Many threads enqueue, exactly one thread dequeues
//! - The backlog bound is unknown or unbounded by design
//! - Producers must never block, fail, or wait on a full queue

use crate::queue::growth::{normalize_chunk_size, FixedChunks, GrowthPolicy, MIN_CHUNK_SIZE};
use crate::util::CachePadded;
use crate::{Error, Result};

use core::cell::UnsafeCell;
use core::fmt;
use core::mem::MaybeUninit;
use core::ptr;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};

use std::boxed::Box;
use std::vec::Vec;

/// Ceiling on the number of elements one [`UnboundedMpscQueue::drain`] call
/// consumes, so callers can interleave draining with other work.
pub const DRAIN_BATCH_LIMIT: usize = 4096;

/// Ceiling on the number of elements one [`UnboundedMpscQueue::fill`] call
/// produces. Liveness only: offers on an unbounded queue always succeed.
pub const FILL_BATCH_LIMIT: usize = 4096;

/// Sub-batch granularity between exhaustion checks inside `fill`.
const OFFER_SUB_BATCH: usize = 128;

/// Slot states. A slot starts empty, holds a value exactly once, and in the
/// boundary position may instead receive the jump marker.
const SLOT_EMPTY: u8 = 0;
const SLOT_VALUE: u8 = 1;
const SLOT_JUMP: u8 = 2;

/// One storage cell: an explicit state tag next to the payload.
///
/// The tag replaces sentinel objects: an element can never be confused with
/// "empty" or with the jump marker, whatever its bit pattern.
struct Slot<T> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(SLOT_EMPTY),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// A fixed-size chunk of slots plus the one-shot link to its successor.
///
/// A chunk covers the logical indices `[base, base + mask]`. Indices below
/// `base + mask` are element slots; `base + mask` is the boundary slot that
/// receives the jump marker when the chunk fills up.
struct Segment<T> {
    base: usize,
    mask: usize,
    next: Atomic<Segment<T>>,
    slots: Box<[Slot<T>]>,
}

// Safety: slots are plain storage; every cell has exactly one writer at a
// time (the producer owning its reserved index, then the single consumer),
// with hand-off through the slot state atomics.
unsafe impl<T: Send> Send for Segment<T> {}
unsafe impl<T: Send> Sync for Segment<T> {}

impl<T> Segment<T> {
    /// Allocate a chunk covering logical indices starting at `base`.
    ///
    /// The slot array is reserved fallibly so the growth protocol can surface
    /// [`Error::AllocationFailed`] instead of aborting the process.
    fn try_new(base: usize, capacity: usize) -> Result<Owned<Segment<T>>> {
        debug_assert!(capacity.is_power_of_two());
        debug_assert!(capacity >= MIN_CHUNK_SIZE);

        let mut slots = Vec::new();
        if slots.try_reserve_exact(capacity).is_err() {
            return Err(Error::AllocationFailed);
        }
        slots.extend((0..capacity).map(|_| Slot::new()));

        Ok(Owned::new(Segment {
            base,
            mask: capacity - 1,
            next: Atomic::null(),
            slots: slots.into_boxed_slice(),
        }))
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Publish an element into an offset this producer exclusively owns.
    #[inline]
    fn publish(&self, offset: usize, element: T) {
        let slot = &self.slots[offset];
        unsafe { (*slot.value.get()).write(element) };
        slot.state.store(SLOT_VALUE, Ordering::Release);
    }

    /// Write the jump marker into the boundary slot. Called at most once per
    /// chunk, by the producer that owns the boundary index.
    #[inline]
    fn set_jump_marker(&self) {
        self.slots[self.mask].state.store(SLOT_JUMP, Ordering::Release);
    }

    /// Chase the successor link, spinning through the narrow window between
    /// marker publication and link publication.
    fn wait_for_next<'g>(&self, guard: &'g Guard) -> Shared<'g, Segment<T>> {
        loop {
            let next = self.next.load(Ordering::Acquire, guard);
            if !next.is_null() {
                return next;
            }
            core::hint::spin_loop();
        }
    }
}

impl<T> Drop for Segment<T> {
    fn drop(&mut self) {
        // Only reachable with exclusive access; published, unconsumed
        // payloads still need their destructors.
        for slot in self.slots.iter_mut() {
            if *slot.state.get_mut() == SLOT_VALUE {
                unsafe { ptr::drop_in_place(slot.value.get_mut().as_mut_ptr()) };
            }
        }
    }
}

/// Capacity report of a queue.
///
/// The unbounded variant is an explicit enum case rather than a magic number,
/// so it can never be mistaken for a finite capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// The queue holds at most this many elements.
    Bounded(usize),
    /// The queue grows without bound.
    Unbounded,
}

impl Capacity {
    /// Whether this capacity is the unbounded sentinel.
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Capacity::Unbounded)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Bounded(n) => write!(f, "{}", n),
            Capacity::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Point-in-time statistics of a queue.
#[derive(Debug, Clone)]
pub struct QueueMetrics {
    /// Advisory backlog estimate; may be transiently stale while offers race.
    pub size_estimate: usize,
    /// Chunks allocated over the queue's lifetime, including the initial one.
    pub segments_allocated: usize,
    /// Slot count of the chunk currently receiving offers.
    pub current_chunk_size: usize,
    /// Slot count of the initial chunk, after power-of-two rounding.
    pub initial_chunk_size: usize,
}

/// A lock-free, unbounded multi-producer single-consumer queue.
///
/// Storage is a chain of fixed-size chunks. Producers claim logical indices
/// with an atomic fetch-and-increment; when a chunk fills up, exactly one
/// producer links a fresh chunk and every other participant follows the link.
/// Elements are never moved once written.
///
/// # Contract
///
/// Any number of threads may call [`offer`](Self::offer) concurrently.
/// Exactly one designated thread may call the consumer-side operations
/// ([`poll`](Self::poll), [`peek`](Self::peek), [`drain`](Self::drain),
/// [`clear`](Self::clear)). Concurrent consumer calls are undefined behavior;
/// debug builds panic on detection.
///
/// # Ordering
///
/// Elements are dequeued in the order their indices were reserved, not in
/// wall-clock write-completion order. The consumer never advances past an
/// unpublished slot, so a slow producer delays the elements behind it but
/// never reorders them.
///
/// # Examples
///
/// ```rust
/// use chunkq::UnboundedMpscQueue;
/// use std::sync::Arc;
/// use std::thread;
///
/// let queue = Arc::new(UnboundedMpscQueue::new(16));
///
/// let producers: Vec<_> = (0..4)
///     .map(|p| {
///         let queue = Arc::clone(&queue);
///         thread::spawn(move || {
///             for i in 0..100 {
///                 queue.offer(p * 100 + i).unwrap();
///             }
///         })
///     })
///     .collect();
///
/// let consumer = thread::spawn({
///     let queue = Arc::clone(&queue);
///     move || {
///         let mut seen = 0;
///         while seen < 400 {
///             if queue.poll().is_some() {
///                 seen += 1;
///             }
///         }
///         seen
///     }
/// });
///
/// for p in producers {
///     p.join().unwrap();
/// }
/// assert_eq!(consumer.join().unwrap(), 400);
/// ```
pub struct UnboundedMpscQueue<T, P: GrowthPolicy = FixedChunks> {
    /// Next logical slot to be claimed. CAS-arbitrated among all producers.
    producer_index: CachePadded<AtomicUsize>,
    /// Chunk currently receiving offers. Advanced once per growth event by
    /// the producer that won the chunk boundary.
    producer_segment: Atomic<Segment<T>>,
    /// Next logical slot to be read. Written only by the consumer.
    consumer_index: CachePadded<AtomicUsize>,
    /// Chunk the consumer reads from. Touched only by the consumer.
    consumer_segment: Atomic<Segment<T>>,
    /// Growth events plus the initial chunk. Metrics only.
    segments_allocated: AtomicUsize,
    initial_chunk_size: usize,
    policy: P,
    #[cfg(debug_assertions)]
    consumer_active: core::sync::atomic::AtomicBool,
}

/// Debug-only turnstile guarding the single-consumer contract.
#[cfg(debug_assertions)]
struct ConsumerTurnstile<'a>(&'a core::sync::atomic::AtomicBool);

#[cfg(debug_assertions)]
impl Drop for ConsumerTurnstile<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<T> UnboundedMpscQueue<T, FixedChunks> {
    /// Create a queue whose chunks all have `initial_chunk_size` slots.
    ///
    /// Sizes that are not powers of two are rounded up deterministically, the
    /// same way every chunk size in this crate is normalized. One slot per
    /// chunk is reserved for the jump marker, so a chunk of `N` slots holds
    /// `N - 1` elements.
    ///
    /// # Panics
    ///
    /// Panics if `initial_chunk_size < 2`: a chunk must fit at least one
    /// element plus the jump slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chunkq::UnboundedMpscQueue;
    ///
    /// let queue: UnboundedMpscQueue<u64> = UnboundedMpscQueue::new(20);
    /// assert_eq!(queue.initial_chunk_size(), 32); // rounded up
    /// ```
    pub fn new(initial_chunk_size: usize) -> Self {
        Self::with_policy(initial_chunk_size, FixedChunks)
    }
}

impl<T, P: GrowthPolicy> UnboundedMpscQueue<T, P> {
    /// Create a queue with an explicit growth policy.
    ///
    /// # Panics
    ///
    /// Panics if `initial_chunk_size < 2`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chunkq::{DoublingChunks, UnboundedMpscQueue};
    ///
    /// let queue: UnboundedMpscQueue<u64, _> =
    ///     UnboundedMpscQueue::with_policy(16, DoublingChunks::new(1024));
    /// ```
    pub fn with_policy(initial_chunk_size: usize, policy: P) -> Self {
        assert!(
            initial_chunk_size >= MIN_CHUNK_SIZE,
            "chunk size must fit at least one element plus the jump slot"
        );

        let capacity = normalize_chunk_size(initial_chunk_size);
        let segment =
            Segment::try_new(0, capacity).expect("failed to allocate the initial chunk");
        // Both ends of the chain start on the same chunk.
        let segment = segment.into_shared(unsafe { epoch::unprotected() });

        Self {
            producer_index: CachePadded::new(AtomicUsize::new(0)),
            producer_segment: Atomic::from(segment),
            consumer_index: CachePadded::new(AtomicUsize::new(0)),
            consumer_segment: Atomic::from(segment),
            segments_allocated: AtomicUsize::new(1),
            initial_chunk_size: capacity,
            policy,
            #[cfg(debug_assertions)]
            consumer_active: core::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Enqueue an element. Never blocks, never rejects for capacity.
    ///
    /// The only failure is [`Error::AllocationFailed`] when a growth event
    /// cannot obtain memory for the next chunk; that failure is fatal to the
    /// queue's delivery promise and must not be ignored.
    ///
    /// # Memory Ordering
    ///
    /// The payload write happens before a `Release` store of the slot state,
    /// so the consumer always observes a fully-formed element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chunkq::UnboundedMpscQueue;
    ///
    /// let queue = UnboundedMpscQueue::new(16);
    /// queue.offer("payload")?;
    /// assert_eq!(queue.len(), 1);
    /// # Ok::<(), chunkq::Error>(())
    /// ```
    #[inline]
    pub fn offer(&self, element: T) -> Result<()> {
        let guard = epoch::pin();
        // Chunk first, then index: the claimed index can never precede the
        // loaded chunk's base.
        let mut seg = self.producer_segment.load(Ordering::Acquire, &guard);
        let index = self.producer_index.fetch_add(1, Ordering::Relaxed);

        loop {
            let segment = unsafe { seg.deref() };
            let offset = index - segment.base;

            if offset < segment.mask {
                segment.publish(offset, element);
                return Ok(());
            }

            if offset == segment.mask {
                // This producer owns the boundary slot: it alone performs the
                // chunk transition, then retries against the new chunk.
                seg = self.grow(seg, index, &guard)?;
                continue;
            }

            // The index lives in a later chunk.
            seg = segment.wait_for_next(&guard);
        }
    }

    /// The growth protocol. Runs on exactly one producer per chunk
    /// transition: the one whose reserved index is the boundary slot.
    fn grow<'g>(
        &self,
        seg: Shared<'g, Segment<T>>,
        boundary_index: usize,
        guard: &'g Guard,
    ) -> Result<Shared<'g, Segment<T>>> {
        let segment = unsafe { seg.deref() };
        let next_capacity =
            normalize_chunk_size(self.policy.next_chunk_size(segment.capacity()));

        // Allocate before the marker goes out: a failed allocation must not
        // leave a marker whose link can never appear.
        let fresh = Segment::try_new(boundary_index, next_capacity)?;
        let fresh = fresh.into_shared(guard);

        // Publication order is load-bearing twice over. The marker precedes
        // the link, which is the order the consumer reads them in. The shared
        // producer chunk advances before the link: the consumer retires a
        // chunk only after following its link, so a retired chunk is already
        // unlinked from the shared root. Transitions are serialized by
        // construction (the next grower can only reach the fresh chunk
        // through this link), so the store can never move the root backwards.
        segment.set_jump_marker();
        self.producer_segment.store(fresh, Ordering::Release);
        segment.next.store(fresh, Ordering::Release);
        self.segments_allocated.fetch_add(1, Ordering::Relaxed);

        Ok(fresh)
    }

    /// Dequeue the element at the consumer index, if it has been published.
    ///
    /// Returns `None` when the queue is empty *or* when the next slot is
    /// still being written by a producer: reservation is not publication,
    /// and the consumer never spins on an in-flight write.
    ///
    /// # Contract
    ///
    /// Must only be called from the single designated consumer thread.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chunkq::UnboundedMpscQueue;
    ///
    /// let queue = UnboundedMpscQueue::new(16);
    /// queue.offer(7)?;
    /// assert_eq!(queue.poll(), Some(7));
    /// assert_eq!(queue.poll(), None);
    /// # Ok::<(), chunkq::Error>(())
    /// ```
    #[inline]
    pub fn poll(&self) -> Option<T> {
        #[cfg(debug_assertions)]
        let _turnstile = self.enter_consumer();

        let index = self.consumer_index.load(Ordering::Relaxed);
        if index == self.producer_index.load(Ordering::Acquire) {
            return None;
        }

        let guard = epoch::pin();
        let (segment, offset) = self.consumer_slot(index, &guard);
        let slot = &segment.slots[offset];
        if slot.state.load(Ordering::Acquire) != SLOT_VALUE {
            // Reserved but not yet published. Not an error and not empty in
            // the strict sense; the caller decides whether to retry.
            return None;
        }

        let element = unsafe { ptr::read((*slot.value.get()).as_ptr()) };
        slot.state.store(SLOT_EMPTY, Ordering::Relaxed);
        self.consumer_index.store(index + 1, Ordering::Release);
        Some(element)
    }

    /// Copy of the element `poll` would return, without consuming it.
    ///
    /// # Contract
    ///
    /// Must only be called from the single designated consumer thread.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chunkq::UnboundedMpscQueue;
    ///
    /// let queue = UnboundedMpscQueue::new(16);
    /// queue.offer(7)?;
    /// assert_eq!(queue.peek(), Some(7));
    /// assert_eq!(queue.poll(), Some(7));
    /// # Ok::<(), chunkq::Error>(())
    /// ```
    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        #[cfg(debug_assertions)]
        let _turnstile = self.enter_consumer();

        let index = self.consumer_index.load(Ordering::Relaxed);
        if index == self.producer_index.load(Ordering::Acquire) {
            return None;
        }

        let guard = epoch::pin();
        let (segment, offset) = self.consumer_slot(index, &guard);
        let slot = &segment.slots[offset];
        if slot.state.load(Ordering::Acquire) != SLOT_VALUE {
            return None;
        }

        let element = unsafe { &*(*slot.value.get()).as_ptr() };
        Some(element.clone())
    }

    /// Resolve the consumer index to its chunk and offset, following jump
    /// markers and retiring fully-consumed chunks along the way.
    fn consumer_slot<'g>(&self, index: usize, guard: &'g Guard) -> (&'g Segment<T>, usize) {
        loop {
            let seg = self.consumer_segment.load(Ordering::Relaxed, guard);
            let segment = unsafe { seg.deref() };
            let offset = index - segment.base;

            if offset == segment.mask
                && segment.slots[offset].state.load(Ordering::Acquire) == SLOT_JUMP
            {
                let next = segment.wait_for_next(guard);
                self.consumer_segment.store(next, Ordering::Relaxed);
                // Everything behind the marker has been consumed; free the
                // chunk once in-flight producers have unpinned.
                unsafe { guard.defer_destroy(seg) };
                continue;
            }

            return (segment, offset);
        }
    }

    /// Advisory backlog estimate: reserved minus consumed indices.
    ///
    /// May be transiently stale while offers race; never negative.
    #[inline]
    pub fn len(&self) -> usize {
        // Consumer side first: the producer index is monotonic, so reading it
        // second can only over-report, never underflow.
        let consumer = self.consumer_index.load(Ordering::Acquire);
        let producer = self.producer_index.load(Ordering::Acquire);
        producer.saturating_sub(consumer)
    }

    /// Whether the backlog estimate is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The unbounded-capacity sentinel. Never a finite number for this queue.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chunkq::{Capacity, UnboundedMpscQueue};
    ///
    /// let queue: UnboundedMpscQueue<u8> = UnboundedMpscQueue::new(16);
    /// assert_eq!(queue.capacity(), Capacity::Unbounded);
    /// ```
    #[inline]
    pub const fn capacity(&self) -> Capacity {
        Capacity::Unbounded
    }

    /// Slot count of the initial chunk, after power-of-two rounding.
    #[inline]
    pub const fn initial_chunk_size(&self) -> usize {
        self.initial_chunk_size
    }

    /// Discard every element currently in the queue.
    ///
    /// Keeps polling while the backlog estimate is non-zero, so offers that
    /// were reserved before the call are chased down even if their producers
    /// are still writing.
    ///
    /// # Contract
    ///
    /// Must only be called from the single designated consumer thread.
    pub fn clear(&self) {
        while self.poll().is_some() || !self.is_empty() {}
    }

    /// Drain up to [`DRAIN_BATCH_LIMIT`] elements into `consume`.
    ///
    /// `consume` returns whether it accepts more elements; a refusal stops
    /// the batch after the element already delivered. Returns the number of
    /// elements consumed.
    ///
    /// # Contract
    ///
    /// Must only be called from the single designated consumer thread.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chunkq::UnboundedMpscQueue;
    ///
    /// let queue = UnboundedMpscQueue::new(16);
    /// for i in 0..10 {
    ///     queue.offer(i)?;
    /// }
    ///
    /// let mut out = Vec::new();
    /// let drained = queue.drain(|element| {
    ///     out.push(element);
    ///     true
    /// });
    /// assert_eq!(drained, 10);
    /// assert_eq!(out, (0..10).collect::<Vec<_>>());
    /// # Ok::<(), chunkq::Error>(())
    /// ```
    pub fn drain<F>(&self, consume: F) -> usize
    where
        F: FnMut(T) -> bool,
    {
        self.drain_with_limit(consume, DRAIN_BATCH_LIMIT)
    }

    /// Drain with an explicit ceiling instead of [`DRAIN_BATCH_LIMIT`].
    pub fn drain_with_limit<F>(&self, mut consume: F, limit: usize) -> usize
    where
        F: FnMut(T) -> bool,
    {
        let mut count = 0;
        while count < limit {
            match self.poll() {
                Some(element) => {
                    count += 1;
                    if !consume(element) {
                        break;
                    }
                }
                None => break,
            }
        }
        count
    }

    /// Offer elements from `produce` until it reports exhaustion or the
    /// [`FILL_BATCH_LIMIT`] ceiling is reached, whichever comes first.
    ///
    /// Work proceeds in bounded sub-batches with an exhaustion check between
    /// them; the ceiling exists purely for fairness on a structure whose
    /// offers always succeed. Returns the number of elements offered.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chunkq::UnboundedMpscQueue;
    ///
    /// let queue = UnboundedMpscQueue::new(16);
    /// let mut source = 0..100;
    /// let filled = queue.fill(|| source.next())?;
    /// assert_eq!(filled, 100);
    /// assert_eq!(queue.len(), 100);
    /// # Ok::<(), chunkq::Error>(())
    /// ```
    pub fn fill<F>(&self, mut produce: F) -> Result<usize>
    where
        F: FnMut() -> Option<T>,
    {
        let mut total = 0;
        while total < FILL_BATCH_LIMIT {
            let batch = OFFER_SUB_BATCH.min(FILL_BATCH_LIMIT - total);
            let filled = self.fill_bounded(&mut produce, batch)?;
            if filled == 0 {
                break;
            }
            total += filled;
        }
        Ok(total)
    }

    /// Offer up to `limit` elements from `produce` in one sub-batch.
    pub fn fill_bounded<F>(&self, mut produce: F, limit: usize) -> Result<usize>
    where
        F: FnMut() -> Option<T>,
    {
        let mut count = 0;
        while count < limit {
            match produce() {
                Some(element) => {
                    self.offer(element)?;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    /// Point-in-time statistics for monitoring.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chunkq::UnboundedMpscQueue;
    ///
    /// let queue: UnboundedMpscQueue<u32> = UnboundedMpscQueue::new(16);
    /// let metrics = queue.metrics();
    /// assert_eq!(metrics.segments_allocated, 1);
    /// assert_eq!(metrics.current_chunk_size, 16);
    /// ```
    pub fn metrics(&self) -> QueueMetrics {
        let guard = epoch::pin();
        let segment = unsafe { self.producer_segment.load(Ordering::Acquire, &guard).deref() };
        QueueMetrics {
            size_estimate: self.len(),
            segments_allocated: self.segments_allocated.load(Ordering::Relaxed),
            current_chunk_size: segment.capacity(),
            initial_chunk_size: self.initial_chunk_size,
        }
    }

    #[cfg(debug_assertions)]
    fn enter_consumer(&self) -> ConsumerTurnstile<'_> {
        assert!(
            !self.consumer_active.swap(true, Ordering::Acquire),
            "consumer-side operations invoked concurrently from more than one thread"
        );
        ConsumerTurnstile(&self.consumer_active)
    }
}

impl<T, P: GrowthPolicy> fmt::Debug for UnboundedMpscQueue<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnboundedMpscQueue")
            .field("size_estimate", &self.len())
            .field("capacity", &self.capacity())
            .field(
                "segments_allocated",
                &self.segments_allocated.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl<T, P: GrowthPolicy> Drop for UnboundedMpscQueue<T, P> {
    fn drop(&mut self) {
        // Exclusive access: no producer or consumer is live. Chunks behind
        // the consumer were already retired through the epoch collector, so
        // the chain from the consumer chunk forward is exactly what remains.
        unsafe {
            let guard = epoch::unprotected();
            let mut seg = self.consumer_segment.load(Ordering::Relaxed, guard);
            while !seg.is_null() {
                let next = seg.deref().next.load(Ordering::Relaxed, guard);
                drop(seg.into_owned());
                seg = next;
            }
        }
    }
}
