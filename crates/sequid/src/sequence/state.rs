use core::sync::atomic::{AtomicI64, Ordering};

use crate::{Error, Result, sequence::mutex::Mutex};

#[cfg(feature = "tracing")]
use tracing::{debug, instrument};

/// Bounds of a state that has not fetched a block yet: an empty
/// pseudo-block ordered before every block a real counter can anchor.
const UNSET_END: i64 = i64::MIN;

/// Shared Hi-Lo state for one logical sequence.
///
/// One instance exists per sequence name and is shared by every allocator
/// drawing from that sequence. The state tracks the most recently reserved
/// block and a claim cursor into it:
///
/// - Claiming from an unexhausted block is a lock-free compare-and-swap
///   advance of the cursor, bounded by the block end. No I/O.
/// - When the block is exhausted, exactly one caller fetches the next raw
///   counter value. The raw value is the inclusive end of a freshly
///   reserved block of [`Self::block_size`] values, because the counter's
///   own increment equals the block size. Concurrent callers wait on the
///   refill lock and then claim from the refreshed block.
///
/// The lock is per-state, so a slow fetch on one sequence never stalls
/// allocators drawing from other sequences, and never blocks metadata
/// readers.
///
/// # Example
///
/// ```
/// use sequid::sequence::SequenceState;
///
/// let state = SequenceState::new("orders", 10);
/// // A counter stepping by the block size: the first fetch returns 10,
/// // which reserves the block 1..=10.
/// let fetch = || Ok::<_, sequid::Error>(10);
/// assert_eq!(state.next_raw(fetch).unwrap(), 1);
/// assert_eq!(state.next_raw(fetch).unwrap(), 2);
/// assert_eq!(state.last_block(), Some((1, 10)));
/// ```
#[derive(Debug)]
pub struct SequenceState {
    name: String,
    block_size: i64,
    /// Next unclaimed value. Claims are CAS advances bounded by `end`.
    next: AtomicI64,
    /// Inclusive end of the current block.
    end: AtomicI64,
    /// Inclusive start of the current block. Diagnostic only; claims are
    /// driven by `next` and `end`.
    start: AtomicI64,
    /// Serializes block fetches. Held across the scalar query.
    refill_lock: Mutex<()>,
}

impl SequenceState {
    /// Creates state for `name`, reserving `block_size` values per fetch.
    ///
    /// `block_size` must equal the increment configured on the database
    /// sequence itself: one fetched value reserves the whole preceding
    /// range only because the counter steps by the same amount.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is not positive.
    #[must_use]
    pub fn new(name: impl Into<String>, block_size: i64) -> Self {
        assert!(block_size > 0, "block size must be positive");
        Self {
            name: name.into(),
            block_size,
            next: AtomicI64::new(UNSET_END + 1),
            end: AtomicI64::new(UNSET_END),
            start: AtomicI64::new(UNSET_END),
            refill_lock: Mutex::new(()),
        }
    }

    /// The logical sequence name this state draws from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of values one counter fetch reserves.
    #[must_use]
    pub const fn block_size(&self) -> i64 {
        self.block_size
    }

    /// Inclusive bounds of the most recently reserved block, or `None`
    /// when no block has been fetched yet.
    #[must_use]
    pub fn last_block(&self) -> Option<(i64, i64)> {
        let end = self.end.load(Ordering::Acquire);
        (end != UNSET_END).then(|| (self.start.load(Ordering::Acquire), end))
    }

    /// Claims the next raw value, fetching a new block through `fetch`
    /// only when the current block is exhausted.
    ///
    /// `fetch` must return the next raw counter value, which is the
    /// inclusive end of a newly reserved block. It runs at most once per
    /// call, and only while this caller holds the refill lock, so
    /// concurrent exhaustion by any number of callers results in a single
    /// query.
    ///
    /// # Errors
    ///
    /// Propagates `fetch` failures unchanged, and rejects blocks that do
    /// not lie strictly after the previous one
    /// ([`Error::SequenceNotAdvancing`], [`Error::BlockOutOfRange`]).
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip_all, fields(sequence = %self.name))
    )]
    pub fn next_raw<E>(&self, mut fetch: impl FnMut() -> Result<i64, E>) -> Result<i64>
    where
        E: Into<Error>,
    {
        loop {
            if let Some(value) = self.try_claim() {
                return Ok(value);
            }
            if let Some(value) = self.refill(&mut fetch)? {
                return Ok(value);
            }
        }
    }

    /// Lock-free claim from the current block; `None` when exhausted.
    fn try_claim(&self) -> Option<i64> {
        loop {
            let current = self.next.load(Ordering::Acquire);
            let end = self.end.load(Ordering::Acquire);
            if current > end {
                return None;
            }
            if self
                .next
                .compare_exchange_weak(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(current);
            }
            // Lost the claim race; re-read the cursor.
        }
    }

    /// Fetches a fresh block, claiming its first value for the caller.
    ///
    /// Returns `None` when another caller refilled while this one waited
    /// on the lock; the caller then claims from the refreshed block.
    fn refill<E>(&self, fetch: &mut impl FnMut() -> Result<i64, E>) -> Result<Option<i64>>
    where
        E: Into<Error>,
    {
        #[cfg(not(feature = "parking-lot"))]
        let _refill = self.refill_lock.lock()?;
        #[cfg(feature = "parking-lot")]
        let _refill = self.refill_lock.lock();

        // Another caller may have fetched while this one waited.
        if self.next.load(Ordering::Acquire) <= self.end.load(Ordering::Acquire) {
            return Ok(None);
        }

        let fetched = fetch().map_err(Into::into)?;
        let start = fetched
            .checked_sub(self.block_size - 1)
            .filter(|start| *start > UNSET_END)
            .ok_or_else(|| Error::BlockOutOfRange {
                sequence: self.name.clone(),
                fetched,
                block_size: self.block_size,
            })?;

        // Unset bounds sit below every representable block, so the first
        // fetch always passes.
        let last_end = self.end.load(Ordering::Acquire);
        if start <= last_end {
            return Err(Error::SequenceNotAdvancing {
                sequence: self.name.clone(),
                fetched,
                last_end,
            });
        }

        #[cfg(feature = "tracing")]
        debug!(start, end = fetched, "reserved block");

        // Claim `start` for this caller, then publish the rest. `next`
        // moves before `end`: a racing reader that observes the new `end`
        // is thereby guaranteed to observe the advanced cursor too, so it
        // can never claim `start` twice; until `end` lands, racers still
        // see an exhausted block and queue behind the lock.
        self.start.store(start, Ordering::Release);
        self.next.store(start + 1, Ordering::Release);
        self.end.store(fetched, Ordering::Release);

        Ok(Some(start))
    }
}
