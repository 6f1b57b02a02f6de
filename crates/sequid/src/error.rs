use crate::{metadata::ScalarKind, sequence::KeyKind, store::StoreError};

/// A result type that defaults to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants key generation and metadata lookups can produce.
///
/// Configuration errors ([`Error::UnsupportedKeyType`],
/// [`Error::KeyOutOfRange`], [`Error::SequenceNotAdvancing`],
/// [`Error::BlockOutOfRange`]) are fatal and surface immediately; store
/// failures propagate unchanged and are never retried here, since a failed
/// fetch may already have advanced the counter.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The key property's declared type cannot be filled from a sequence.
    #[error(
        "property '{property}' on entity type '{entity}' has type {scalar}; \
         only 8/16/32/64-bit integer keys can be filled from a sequence"
    )]
    UnsupportedKeyType {
        /// Display name of the entity declaring the property.
        entity: String,
        /// Name of the offending property.
        property: String,
        /// The declared, nullable-unwrapped scalar type.
        scalar: ScalarKind,
    },

    /// A fetched counter value does not fit the declared key width.
    ///
    /// This signals that the counter has outgrown the key column; the value
    /// is rejected rather than truncated.
    #[error("sequence '{sequence}' returned {value}, which does not fit a {kind} key")]
    KeyOutOfRange {
        /// The sequence the value was fetched from.
        sequence: String,
        /// The raw counter value.
        value: i64,
        /// The width the key property declares.
        kind: KeyKind,
    },

    /// A freshly fetched block does not lie after the previous one.
    ///
    /// Seen when the sequence's configured increment is smaller than the
    /// block size, or when the counter was reset underneath the allocator.
    #[error(
        "sequence '{sequence}' returned {fetched} but the previous block ends at {last_end}; \
         the sequence increment must match the configured block size"
    )]
    SequenceNotAdvancing {
        /// The sequence the value was fetched from.
        sequence: String,
        /// The raw counter value of the rejected fetch.
        fetched: i64,
        /// Inclusive end of the block reserved before it.
        last_end: i64,
    },

    /// A fetched counter value cannot anchor a block of the configured size.
    #[error("sequence '{sequence}' returned {fetched}, which cannot anchor a block of {block_size} values")]
    BlockOutOfRange {
        /// The sequence the value was fetched from.
        sequence: String,
        /// The raw counter value of the rejected fetch.
        fetched: i64,
        /// Number of values one fetch reserves.
        block_size: i64,
    },

    /// The scalar query issued for a block fetch failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A property lookup through the throwing accessor found nothing.
    #[error(
        "the property '{name}' on entity type '{entity}' could not be found; \
         ensure that the property exists and has been included in the model"
    )]
    PropertyNotFound {
        /// Display name of the entity that was searched.
        entity: String,
        /// The requested property name.
        name: String,
    },

    /// A navigation lookup through the throwing accessor found nothing.
    #[error(
        "the navigation '{name}' on entity type '{entity}' could not be found; \
         ensure that the navigation exists and has been included in the model"
    )]
    NavigationNotFound {
        /// Display name of the entity that was searched.
        entity: String,
        /// The requested navigation name.
        name: String,
    },

    /// A thread panicked while holding the refill lock.
    ///
    /// Not produced when the `parking-lot` feature is enabled, since
    /// parking_lot mutexes do not poison.
    #[cfg(not(feature = "parking-lot"))]
    #[error("a thread panicked while refilling a sequence block")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};

#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
