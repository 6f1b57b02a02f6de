use core::marker::PhantomData;
use std::sync::Arc;

use crate::{
    Error, Result,
    sequence::{KeyKind, KeyValue, SequenceKey, SequenceState, ValueGenerator},
    store::{Connection, ScalarExecutor, SqlDialect},
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Renders the fetch statement for `sequence`.
fn next_value_sql(sequence: &str, dialect: &impl SqlDialect) -> String {
    format!("SELECT NEXT VALUE FOR {}", dialect.delimit_identifier(sequence))
}

/// A width-typed allocator drawing from a shared [`SequenceState`].
///
/// Instances are cheap and own no mutable state: every claim delegates to
/// the shared state, so any number of allocator instances may draw from
/// the same sequence concurrently without coordination beyond the state's
/// own.
pub struct SequenceValueGenerator<V, X, C>
where
    V: SequenceKey,
    X: ScalarExecutor<C>,
    C: Connection,
{
    state: Arc<SequenceState>,
    executor: X,
    connection: C,
    command: String,
    _key: PhantomData<V>,
}

impl<V, X, C> SequenceValueGenerator<V, X, C>
where
    V: SequenceKey,
    X: ScalarExecutor<C>,
    C: Connection,
{
    /// Creates an allocator bound to `state`, issuing block fetches over
    /// `connection` with `executor`.
    ///
    /// The fetch statement is rendered once here: the sequence name is
    /// embedded through the dialect's identifier quoting and never changes
    /// for the lifetime of the state.
    pub fn new(
        state: Arc<SequenceState>,
        executor: X,
        connection: C,
        dialect: &impl SqlDialect,
    ) -> Self {
        let command = next_value_sql(state.name(), dialect);
        Self {
            state,
            executor,
            connection,
            command,
            _key: PhantomData,
        }
    }

    /// The shared state this allocator claims from.
    #[must_use]
    pub fn state(&self) -> &Arc<SequenceState> {
        &self.state
    }

    /// The statement issued per block fetch.
    #[must_use]
    pub fn command_text(&self) -> &str {
        &self.command
    }

    /// Claims the next key value.
    ///
    /// Values come from the shared block with no I/O until the block is
    /// exhausted; exhaustion triggers exactly one scalar query, which
    /// participates in the connection's active transaction.
    ///
    /// # Errors
    ///
    /// - store failures from the block fetch, unchanged and unretried
    /// - [`Error::KeyOutOfRange`] when the counter has outgrown `V`
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_value(&self) -> Result<V> {
        let raw = self.state.next_raw(|| {
            self.executor.execute_scalar(
                &self.connection,
                self.connection.active_transaction(),
                &self.command,
            )
        })?;

        V::from_sequence(raw).ok_or_else(|| Error::KeyOutOfRange {
            sequence: self.state.name().to_owned(),
            value: raw,
            kind: V::KIND,
        })
    }
}

impl<V, X, C> ValueGenerator for SequenceValueGenerator<V, X, C>
where
    V: SequenceKey,
    X: ScalarExecutor<C>,
    C: Connection,
{
    type Value = V;

    fn next_value(&self) -> Result<V> {
        Self::next_value(self)
    }

    fn generates_temporary_values(&self) -> bool {
        false
    }
}

/// A width-erased sequence allocator, as handed out by the factory.
///
/// The width is fixed when the generator is created, from the key
/// property's declared type; each claim returns a [`KeyValue`] tagged with
/// that width.
pub enum KeyGenerator<X, C>
where
    X: ScalarExecutor<C>,
    C: Connection,
{
    /// Allocator for an `i8` key.
    I8(SequenceValueGenerator<i8, X, C>),
    /// Allocator for an `i16` key.
    I16(SequenceValueGenerator<i16, X, C>),
    /// Allocator for an `i32` key.
    I32(SequenceValueGenerator<i32, X, C>),
    /// Allocator for an `i64` key.
    I64(SequenceValueGenerator<i64, X, C>),
    /// Allocator for a `u8` key.
    U8(SequenceValueGenerator<u8, X, C>),
    /// Allocator for a `u16` key.
    U16(SequenceValueGenerator<u16, X, C>),
    /// Allocator for a `u32` key.
    U32(SequenceValueGenerator<u32, X, C>),
    /// Allocator for a `u64` key.
    U64(SequenceValueGenerator<u64, X, C>),
}

impl<X, C> KeyGenerator<X, C>
where
    X: ScalarExecutor<C>,
    C: Connection,
{
    /// Claims the next key from the underlying typed allocator.
    ///
    /// # Errors
    ///
    /// See [`SequenceValueGenerator::next_value`].
    pub fn next_key(&self) -> Result<KeyValue> {
        Ok(match self {
            Self::I8(generator) => generator.next_value()?.into_key_value(),
            Self::I16(generator) => generator.next_value()?.into_key_value(),
            Self::I32(generator) => generator.next_value()?.into_key_value(),
            Self::I64(generator) => generator.next_value()?.into_key_value(),
            Self::U8(generator) => generator.next_value()?.into_key_value(),
            Self::U16(generator) => generator.next_value()?.into_key_value(),
            Self::U32(generator) => generator.next_value()?.into_key_value(),
            Self::U64(generator) => generator.next_value()?.into_key_value(),
        })
    }

    /// The width this generator produces.
    #[must_use]
    pub const fn kind(&self) -> KeyKind {
        match self {
            Self::I8(_) => KeyKind::I8,
            Self::I16(_) => KeyKind::I16,
            Self::I32(_) => KeyKind::I32,
            Self::I64(_) => KeyKind::I64,
            Self::U8(_) => KeyKind::U8,
            Self::U16(_) => KeyKind::U16,
            Self::U32(_) => KeyKind::U32,
            Self::U64(_) => KeyKind::U64,
        }
    }
}

impl<X, C> ValueGenerator for KeyGenerator<X, C>
where
    X: ScalarExecutor<C>,
    C: Connection,
{
    type Value = KeyValue;

    fn next_value(&self) -> Result<KeyValue> {
        self.next_key()
    }

    fn generates_temporary_values(&self) -> bool {
        false
    }
}
