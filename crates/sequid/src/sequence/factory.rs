use std::sync::Arc;

use crate::{
    Error, Result,
    metadata::PropertyShape,
    sequence::{KeyGenerator, KeyKind, SequenceState, SequenceValueGenerator},
    store::{Connection, ScalarExecutor, SqlDialect},
};

/// Creates width-matched sequence allocators for key properties.
///
/// The factory owns the store collaborators shared by every allocator it
/// creates; the per-allocator pieces are the shared sequence state and the
/// caller's connection. The key width is resolved once per created
/// allocator from the property's declared scalar type.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use sequid::metadata::{PropertyShape, ScalarKind};
/// use sequid::sequence::{KeyValue, SequenceGeneratorFactory, SequenceState};
/// use sequid::store::{Connection, ScalarExecutor, SqlDialect, StoreError};
///
/// struct NoTransaction;
/// impl Connection for NoTransaction {
///     type Transaction = ();
///     fn active_transaction(&self) -> Option<&()> {
///         None
///     }
/// }
///
/// #[derive(Clone)]
/// struct FixedSequence;
/// impl ScalarExecutor<NoTransaction> for FixedSequence {
///     fn execute_scalar(
///         &self,
///         _connection: &NoTransaction,
///         _transaction: Option<&()>,
///         _sql: &str,
///     ) -> Result<i64, StoreError> {
///         Ok(10)
///     }
/// }
///
/// struct Ansi;
/// impl SqlDialect for Ansi {
///     fn delimit_identifier(&self, name: &str) -> String {
///         format!("\"{name}\"")
///     }
/// }
///
/// let factory = SequenceGeneratorFactory::new(FixedSequence, Ansi);
/// let key = PropertyShape::new("Order", "Id", ScalarKind::I64, false);
/// let state = Arc::new(SequenceState::new("orders", 10));
/// let generator = factory.create(&key, state, NoTransaction).unwrap();
///
/// assert_eq!(generator.next_key().unwrap(), KeyValue::I64(1));
/// ```
pub struct SequenceGeneratorFactory<X, D> {
    executor: X,
    dialect: D,
}

impl<X, D> SequenceGeneratorFactory<X, D>
where
    D: SqlDialect,
{
    /// Creates a factory sharing `executor` and `dialect` across the
    /// allocators it produces.
    pub const fn new(executor: X, dialect: D) -> Self {
        Self { executor, dialect }
    }

    /// Creates an allocator for `property`, drawing from `state` over
    /// `connection`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedKeyType`] when the property's nullable-unwrapped
    /// type is not one of the eight supported integer widths. The error
    /// names the property and its entity; nothing is deferred to a cast
    /// failure at claim time.
    pub fn create<C>(
        &self,
        property: &PropertyShape,
        state: Arc<SequenceState>,
        connection: C,
    ) -> Result<KeyGenerator<X, C>>
    where
        X: ScalarExecutor<C> + Clone,
        C: Connection,
    {
        let Some(kind) = KeyKind::of_scalar(property.scalar()) else {
            return Err(Error::UnsupportedKeyType {
                entity: property.entity().to_owned(),
                property: property.name().to_owned(),
                scalar: property.scalar(),
            });
        };

        let executor = self.executor.clone();
        let dialect = &self.dialect;
        Ok(match kind {
            KeyKind::I8 => {
                KeyGenerator::I8(SequenceValueGenerator::new(state, executor, connection, dialect))
            }
            KeyKind::I16 => {
                KeyGenerator::I16(SequenceValueGenerator::new(state, executor, connection, dialect))
            }
            KeyKind::I32 => {
                KeyGenerator::I32(SequenceValueGenerator::new(state, executor, connection, dialect))
            }
            KeyKind::I64 => {
                KeyGenerator::I64(SequenceValueGenerator::new(state, executor, connection, dialect))
            }
            KeyKind::U8 => {
                KeyGenerator::U8(SequenceValueGenerator::new(state, executor, connection, dialect))
            }
            KeyKind::U16 => {
                KeyGenerator::U16(SequenceValueGenerator::new(state, executor, connection, dialect))
            }
            KeyKind::U32 => {
                KeyGenerator::U32(SequenceValueGenerator::new(state, executor, connection, dialect))
            }
            KeyKind::U64 => {
                KeyGenerator::U64(SequenceValueGenerator::new(state, executor, connection, dialect))
            }
        })
    }
}
