use crate::Result;

/// A failure surfaced by the backing store during a scalar query.
///
/// The allocator never retries these: a failed fetch may or may not have
/// advanced the counter, and re-issuing the statement here could silently
/// skip or duplicate a block. Callers own the retry policy and re-invoke
/// value generation as a whole.
#[derive(thiserror::Error, Debug)]
#[error("scalar query failed: {message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<Box<dyn core::error::Error + Send + Sync>>,
}

impl StoreError {
    /// An error carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// An error wrapping the driver's underlying failure.
    pub fn new(
        message: impl Into<String>,
        source: impl Into<Box<dyn core::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// A live connection to the backing store.
///
/// Only the ambient transaction is visible at this seam: a block fetch must
/// participate in whatever transaction the caller has open, so the reserved
/// block commits or rolls back together with the surrounding insert.
pub trait Connection {
    /// The transaction handle type exposed by the driver.
    type Transaction;

    /// Returns the transaction currently open on this connection, if any.
    fn active_transaction(&self) -> Option<&Self::Transaction>;
}

/// Executes a single-value query against the backing store.
///
/// Implementations wrap whatever driver the application uses; the allocator
/// issues exactly one such query per block fetch.
pub trait ScalarExecutor<C: Connection> {
    /// Runs `sql` on `connection`, inside `transaction` when one is open,
    /// and returns the scalar result.
    ///
    /// Sequence values are normalized to `i64` regardless of the declared
    /// key width; width conversion happens in the allocator, with overflow
    /// detection.
    ///
    /// # Errors
    ///
    /// Any driver failure is wrapped in [`StoreError`] and propagated
    /// unchanged.
    fn execute_scalar(
        &self,
        connection: &C,
        transaction: Option<&C::Transaction>,
        sql: &str,
    ) -> Result<i64, StoreError>;
}

/// Produces store-specific SQL fragments.
///
/// Only identifier quoting is consumed here; the statement shapes
/// themselves are fixed.
///
/// # Example
///
/// ```
/// use sequid::store::SqlDialect;
///
/// struct Ansi;
/// impl SqlDialect for Ansi {
///     fn delimit_identifier(&self, name: &str) -> String {
///         format!("\"{}\"", name.replace('"', "\"\""))
///     }
/// }
///
/// assert_eq!(Ansi.delimit_identifier("orders"), "\"orders\"");
/// ```
pub trait SqlDialect {
    /// Wraps `name` in the store's identifier delimiters so it can be
    /// embedded safely in statement text.
    fn delimit_identifier(&self, name: &str) -> String;
}
