use crate::Result;

/// A minimal interface for generating values for newly inserted records.
///
/// Implementations either mint final values, like the sequence-backed
/// allocators here, or temporary placeholders that the store replaces on
/// insert; the two are told apart by
/// [`ValueGenerator::generates_temporary_values`].
pub trait ValueGenerator {
    /// The value type handed to the persistence layer.
    type Value;

    /// Returns the next generated value.
    ///
    /// # Errors
    ///
    /// Fails when the underlying source cannot produce a value, e.g. a
    /// block fetch failed or the value does not fit the declared width.
    fn next_value(&self) -> Result<Self::Value>;

    /// Whether returned values are placeholders the store replaces on
    /// insert. Sequence-backed values are final, so allocators here always
    /// answer `false`.
    fn generates_temporary_values(&self) -> bool;
}
