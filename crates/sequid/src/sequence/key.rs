use core::fmt;

use crate::metadata::ScalarKind;

/// The key widths a sequence can fill.
///
/// A closed enumeration: the width is resolved once, when a generator is
/// created for a key property, and drives conversion and overflow rules
/// from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// 8-bit signed key.
    I8,
    /// 16-bit signed key.
    I16,
    /// 32-bit signed key.
    I32,
    /// 64-bit signed key.
    I64,
    /// 8-bit unsigned key.
    U8,
    /// 16-bit unsigned key.
    U16,
    /// 32-bit unsigned key.
    U32,
    /// 64-bit unsigned key.
    U64,
}

impl KeyKind {
    /// Maps a property's nullable-unwrapped scalar type to a key width.
    ///
    /// Returns `None` for every non-integer scalar; callers turn that into
    /// a configuration error naming the property.
    #[must_use]
    pub const fn of_scalar(scalar: ScalarKind) -> Option<Self> {
        match scalar {
            ScalarKind::I8 => Some(Self::I8),
            ScalarKind::I16 => Some(Self::I16),
            ScalarKind::I32 => Some(Self::I32),
            ScalarKind::I64 => Some(Self::I64),
            ScalarKind::U8 => Some(Self::U8),
            ScalarKind::U16 => Some(Self::U16),
            ScalarKind::U32 => Some(Self::U32),
            ScalarKind::U64 => Some(Self::U64),
            _ => None,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        })
    }
}

/// One generated key, tagged with the width it was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyValue {
    /// 8-bit signed key.
    I8(i8),
    /// 16-bit signed key.
    I16(i16),
    /// 32-bit signed key.
    I32(i32),
    /// 64-bit signed key.
    I64(i64),
    /// 8-bit unsigned key.
    U8(u8),
    /// 16-bit unsigned key.
    U16(u16),
    /// 32-bit unsigned key.
    U32(u32),
    /// 64-bit unsigned key.
    U64(u64),
}

impl KeyValue {
    /// The width this value was generated for.
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

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I8(value) => value.fmt(f),
            Self::I16(value) => value.fmt(f),
            Self::I32(value) => value.fmt(f),
            Self::I64(value) => value.fmt(f),
            Self::U8(value) => value.fmt(f),
            Self::U16(value) => value.fmt(f),
            Self::U32(value) => value.fmt(f),
            Self::U64(value) => value.fmt(f),
        }
    }
}

/// An integer width a sequence-backed generator can produce.
///
/// Implemented for the eight fixed-width integer types. Conversion from the
/// raw counter value must detect overflow: a value outside the declared
/// width is a configuration mismatch, never a truncation.
pub trait SequenceKey:
    Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// The tagged width for this type.
    const KIND: KeyKind;

    /// Converts a raw counter value; `None` when it does not fit.
    fn from_sequence(raw: i64) -> Option<Self>;

    /// Wraps a value of this width in a [`KeyValue`].
    fn into_key_value(self) -> KeyValue;
}

macro_rules! impl_sequence_key {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl SequenceKey for $ty {
                const KIND: KeyKind = KeyKind::$kind;

                fn from_sequence(raw: i64) -> Option<Self> {
                    Self::try_from(raw).ok()
                }

                fn into_key_value(self) -> KeyValue {
                    KeyValue::$kind(self)
                }
            }
        )*
    };
}

impl_sequence_key! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}
