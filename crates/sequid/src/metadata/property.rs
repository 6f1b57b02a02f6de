use core::fmt;

/// The scalar types a property can declare, with any nullability wrapper
/// already removed; nullability is tracked separately on the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ScalarKind {
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
    /// 32-bit floating point.
    F32,
    /// 64-bit floating point.
    F64,
    /// Boolean.
    Bool,
    /// Variable-length text.
    Text,
    /// Variable-length binary.
    Bytes,
    /// Universally unique identifier.
    Uuid,
    /// Point in time.
    Timestamp,
}

impl fmt::Display for ScalarKind {
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
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bool => "bool",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Uuid => "uuid",
            Self::Timestamp => "timestamp",
        })
    }
}

/// The compiled description of one declared property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyShape {
    entity: String,
    name: String,
    scalar: ScalarKind,
    nullable: bool,
}

impl PropertyShape {
    /// Describes property `name` declared on `entity`.
    pub fn new(
        entity: impl Into<String>,
        name: impl Into<String>,
        scalar: ScalarKind,
        nullable: bool,
    ) -> Self {
        Self {
            entity: entity.into(),
            name: name.into(),
            scalar,
            nullable,
        }
    }

    /// Display name of the declaring entity, as used in error messages.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared scalar type, nullable-unwrapped.
    #[must_use]
    pub const fn scalar(&self) -> ScalarKind {
        self.scalar
    }

    /// Whether the property admits nulls.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }
}

/// The primary key of an entity, as positions into its property list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyShape {
    properties: Vec<usize>,
}

impl KeyShape {
    /// A key over the properties at `properties`, indices into the owning
    /// entity's property list.
    #[must_use]
    pub const fn new(properties: Vec<usize>) -> Self {
        Self { properties }
    }

    /// A single-property key.
    #[must_use]
    pub fn single(property: usize) -> Self {
        Self::new(vec![property])
    }

    /// Positions of the key's properties within the owning entity.
    #[must_use]
    pub fn property_indices(&self) -> &[usize] {
        &self.properties
    }
}

/// A relationship traversal declared on an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationShape {
    name: String,
    target: usize,
}

impl NavigationShape {
    /// Navigation `name` pointing at the entity at `target` in the model's
    /// entity list.
    pub fn new(name: impl Into<String>, target: usize) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    /// The navigation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the target entity within the model.
    #[must_use]
    pub const fn target_index(&self) -> usize {
        self.target
    }
}

/// A secondary index declared on an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexShape {
    properties: Vec<usize>,
    unique: bool,
}

impl IndexShape {
    /// An index over the properties at `properties`, indices into the
    /// owning entity's property list.
    #[must_use]
    pub const fn new(properties: Vec<usize>, unique: bool) -> Self {
        Self { properties, unique }
    }

    /// Positions of the indexed properties within the owning entity.
    #[must_use]
    pub fn property_indices(&self) -> &[usize] {
        &self.properties
    }

    /// Whether the index enforces uniqueness.
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.unique
    }
}
