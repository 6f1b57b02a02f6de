use core::fmt;
use std::sync::{Arc, Weak};

use crate::metadata::{EntityShape, KeyShape, Model, PropertyShape, model::ModelInner};

/// Compact definition of a many-to-one edge: three positions into the
/// model's entity list and the dependent entity's property list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignKeyDef {
    /// Position of the dependent (key-holding) entity in the model.
    pub dependent: u16,
    /// Position of the key-bearing property within the dependent entity.
    pub dependent_property: u16,
    /// Position of the principal (referenced) entity in the model.
    pub principal: u16,
}

impl ForeignKeyDef {
    /// Builds a definition from raw positions.
    #[must_use]
    pub const fn new(dependent: u16, dependent_property: u16, principal: u16) -> Self {
        Self {
            dependent,
            dependent_property,
            principal,
        }
    }
}

/// A foreign key resolved through the model on every access.
///
/// The shape holds indices, never entity references: the model's entity
/// list is stable, so positions stay valid for the model's lifetime and
/// the shape owns nothing.
///
/// This variant models many-to-one edges only; a one-to-one relationship
/// needs a different shape, which is why [`Self::is_unique`] is always
/// `false`.
pub struct ForeignKeyShape {
    model: Weak<ModelInner>,
    def: ForeignKeyDef,
}

impl ForeignKeyShape {
    /// A foreign key in `model` described by `def`.
    #[must_use]
    pub fn new(model: &Model, def: ForeignKeyDef) -> Self {
        Self {
            model: model.downgrade(),
            def,
        }
    }

    /// The underlying position triple.
    #[must_use]
    pub const fn definition(&self) -> ForeignKeyDef {
        self.def
    }

    fn model(&self) -> Model {
        Model::from_inner(self.model.upgrade().expect("owning model dropped"))
    }

    fn entity(&self, index: u16) -> Arc<EntityShape> {
        self.model()
            .entity(usize::from(index))
            .cloned()
            .expect("foreign key entity position out of range")
    }

    /// The entity holding the key properties.
    ///
    /// # Panics
    ///
    /// Panics if the owning model has been dropped, or the definition's
    /// positions do not resolve in it.
    #[must_use]
    pub fn dependent_entity(&self) -> Arc<EntityShape> {
        self.entity(self.def.dependent)
    }

    /// The referenced entity.
    ///
    /// # Panics
    ///
    /// Panics if the owning model has been dropped, or the definition's
    /// positions do not resolve in it.
    #[must_use]
    pub fn principal_entity(&self) -> Arc<EntityShape> {
        self.entity(self.def.principal)
    }

    /// The key-bearing properties on the dependent side.
    ///
    /// # Panics
    ///
    /// Panics if the owning model has been dropped, or the definition's
    /// positions do not resolve in it.
    #[must_use]
    pub fn properties(&self) -> Vec<PropertyShape> {
        let entity = self.dependent_entity();
        vec![entity.properties()[usize::from(self.def.dependent_property)].clone()]
    }

    /// The principal entity's primary key.
    ///
    /// # Panics
    ///
    /// Panics if the owning model has been dropped, or the definition's
    /// positions do not resolve in it.
    #[must_use]
    pub fn principal_key(&self) -> KeyShape {
        self.principal_entity().primary_key().clone()
    }

    /// Whether the relationship is mandatory: `true` iff every constituent
    /// property is non-nullable.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.properties().iter().all(|property| !property.is_nullable())
    }

    /// Many-to-one edges are never unique.
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        false
    }
}

impl fmt::Debug for ForeignKeyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignKeyShape")
            .field("def", &self.def)
            .finish_non_exhaustive()
    }
}
