use core::{fmt, iter};
use std::sync::{OnceLock, Weak};

use crate::{
    Error, Result,
    metadata::{
        ForeignKeyShape, IndexShape, KeyShape, Model, NavigationShape, PropertyShape,
        lazy::get_or_publish, model::ModelInner,
    },
};

/// Computes an entity's shape members on first access.
///
/// Loaders run outside any lock and may race on first access; at most one
/// result per member is published, so loaders must be pure functions of
/// the model. Entities that declare no foreign keys, navigations, or
/// indexes inherit the empty defaults and pay no computation for them.
pub trait EntityLoader: Send + Sync {
    /// Produces the primary key shape.
    fn load_key(&self, entity: &EntityShape) -> KeyShape;

    /// Produces the declared properties, in order.
    fn load_properties(&self, entity: &EntityShape) -> Vec<PropertyShape>;

    /// Produces the declared foreign keys.
    fn load_foreign_keys(&self, _entity: &EntityShape) -> Vec<ForeignKeyShape> {
        Vec::new()
    }

    /// Produces the declared navigations.
    fn load_navigations(&self, _entity: &EntityShape) -> Vec<NavigationShape> {
        Vec::new()
    }

    /// Produces the declared indexes.
    fn load_indexes(&self, _entity: &EntityShape) -> Vec<IndexShape> {
        Vec::new()
    }
}

/// The compiled shape of one entity kind.
///
/// Each member set is computed lazily by the shape's [`EntityLoader`] and
/// cached on first access; afterwards every accessor is a cheap read of
/// the cached value, and the cached instance never changes identity for
/// the lifetime of the shape. Shapes are safe to share across threads.
///
/// This shape models leaf entities only: no base type, no derived types,
/// nothing abstract. A hierarchy-aware shape would be a distinct variant.
pub struct EntityShape {
    model: Weak<ModelInner>,
    index: usize,
    name: String,
    loader: Box<dyn EntityLoader>,
    key: OnceLock<KeyShape>,
    properties: OnceLock<Vec<PropertyShape>>,
    foreign_keys: OnceLock<Vec<ForeignKeyShape>>,
    navigations: OnceLock<Vec<NavigationShape>>,
    indexes: OnceLock<Vec<IndexShape>>,
}

impl EntityShape {
    pub(crate) fn new(
        model: Weak<ModelInner>,
        index: usize,
        name: String,
        loader: Box<dyn EntityLoader>,
    ) -> Self {
        Self {
            model,
            index,
            name,
            loader,
            key: OnceLock::new(),
            properties: OnceLock::new(),
            foreign_keys: OnceLock::new(),
            navigations: OnceLock::new(),
            indexes: OnceLock::new(),
        }
    }

    /// The owning model.
    ///
    /// The backward reference is weak — the shape looks its model up, it
    /// never keeps it alive.
    ///
    /// # Panics
    ///
    /// Panics if the model has been dropped; shapes are meant to be
    /// reached through a live [`Model`] handle.
    #[must_use]
    pub fn model(&self) -> Model {
        Model::from_inner(self.model.upgrade().expect("owning model dropped"))
    }

    /// This entity's position in the model's entity list.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Human-readable entity name, as used in error messages.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// The primary key, computed on first access.
    #[must_use]
    pub fn primary_key(&self) -> &KeyShape {
        get_or_publish(&self.key, || self.loader.load_key(self))
    }

    /// All keys declared on the entity. Leaf shapes have exactly the
    /// primary key.
    pub fn keys(&self) -> impl Iterator<Item = &KeyShape> {
        iter::once(self.primary_key())
    }

    /// Declared properties in order, computed on first access.
    #[must_use]
    pub fn properties(&self) -> &[PropertyShape] {
        let properties = get_or_publish(&self.properties, || self.loader.load_properties(self));
        properties
    }

    /// Declared foreign keys; empty unless the loader overrides.
    #[must_use]
    pub fn foreign_keys(&self) -> &[ForeignKeyShape] {
        let foreign_keys =
            get_or_publish(&self.foreign_keys, || self.loader.load_foreign_keys(self));
        foreign_keys
    }

    /// Declared navigations; empty unless the loader overrides.
    #[must_use]
    pub fn navigations(&self) -> &[NavigationShape] {
        let navigations =
            get_or_publish(&self.navigations, || self.loader.load_navigations(self));
        navigations
    }

    /// Declared indexes; empty unless the loader overrides.
    #[must_use]
    pub fn indexes(&self) -> &[IndexShape] {
        let indexes = get_or_publish(&self.indexes, || self.loader.load_indexes(self));
        indexes
    }

    /// Looks up a property by name; `None` when absent.
    ///
    /// A linear scan over the cached set — entity shapes have small,
    /// bounded cardinality.
    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<&PropertyShape> {
        self.properties().iter().find(|property| property.name() == name)
    }

    /// Looks up a property by name.
    ///
    /// # Errors
    ///
    /// [`Error::PropertyNotFound`] naming this entity when absent.
    pub fn property(&self, name: &str) -> Result<&PropertyShape> {
        self.find_property(name).ok_or_else(|| Error::PropertyNotFound {
            entity: self.name.clone(),
            name: name.to_owned(),
        })
    }

    /// Looks up a navigation by name; `None` when absent.
    #[must_use]
    pub fn find_navigation(&self, name: &str) -> Option<&NavigationShape> {
        self.navigations()
            .iter()
            .find(|navigation| navigation.name() == name)
    }

    /// Looks up a navigation by name.
    ///
    /// # Errors
    ///
    /// [`Error::NavigationNotFound`] naming this entity when absent.
    pub fn navigation(&self, name: &str) -> Result<&NavigationShape> {
        self.find_navigation(name)
            .ok_or_else(|| Error::NavigationNotFound {
                entity: self.name.clone(),
                name: name.to_owned(),
            })
    }

    /// Leaf shapes are never abstract.
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        false
    }

    /// Leaf shapes have no derived types.
    #[must_use]
    pub const fn has_derived_types(&self) -> bool {
        false
    }

    /// Leaf shapes have no base type.
    #[must_use]
    pub const fn base_type(&self) -> Option<&Self> {
        None
    }

    /// Types derived from this entity; always empty for leaf shapes.
    pub fn derived_types(&self) -> impl Iterator<Item = &Self> {
        iter::empty()
    }

    /// Concrete types in this entity's hierarchy; always empty for leaf
    /// shapes.
    pub fn concrete_types_in_hierarchy(&self) -> impl Iterator<Item = &Self> {
        iter::empty()
    }

    /// Leaf shapes never require eager snapshots.
    #[must_use]
    pub const fn use_eager_snapshots(&self) -> bool {
        false
    }
}

impl fmt::Debug for EntityShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityShape")
            .field("index", &self.index)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
