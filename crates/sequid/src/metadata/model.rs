use core::fmt;
use std::sync::{Arc, Weak};

use crate::metadata::{EntityLoader, EntityShape};

pub(crate) struct ModelInner {
    entities: Vec<Arc<EntityShape>>,
}

/// The compiled model: a stable, index-addressable list of entity shapes.
///
/// `Model` is a cheap cloneable handle; all clones observe the same shapes
/// and the same caches. The entity list is fixed at build time and
/// append-only by construction, so positions into it stay valid for the
/// model's lifetime — which is what lets relationship shapes hold bare
/// indices instead of owning references.
///
/// # Example
///
/// ```
/// use sequid::metadata::{EntityLoader, EntityShape, KeyShape, Model, PropertyShape, ScalarKind};
///
/// struct CustomerLoader;
///
/// impl EntityLoader for CustomerLoader {
///     fn load_key(&self, _entity: &EntityShape) -> KeyShape {
///         KeyShape::single(0)
///     }
///
///     fn load_properties(&self, entity: &EntityShape) -> Vec<PropertyShape> {
///         vec![PropertyShape::new(entity.display_name(), "Id", ScalarKind::I64, false)]
///     }
/// }
///
/// let model = Model::builder().entity("Customer", CustomerLoader).build();
/// let customer = model.entity(0).unwrap();
/// assert_eq!(customer.properties().len(), 1);
/// assert!(customer.find_property("Name").is_none());
/// ```
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

impl Model {
    /// Starts building a model.
    #[must_use]
    pub fn builder() -> ModelBuilder {
        ModelBuilder::default()
    }

    pub(crate) fn from_inner(inner: Arc<ModelInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ModelInner> {
        Arc::downgrade(&self.inner)
    }

    /// The entity at `index`, in declaration order.
    #[must_use]
    pub fn entity(&self, index: usize) -> Option<&Arc<EntityShape>> {
        self.inner.entities.get(index)
    }

    /// Looks up an entity shape by display name.
    #[must_use]
    pub fn find_entity(&self, name: &str) -> Option<&Arc<EntityShape>> {
        self.inner
            .entities
            .iter()
            .find(|entity| entity.display_name() == name)
    }

    /// All entity shapes, in declaration order.
    #[must_use]
    pub fn entities(&self) -> &[Arc<EntityShape>] {
        &self.inner.entities
    }

    /// Number of entities in the model.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entities.len()
    }

    /// Whether the model declares no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entities.is_empty()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.inner.entities.iter().map(|entity| entity.display_name()))
            .finish()
    }
}

/// Assembles a [`Model`] from entity definitions.
///
/// This is the seam for whatever configuration layer produces the mapping:
/// each entity contributes a display name and a loader that computes its
/// shape members on first access.
#[derive(Default)]
pub struct ModelBuilder {
    entities: Vec<(String, Box<dyn EntityLoader>)>,
}

impl ModelBuilder {
    /// Appends an entity; its index is its position in insertion order.
    #[must_use]
    pub fn entity(mut self, name: impl Into<String>, loader: impl EntityLoader + 'static) -> Self {
        self.entities.push((name.into(), Box::new(loader)));
        self
    }

    /// Compiles the model. Entity positions are final after this point.
    #[must_use]
    pub fn build(self) -> Model {
        let inner = Arc::new_cyclic(|model: &Weak<ModelInner>| ModelInner {
            entities: self
                .entities
                .into_iter()
                .enumerate()
                .map(|(index, (name, loader))| {
                    Arc::new(EntityShape::new(model.clone(), index, name, loader))
                })
                .collect(),
        });
        Model { inner }
    }
}
