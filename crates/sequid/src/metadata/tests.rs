use std::collections::HashSet;
use std::sync::{
    Arc, Barrier,
    atomic::{AtomicUsize, Ordering},
};
use std::thread::scope;

use crate::{
    Error,
    metadata::{
        EntityLoader, EntityShape, ForeignKeyDef, ForeignKeyShape, IndexShape, KeyShape, Model,
        NavigationShape, PropertyShape, ScalarKind,
    },
};

/// `Order` at position 0: key on `Id`, a foreign key from `CustomerId` to
/// `Customer` at position 1.
struct OrderLoader {
    nullable_customer: bool,
}

impl OrderLoader {
    fn required() -> Self {
        Self {
            nullable_customer: false,
        }
    }

    fn optional() -> Self {
        Self {
            nullable_customer: true,
        }
    }
}

impl EntityLoader for OrderLoader {
    fn load_key(&self, _entity: &EntityShape) -> KeyShape {
        KeyShape::single(0)
    }

    fn load_properties(&self, entity: &EntityShape) -> Vec<PropertyShape> {
        let name = entity.display_name();
        vec![
            PropertyShape::new(name, "Id", ScalarKind::I64, false),
            PropertyShape::new(name, "CustomerId", ScalarKind::I32, self.nullable_customer),
            PropertyShape::new(name, "Note", ScalarKind::Text, true),
        ]
    }

    fn load_foreign_keys(&self, entity: &EntityShape) -> Vec<ForeignKeyShape> {
        vec![ForeignKeyShape::new(
            &entity.model(),
            ForeignKeyDef::new(0, 1, 1),
        )]
    }

    fn load_navigations(&self, _entity: &EntityShape) -> Vec<NavigationShape> {
        vec![NavigationShape::new("Customer", 1)]
    }

    fn load_indexes(&self, _entity: &EntityShape) -> Vec<IndexShape> {
        vec![IndexShape::new(vec![1], false)]
    }
}

/// `Customer` at position 1: key on `Id`, no relationships — everything
/// beyond key and properties comes from the default loaders.
struct CustomerLoader;

impl EntityLoader for CustomerLoader {
    fn load_key(&self, _entity: &EntityShape) -> KeyShape {
        KeyShape::single(0)
    }

    fn load_properties(&self, entity: &EntityShape) -> Vec<PropertyShape> {
        let name = entity.display_name();
        vec![
            PropertyShape::new(name, "Id", ScalarKind::I32, false),
            PropertyShape::new(name, "Name", ScalarKind::Text, true),
        ]
    }
}

/// Counts property loads so caching can be observed from outside.
struct CountingLoader {
    property_loads: Arc<AtomicUsize>,
}

impl EntityLoader for CountingLoader {
    fn load_key(&self, _entity: &EntityShape) -> KeyShape {
        KeyShape::single(0)
    }

    fn load_properties(&self, entity: &EntityShape) -> Vec<PropertyShape> {
        self.property_loads.fetch_add(1, Ordering::Relaxed);
        vec![PropertyShape::new(
            entity.display_name(),
            "Id",
            ScalarKind::I64,
            false,
        )]
    }
}

fn sample_model() -> Model {
    Model::builder()
        .entity("Order", OrderLoader::required())
        .entity("Customer", CustomerLoader)
        .build()
}

#[test]
fn properties_cached_after_first_access() {
    let loads = Arc::new(AtomicUsize::new(0));
    let model = Model::builder()
        .entity(
            "Widget",
            CountingLoader {
                property_loads: Arc::clone(&loads),
            },
        )
        .build();
    let widget = model.entity(0).unwrap();

    let first = widget.properties();
    let second = widget.properties();

    assert!(core::ptr::eq(first, second), "same cached instance");
    assert_eq!(loads.load(Ordering::Relaxed), 1);
}

#[test]
fn racing_first_readers_observe_one_instance() {
    const THREADS: usize = 8;

    let loads = Arc::new(AtomicUsize::new(0));
    let model = Model::builder()
        .entity(
            "Widget",
            CountingLoader {
                property_loads: Arc::clone(&loads),
            },
        )
        .build();
    let widget = model.entity(0).unwrap();
    let barrier = Barrier::new(THREADS);

    let mut pointers = HashSet::new();
    scope(|s| {
        let mut handles = Vec::new();
        for _ in 0..THREADS {
            let widget = Arc::clone(widget);
            let barrier = &barrier;
            handles.push(s.spawn(move || {
                barrier.wait();
                widget.properties().as_ptr() as usize
            }));
        }
        for handle in handles {
            pointers.insert(handle.join().unwrap());
        }
    });

    assert_eq!(pointers.len(), 1, "every reader saw the published instance");
    // Racing loaders may have run more than once; only one result survives.
    assert!(loads.load(Ordering::Relaxed) >= 1);
}

#[test]
fn primary_key_identity_stable() {
    let model = sample_model();
    let order = model.entity(0).unwrap();

    assert!(core::ptr::eq(order.primary_key(), order.primary_key()));
    assert_eq!(order.primary_key().property_indices(), &[0]);
}

#[test]
fn keys_yields_exactly_the_primary_key() {
    let model = sample_model();
    let order = model.entity(0).unwrap();

    let keys: Vec<_> = order.keys().collect();
    assert_eq!(keys.len(), 1);
    assert!(core::ptr::eq(keys[0], order.primary_key()));
}

#[test]
fn defaults_are_empty_for_plain_entities() {
    let model = sample_model();
    let customer = model.entity(1).unwrap();

    assert!(customer.foreign_keys().is_empty());
    assert!(customer.navigations().is_empty());
    assert!(customer.indexes().is_empty());
}

#[test]
fn property_lookup_by_name() {
    let model = sample_model();
    let customer = model.entity(1).unwrap();

    assert_eq!(customer.find_property("Name").unwrap().scalar(), ScalarKind::Text);
    assert!(customer.find_property("Missing").is_none());

    match customer.property("Missing") {
        Err(Error::PropertyNotFound { entity, name }) => {
            assert_eq!(entity, "Customer");
            assert_eq!(name, "Missing");
        }
        other => panic!("expected PropertyNotFound, got {other:?}"),
    }
}

#[test]
fn missing_property_error_names_the_entity() {
    let model = sample_model();
    let customer = model.entity(1).unwrap();

    let message = customer.property("Missing").unwrap_err().to_string();
    assert!(message.contains("Customer"));
    assert!(message.contains("Missing"));
}

#[test]
fn navigation_lookup_by_name() {
    let model = sample_model();
    let order = model.entity(0).unwrap();

    assert_eq!(order.find_navigation("Customer").unwrap().target_index(), 1);
    assert!(order.find_navigation("Missing").is_none());
    assert!(matches!(
        order.navigation("Missing"),
        Err(Error::NavigationNotFound { .. })
    ));
}

#[test]
fn foreign_key_resolves_through_model() {
    let model = sample_model();
    let order = model.entity(0).unwrap();

    let foreign_keys = order.foreign_keys();
    assert_eq!(foreign_keys.len(), 1);

    let fk = &foreign_keys[0];
    assert_eq!(fk.definition(), ForeignKeyDef::new(0, 1, 1));
    assert_eq!(fk.dependent_entity().display_name(), "Order");
    assert_eq!(fk.principal_entity().display_name(), "Customer");

    let properties = fk.properties();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].name(), "CustomerId");

    assert_eq!(fk.principal_key().property_indices(), &[0]);
    assert!(fk.is_required());
    assert!(!fk.is_unique());
}

#[test]
fn foreign_key_optional_when_property_nullable() {
    let model = Model::builder()
        .entity("Order", OrderLoader::optional())
        .entity("Customer", CustomerLoader)
        .build();
    let order = model.entity(0).unwrap();

    assert!(!order.foreign_keys()[0].is_required());
}

#[test]
fn index_shape_reports_declared_columns() {
    let model = sample_model();
    let order = model.entity(0).unwrap();

    let indexes = order.indexes();
    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0].property_indices(), &[1]);
    assert!(!indexes[0].is_unique());
}

#[test]
fn leaf_shapes_expose_flat_hierarchy_facts() {
    let model = sample_model();
    let order = model.entity(0).unwrap();

    assert!(!order.is_abstract());
    assert!(!order.has_derived_types());
    assert!(order.base_type().is_none());
    assert_eq!(order.derived_types().count(), 0);
    assert_eq!(order.concrete_types_in_hierarchy().count(), 0);
    assert!(!order.use_eager_snapshots());
}

#[test]
fn model_lookups() {
    let model = sample_model();

    assert_eq!(model.len(), 2);
    assert!(!model.is_empty());
    assert_eq!(model.find_entity("Customer").unwrap().index(), 1);
    assert!(model.find_entity("Missing").is_none());
    assert!(model.entity(5).is_none());
}

#[test]
fn entity_reaches_its_model_through_the_backref() {
    let model = sample_model();
    let order = model.entity(0).unwrap();

    assert_eq!(order.model().len(), 2);
    assert_eq!(order.index(), 0);
}
