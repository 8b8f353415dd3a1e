use super::*;
use crate::{
    db::store::MemoryStore,
    error::ErrorClass,
    model::{Cardinality, EntityModel},
    serialize::from_document,
    test_fixtures::{Order, Product, User, seed_graph},
    traits::{EntitySchema, TypeSchema},
};
use bson::{doc, oid::ObjectId};

fn user_doc(graph: &crate::test_fixtures::Graph) -> Document {
    graph
        .store
        .documents(User::COLLECTION)
        .into_iter()
        .find(|doc| doc.get_object_id("_id").ok() == Some(graph.user))
        .unwrap()
}

#[test]
fn populates_collection_reference_in_store_order() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = user_doc(&graph);

    Populator::new(&graph.store, &overrides)
        .populate(User::model(), &mut doc)
        .unwrap();
    let user: User = from_document(doc).unwrap();

    assert_eq!(user.name, "alice");
    let orders = user.orders.unwrap();
    assert_eq!(
        orders.iter().map(|order| order.id).collect::<Vec<_>>(),
        vec![Some(graph.orders[0]), Some(graph.orders[1])]
    );
}

#[test]
fn recursion_reaches_nested_references_and_embeds() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = user_doc(&graph);

    Populator::new(&graph.store, &overrides)
        .populate(User::model(), &mut doc)
        .unwrap();
    let user: User = from_document(doc).unwrap();

    // orders -> products
    let orders = user.orders.unwrap();
    assert_eq!(orders[0].products.as_ref().map(Vec::len), Some(2));
    assert_eq!(orders[1].products.as_ref().map(Vec::len), Some(1));

    // usernames[] -> emails -> domains[] -> company
    let emails = user.usernames[0].emails.as_ref().unwrap();
    assert_eq!(emails[0].id, Some(graph.email));
    let company = emails[0].domains[0].company.as_ref().unwrap();
    assert_eq!(company.id, Some(graph.company));
}

#[test]
fn duplicate_identifiers_yield_distinct_documents() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = doc! {
        "_id": ObjectId::new(),
        "name": "dup",
        "order_refs": [graph.orders[1], graph.orders[0], graph.orders[1]],
    };

    Populator::new(&graph.store, &overrides)
        .populate(User::model(), &mut doc)
        .unwrap();

    assert_eq!(doc.get_array("orders").unwrap().len(), 2);
}

#[test]
fn text_identifiers_resolve_like_native_ones() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = doc! {
        "_id": ObjectId::new(),
        "name": "text",
        "order_refs": [graph.orders[0].to_hex()],
    };

    Populator::new(&graph.store, &overrides)
        .populate(User::model(), &mut doc)
        .unwrap();

    assert_eq!(doc.get_array("orders").unwrap().len(), 1);
}

#[test]
fn disabled_leaf_is_left_null_without_queries() {
    let graph = seed_graph();
    let mut overrides = Overrides::new();
    overrides.set("orders.products", false);
    let mut doc = user_doc(&graph);

    Populator::new(&graph.store, &overrides)
        .populate(User::model(), &mut doc)
        .unwrap();
    let user: User = from_document(doc).unwrap();

    let orders = user.orders.unwrap();
    assert!(orders.iter().all(|order| order.products.is_none()));
    assert_eq!(graph.store.calls_to(Product::COLLECTION), 0);
}

#[test]
fn reset_restores_static_defaults() {
    let graph = seed_graph();
    let mut overrides = Overrides::new();
    overrides.set("orders.products", false);
    overrides.reset();
    let mut doc = user_doc(&graph);

    Populator::new(&graph.store, &overrides)
        .populate(User::model(), &mut doc)
        .unwrap();

    assert_eq!(graph.store.calls_to(Product::COLLECTION), 2);
}

#[test]
fn disabled_inner_edge_stops_recursion() {
    let graph = seed_graph();
    let mut overrides = Overrides::new();
    overrides.set("orders", false);
    let mut doc = user_doc(&graph);

    Populator::new(&graph.store, &overrides)
        .populate(User::model(), &mut doc)
        .unwrap();

    assert!(doc.get("orders").is_none());
    assert_eq!(graph.store.calls_to(Order::COLLECTION), 0);
    assert_eq!(graph.store.calls_to(Product::COLLECTION), 0);
}

#[test]
fn existing_values_are_not_refetched_but_are_recursed() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let order = graph.store.documents(Order::COLLECTION).remove(0);
    let mut doc = doc! {
        "_id": ObjectId::new(),
        "name": "prefilled",
        "orders": [order],
        "order_refs": [graph.orders[0]],
    };

    Populator::new(&graph.store, &overrides)
        .populate(User::model(), &mut doc)
        .unwrap();

    assert_eq!(graph.store.calls_to(Order::COLLECTION), 0);
    let orders = doc.get_array("orders").unwrap();
    let products = orders[0].as_document().unwrap().get_array("products").unwrap();
    assert_eq!(products.len(), 2);
}

#[test]
fn empty_key_set_assigns_empty_collection_without_query() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = doc! { "_id": ObjectId::new(), "name": "none", "order_refs": [] };

    Populator::new(&graph.store, &overrides)
        .populate(User::model(), &mut doc)
        .unwrap();

    assert_eq!(doc.get_array("orders").unwrap().len(), 0);
    assert!(graph.store.calls().is_empty());
}

#[test]
fn absent_local_field_is_skipped() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = doc! { "_id": ObjectId::new(), "name": "bare" };

    Populator::new(&graph.store, &overrides)
        .populate(User::model(), &mut doc)
        .unwrap();

    assert!(doc.get("orders").is_none());
    assert!(graph.store.calls().is_empty());
}

#[test]
fn unsupported_identifier_aborts() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = doc! { "_id": ObjectId::new(), "name": "bad", "order_refs": [42] };

    let err = Populator::new(&graph.store, &overrides)
        .populate(User::model(), &mut doc)
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::UnsupportedKey);
    assert_eq!(err.origin, ErrorOrigin::Populate);
    assert!(graph.store.calls().is_empty());
}

#[test]
fn store_failures_propagate_unchanged() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = doc! { "_id": ObjectId::new(), "name": "x", "order_refs": [graph.orders[0]] };

    let err = Populator::new(&FailingStore, &overrides)
        .populate(User::model(), &mut doc)
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::Store);
    assert!(matches!(
        err.store_error(),
        Some(crate::db::store::StoreError::Backend(message)) if message == "offline"
    ));
}

#[test]
fn joined_edge_with_unsupported_identifier_aborts() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = doc! { "_id": ObjectId::new(), "name": "bad", "orders": [], "order_refs": [42] };

    let err = Populator::new(&graph.store, &overrides)
        .verify_joined(true)
        .populate(User::model(), &mut doc)
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::UnsupportedKey);
    assert_eq!(err.origin, ErrorOrigin::Populate);
}

#[test]
fn joined_edge_without_local_value_is_cleared() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = doc! { "_id": ObjectId::new(), "name": "bare", "orders": [] };

    Populator::new(&graph.store, &overrides)
        .verify_joined(true)
        .populate(User::model(), &mut doc)
        .unwrap();

    assert!(doc.get("orders").is_none());
    assert!(graph.store.calls().is_empty());
}

#[test]
fn joined_edge_over_text_identifiers_is_fetched_again() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = doc! {
        "_id": ObjectId::new(),
        "name": "text",
        "orders": [],
        "order_refs": [graph.orders[1].to_hex()],
    };

    Populator::new(&graph.store, &overrides)
        .verify_joined(true)
        .populate(User::model(), &mut doc)
        .unwrap();

    let orders = doc.get_array("orders").unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(
        orders[0].as_document().unwrap().get_object_id("_id").unwrap(),
        graph.orders[1]
    );
    assert_eq!(graph.store.calls_to(Order::COLLECTION), 1);
}

#[test]
fn joined_edge_over_native_identifiers_is_kept() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let order = graph.store.documents(Order::COLLECTION).remove(0);
    let mut doc = doc! {
        "_id": ObjectId::new(),
        "name": "native",
        "orders": [order],
        "order_refs": [graph.orders[0]],
    };

    Populator::new(&graph.store, &overrides)
        .verify_joined(true)
        .populate(User::model(), &mut doc)
        .unwrap();

    assert_eq!(doc.get_array("orders").unwrap().len(), 1);
    assert_eq!(graph.store.calls_to(Order::COLLECTION), 0);
}

// ---------------------------------------------------------------------------
// Hand-built models
// ---------------------------------------------------------------------------

fn batch_model() -> &'static TypeModel {
    static MODEL: TypeModel = TypeModel {
        path: "tests::Shipment",
        fields: &[
            FieldModel {
                name: "_id",
                cardinality: Cardinality::One,
                kind: FieldKind::Plain,
            },
            FieldModel {
                name: "batch",
                cardinality: Cardinality::One,
                kind: FieldKind::Plain,
            },
            FieldModel {
                name: "product",
                cardinality: Cardinality::One,
                kind: FieldKind::Reference(ReferenceModel {
                    target: <Product as EntitySchema>::entity_model,
                    collection: None,
                    local_field: "batch",
                    foreign_field: Some("batch"),
                    auto_populate: true,
                }),
            },
        ],
    };

    &MODEL
}

fn lazy_model() -> &'static TypeModel {
    static MODEL: TypeModel = TypeModel {
        path: "tests::LazyUser",
        fields: &[
            FieldModel {
                name: "order_refs",
                cardinality: Cardinality::Many,
                kind: FieldKind::Plain,
            },
            FieldModel {
                name: "orders",
                cardinality: Cardinality::Many,
                kind: FieldKind::Reference(ReferenceModel {
                    target: <Order as EntitySchema>::entity_model,
                    collection: None,
                    local_field: "order_refs",
                    foreign_field: None,
                    auto_populate: false,
                }),
            },
        ],
    };

    &MODEL
}

fn nested_local_model() -> &'static TypeModel {
    static MODEL: TypeModel = TypeModel {
        path: "tests::Nested",
        fields: &[
            FieldModel {
                name: "meta",
                cardinality: Cardinality::One,
                kind: FieldKind::Plain,
            },
            FieldModel {
                name: "orders",
                cardinality: Cardinality::Many,
                kind: FieldKind::Reference(ReferenceModel {
                    target: <Order as EntitySchema>::entity_model,
                    collection: None,
                    local_field: "meta.order_refs",
                    foreign_field: None,
                    auto_populate: true,
                }),
            },
        ],
    };

    &MODEL
}

fn seed_batches() -> (MemoryStore, ObjectId) {
    let store = MemoryStore::new();
    let batch = ObjectId::new();
    store.seed(
        Product::COLLECTION,
        [
            doc! { "name": "first", "price": 1, "batch": batch },
            doc! { "name": "second", "price": 2, "batch": batch },
        ],
    );

    (store, batch)
}

#[test]
fn scalar_reference_keeps_first_match() {
    let (store, batch) = seed_batches();
    let overrides = Overrides::new();
    let mut doc = doc! { "_id": ObjectId::new(), "batch": batch };

    Populator::new(&store, &overrides)
        .populate(batch_model(), &mut doc)
        .unwrap();

    assert_eq!(
        doc.get_document("product").unwrap().get_str("name").unwrap(),
        "first"
    );
}

#[test]
fn unique_scalar_match_rejects_ambiguity() {
    let (store, batch) = seed_batches();
    let overrides = Overrides::new();
    let mut doc = doc! { "_id": ObjectId::new(), "batch": batch };

    let err = Populator::new(&store, &overrides)
        .scalar_match(ScalarMatch::Unique)
        .populate(batch_model(), &mut doc)
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::AmbiguousReference);
    assert!(doc.get("product").is_none());
}

#[test]
fn scalar_reference_without_match_stays_null() {
    let (store, _) = seed_batches();
    let overrides = Overrides::new();
    let mut doc = doc! { "_id": ObjectId::new(), "batch": ObjectId::new() };

    Populator::new(&store, &overrides)
        .populate(batch_model(), &mut doc)
        .unwrap();

    assert!(doc.get("product").is_none());
}

#[test]
fn lazy_reference_needs_an_override() {
    let graph = seed_graph();
    let mut doc = doc! { "order_refs": [graph.orders[0]] };

    let defaults = Overrides::new();
    Populator::new(&graph.store, &defaults)
        .populate(lazy_model(), &mut doc)
        .unwrap();
    assert!(doc.get("orders").is_none());

    let mut enabled = Overrides::new();
    enabled.set("orders", true);
    Populator::new(&graph.store, &enabled)
        .populate(lazy_model(), &mut doc)
        .unwrap();
    assert_eq!(doc.get_array("orders").unwrap().len(), 1);
}

#[test]
fn dotted_local_field_resolves_relative_to_document() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = doc! { "meta": { "order_refs": [graph.orders[1]] } };

    Populator::new(&graph.store, &overrides)
        .populate(nested_local_model(), &mut doc)
        .unwrap();

    assert_eq!(doc.get_array("orders").unwrap().len(), 1);
}

#[test]
fn unresolvable_local_path_is_soft() {
    let graph = seed_graph();
    let overrides = Overrides::new();
    let mut doc = doc! { "meta": "flat" };

    Populator::new(&graph.store, &overrides)
        .populate(nested_local_model(), &mut doc)
        .unwrap();

    assert!(doc.get("orders").is_none());
    assert!(graph.store.calls().is_empty());
}

#[test]
fn hand_built_models_are_consistent_with_entity_models() {
    let model: &EntityModel = Product::entity_model();

    assert_eq!(model.collection, "products");
    assert!(crate::model::validate_type_model(batch_model()).is_ok());
}

///
/// FailingStore
///

struct FailingStore;

impl DocumentStore for FailingStore {
    fn find(&self, _: &str, _: &Document) -> Result<Vec<Document>, crate::db::store::StoreError> {
        Err(crate::db::store::StoreError::Backend("offline".into()))
    }

    fn find_by_field(
        &self,
        _: &str,
        _: &str,
        _: &[Bson],
    ) -> Result<Vec<Document>, crate::db::store::StoreError> {
        Err(crate::db::store::StoreError::Backend("offline".into()))
    }

    fn aggregate(
        &self,
        _: &str,
        _: &Document,
        _: &[crate::db::pipeline::Stage],
    ) -> Result<Vec<Document>, crate::db::store::StoreError> {
        Err(crate::db::store::StoreError::Backend("offline".into()))
    }

    fn insert_one(&self, _: &str, _: Document) -> Result<Bson, crate::db::store::StoreError> {
        Err(crate::db::store::StoreError::Backend("offline".into()))
    }

    fn replace_one(
        &self,
        _: &str,
        _: &Bson,
        _: Document,
    ) -> Result<bool, crate::db::store::StoreError> {
        Err(crate::db::store::StoreError::Backend("offline".into()))
    }
}
