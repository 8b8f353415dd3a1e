#![allow(dead_code)]

use docgraph::{prelude::*, serialize::to_document};
use tracing_subscriber::EnvFilter;

///
/// Customer
///

#[derive(Clone, Debug, Default, Deserialize, Entity, PartialEq, Serialize)]
pub struct Customer {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,

    #[docgraph(reference(local = "order_refs"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<Order>>,
    #[serde(default)]
    pub order_refs: Vec<ObjectId>,
}

///
/// Order
///

#[derive(Clone, Debug, Default, Deserialize, Entity, PartialEq, Serialize)]
pub struct Order {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub number: i32,

    #[docgraph(reference(local = "product_refs"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(default)]
    pub product_refs: Vec<ObjectId>,
}

///
/// Product
///

#[derive(Clone, Debug, Default, Deserialize, Entity, PartialEq, Serialize)]
pub struct Product {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub sku: String,
    pub price: i64,
    #[serde(default)]
    pub catalog_id: Option<ObjectId>,
}

///
/// Team
/// camelCase on the wire, a lazy scalar reference matched on a non-id field.
///

#[derive(Clone, Debug, Default, Deserialize, Entity, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub team_name: String,

    #[docgraph(embed)]
    #[serde(default)]
    pub members: Vec<Member>,

    #[docgraph(reference(local = "flagship_catalog_id", foreign = "catalog_id", lazy))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flagship: Option<Product>,
    #[serde(default)]
    pub flagship_catalog_id: Option<ObjectId>,
}

///
/// Member
///

#[derive(Clone, Debug, Default, Deserialize, Embedded, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub display_name: String,

    #[docgraph(reference(local = "customer_ref", collection = "customers"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub customer_ref: Option<ObjectId>,
}

///
/// Shop
///
/// Seeded store. Products p1, p2, p3 (p2 and p3 share a catalog id);
/// orders o1 = [p1, p2], o2 = [p2], o3 = [p1, p1]; customers ann = [o1, o2]
/// and ben = [o2, o2, o3]; teams "core" (three members) and "empty".
///

pub struct Shop {
    pub store: MemoryStore,
    pub products: [ObjectId; 3],
    pub orders: [ObjectId; 3],
    pub ann: ObjectId,
    pub ben: ObjectId,
    pub core_team: ObjectId,
    pub shared_catalog: ObjectId,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn doc_of<T: Serialize>(value: &T) -> Document {
    to_document(value).unwrap()
}

fn product(id: ObjectId, sku: &str, price: i64, catalog_id: ObjectId) -> Document {
    doc_of(&Product {
        id: Some(id),
        sku: sku.into(),
        price,
        catalog_id: Some(catalog_id),
    })
}

fn order(id: ObjectId, number: i32, product_refs: Vec<ObjectId>) -> Document {
    doc_of(&Order {
        id: Some(id),
        number,
        products: None,
        product_refs,
    })
}

fn customer(id: ObjectId, name: &str, order_refs: Vec<ObjectId>) -> Document {
    doc_of(&Customer {
        id: Some(id),
        name: name.into(),
        orders: None,
        order_refs,
    })
}

fn member(name: &str, customer_ref: Option<ObjectId>) -> Member {
    Member {
        display_name: name.into(),
        customer: None,
        customer_ref,
    }
}

pub fn seed_shop() -> Shop {
    init_tracing();

    let store = MemoryStore::new();
    let products = [ObjectId::new(), ObjectId::new(), ObjectId::new()];
    let orders = [ObjectId::new(), ObjectId::new(), ObjectId::new()];
    let (ann, ben) = (ObjectId::new(), ObjectId::new());
    let core_team = ObjectId::new();
    let shared_catalog = ObjectId::new();
    let [p1, p2, p3] = products;
    let [o1, o2, o3] = orders;

    store.seed(
        Product::COLLECTION,
        [
            product(p1, "p1", 10, ObjectId::new()),
            product(p2, "p2", 20, shared_catalog),
            product(p3, "p3", 30, shared_catalog),
        ],
    );
    store.seed(
        Order::COLLECTION,
        [
            order(o1, 1, vec![p1, p2]),
            order(o2, 2, vec![p2]),
            order(o3, 3, vec![p1, p1]),
        ],
    );
    store.seed(
        Customer::COLLECTION,
        [
            customer(ann, "ann", vec![o1, o2]),
            customer(ben, "ben", vec![o2, o2, o3]),
        ],
    );
    store.seed(
        Team::COLLECTION,
        [
            doc_of(&Team {
                id: Some(core_team),
                team_name: "core".into(),
                members: vec![
                    member("ann", Some(ann)),
                    member("ghost", Some(ObjectId::new())),
                    member("nobody", None),
                ],
                flagship: None,
                flagship_catalog_id: Some(shared_catalog),
            }),
            doc_of(&Team {
                id: Some(ObjectId::new()),
                team_name: "empty".into(),
                ..Team::default()
            }),
        ],
    );

    Shop {
        store,
        products,
        orders,
        ann,
        ben,
        core_team,
        shared_catalog,
    }
}
