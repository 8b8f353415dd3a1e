use crate::{db::store::MemoryStore, serialize::to_document, traits::EntitySchema};
use bson::{Document, oid::ObjectId};
use docgraph_derive::{Embedded, Entity};
use serde::{Deserialize, Serialize};

///
/// User
///

#[derive(Clone, Debug, Default, Deserialize, Entity, PartialEq, Serialize)]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,

    #[docgraph(embed)]
    #[serde(default)]
    pub usernames: Vec<Usernames>,

    #[docgraph(reference(local = "order_refs"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<Order>>,
    #[serde(default)]
    pub order_refs: Vec<ObjectId>,
}

///
/// Usernames
///

#[derive(Clone, Debug, Default, Deserialize, Embedded, PartialEq, Serialize)]
pub struct Usernames {
    pub names: String,
    pub amount: i32,

    #[docgraph(reference(local = "email_refs"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<Email>>,
    #[serde(default)]
    pub email_refs: Vec<ObjectId>,
}

///
/// Email
///

#[derive(Clone, Debug, Default, Deserialize, Entity, PartialEq, Serialize)]
pub struct Email {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub address: String,

    #[docgraph(embed)]
    #[serde(default)]
    pub domains: Vec<Domain>,
}

///
/// Domain
///

#[derive(Clone, Debug, Default, Deserialize, Embedded, PartialEq, Serialize)]
pub struct Domain {
    pub name: String,

    #[docgraph(reference(local = "company_ref"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    #[serde(default)]
    pub company_ref: Option<ObjectId>,
}

///
/// Company
///

#[derive(Clone, Debug, Default, Deserialize, Entity, PartialEq, Serialize)]
#[docgraph(collection = "companies")]
pub struct Company {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
}

///
/// Order
///

#[derive(Clone, Debug, Default, Deserialize, Entity, PartialEq, Serialize)]
pub struct Order {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,

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
    pub name: String,
    pub price: i32,
}

///
/// Employee
/// Scalar reference on the entity root.
///

#[derive(Clone, Debug, Default, Deserialize, Entity, PartialEq, Serialize)]
pub struct Employee {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,

    #[docgraph(reference(local = "company_ref"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    #[serde(default)]
    pub company_ref: Option<ObjectId>,
}

///
/// Mailbox
/// One collection embed holding one collection reference.
///

#[derive(Clone, Debug, Default, Deserialize, Entity, PartialEq, Serialize)]
#[docgraph(collection = "mailboxes")]
pub struct Mailbox {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub owner: String,

    #[docgraph(embed)]
    #[serde(default)]
    pub usernames: Vec<Usernames>,
}

///
/// Graph
///
/// Identifiers of a seeded store: two products, two orders (o1 with both
/// products, o2 with p2), one company, one email with one domain, and one
/// user holding both orders and one username entry.
///

pub struct Graph {
    pub store: MemoryStore,
    pub products: [ObjectId; 2],
    pub orders: [ObjectId; 2],
    pub company: ObjectId,
    pub email: ObjectId,
    pub user: ObjectId,
}

pub fn doc_of<T: Serialize>(value: &T) -> Document {
    to_document(value).unwrap()
}

pub fn seed_graph() -> Graph {
    let store = MemoryStore::new();
    let products = [ObjectId::new(), ObjectId::new()];
    let orders = [ObjectId::new(), ObjectId::new()];
    let company = ObjectId::new();
    let email = ObjectId::new();
    let user = ObjectId::new();

    store.seed(
        Product::COLLECTION,
        [
            doc_of(&Product {
                id: Some(products[0]),
                name: "p1".into(),
                price: 10,
            }),
            doc_of(&Product {
                id: Some(products[1]),
                name: "p2".into(),
                price: 20,
            }),
        ],
    );
    store.seed(
        Order::COLLECTION,
        [
            doc_of(&Order {
                id: Some(orders[0]),
                name: "o1".into(),
                products: None,
                product_refs: products.to_vec(),
            }),
            doc_of(&Order {
                id: Some(orders[1]),
                name: "o2".into(),
                products: None,
                product_refs: vec![products[1]],
            }),
        ],
    );
    store.seed(
        Company::COLLECTION,
        [doc_of(&Company {
            id: Some(company),
            name: "acme".into(),
        })],
    );
    store.seed(
        Email::COLLECTION,
        [doc_of(&Email {
            id: Some(email),
            address: "a@acme.test".into(),
            domains: vec![Domain {
                name: "acme.test".into(),
                company: None,
                company_ref: Some(company),
            }],
        })],
    );
    store.seed(
        User::COLLECTION,
        [doc_of(&User {
            id: Some(user),
            name: "alice".into(),
            usernames: vec![Usernames {
                names: "al".into(),
                amount: 1,
                emails: None,
                email_refs: vec![email],
            }],
            orders: None,
            order_refs: orders.to_vec(),
        })],
    );

    Graph {
        store,
        products,
        orders,
        company,
        email,
        user,
    }
}
