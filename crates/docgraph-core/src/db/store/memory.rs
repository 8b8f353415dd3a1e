use crate::{
    PRIMARY_KEY,
    db::{
        pipeline::Stage,
        store::{
            DocumentStore, StoreCall, StoreError, StoreOp,
            eval::{evaluate, field_matches},
        },
    },
};
use bson::{Bson, Document, oid::ObjectId};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use tracing::trace;

///
/// MemoryStore
///
/// In-process `DocumentStore`. Collections keep insertion order, filters
/// support field equality and `$in`/`$eq` with strict BSON comparison, and
/// aggregation evaluates the three stage kinds. Every trait call is journaled so callers can assert
/// how many round trips an operation cost.
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Vec<Document>>>,
    journal: Mutex<Vec<StoreCall>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load documents without journaling; missing `_id`s are assigned.
    pub fn seed<I>(&self, collection: &str, docs: I)
    where
        I: IntoIterator<Item = Document>,
    {
        let mut collections = self.collections.write();
        let rows = collections.entry(collection.to_string()).or_default();

        rows.extend(docs.into_iter().map(|doc| with_id(doc).1));
    }

    /// Snapshot of one collection in store order.
    #[must_use]
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Journaled calls since construction or the last `clear_calls`.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.journal.lock().clone()
    }

    /// Number of journaled calls that targeted `collection`.
    #[must_use]
    pub fn calls_to(&self, collection: &str) -> usize {
        self.journal
            .lock()
            .iter()
            .filter(|call| call.collection == collection)
            .count()
    }

    pub fn clear_calls(&self) {
        self.journal.lock().clear();
    }

    fn record(&self, op: StoreOp, collection: &str) {
        trace!(op = %op, collection, "store.memory.call");

        self.journal.lock().push(StoreCall {
            op,
            collection: collection.to_string(),
        });
    }

    fn select(rows: &[Document], filter: &Document) -> Result<Vec<Document>, StoreError> {
        let mut out = Vec::new();
        for row in rows {
            if matches_filter(row, filter)? {
                out.push(row.clone());
            }
        }

        Ok(out)
    }
}

impl DocumentStore for MemoryStore {
    fn find(&self, collection: &str, filter: &Document) -> Result<Vec<Document>, StoreError> {
        self.record(StoreOp::Find, collection);

        let collections = self.collections.read();
        let rows = collections.get(collection).map_or(&[][..], Vec::as_slice);

        Self::select(rows, filter)
    }

    fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        keys: &[Bson],
    ) -> Result<Vec<Document>, StoreError> {
        self.record(StoreOp::FindByField, collection);

        let collections = self.collections.read();
        let rows = collections.get(collection).map_or(&[][..], Vec::as_slice);

        Ok(rows
            .iter()
            .filter(|row| field_matches(row, field, keys))
            .cloned()
            .collect())
    }

    fn aggregate(
        &self,
        collection: &str,
        filter: &Document,
        stages: &[Stage],
    ) -> Result<Vec<Document>, StoreError> {
        self.record(StoreOp::Aggregate, collection);

        let collections = self.collections.read();
        let rows = collections.get(collection).map_or(&[][..], Vec::as_slice);
        let matched = Self::select(rows, filter)?;

        Ok(evaluate(stages, matched, |from| {
            collections.get(from).map_or(&[][..], Vec::as_slice)
        }))
    }

    fn insert_one(&self, collection: &str, doc: Document) -> Result<Bson, StoreError> {
        self.record(StoreOp::InsertOne, collection);

        let (id, doc) = with_id(doc);
        let mut collections = self.collections.write();
        let rows = collections.entry(collection.to_string()).or_default();

        if rows.iter().any(|row| row.get(PRIMARY_KEY) == Some(&id)) {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                key: id.to_string(),
            });
        }
        rows.push(doc);

        Ok(id)
    }

    fn replace_one(&self, collection: &str, id: &Bson, doc: Document) -> Result<bool, StoreError> {
        self.record(StoreOp::ReplaceOne, collection);

        let mut collections = self.collections.write();
        let Some(rows) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(slot) = rows.iter_mut().find(|row| row.get(PRIMARY_KEY) == Some(id)) else {
            return Ok(false);
        };

        let mut replacement = Document::new();
        replacement.insert(PRIMARY_KEY, id.clone());
        for (key, value) in doc {
            if key != PRIMARY_KEY {
                replacement.insert(key, value);
            }
        }
        *slot = replacement;

        Ok(true)
    }
}

// Ensure `_id` is present and first, as a document database stores it.
fn with_id(doc: Document) -> (Bson, Document) {
    let id = match doc.get(PRIMARY_KEY) {
        None | Some(Bson::Null) => Bson::ObjectId(ObjectId::new()),
        Some(id) => id.clone(),
    };

    let mut out = Document::new();
    out.insert(PRIMARY_KEY, id.clone());
    for (key, value) in doc {
        if key != PRIMARY_KEY {
            out.insert(key, value);
        }
    }

    (id, out)
}

fn matches_filter(doc: &Document, filter: &Document) -> Result<bool, StoreError> {
    for (field, expected) in filter {
        if field.starts_with('$') {
            return Err(StoreError::UnsupportedOperator(field.clone()));
        }

        let matched = match expected {
            Bson::Document(ops) if ops.keys().next().is_some_and(|key| key.starts_with('$')) => {
                let mut all = true;
                for (op, arg) in ops {
                    all &= match (op.as_str(), arg) {
                        ("$in", Bson::Array(values)) => field_matches(doc, field, values),
                        ("$eq", value) => field_matches(doc, field, std::slice::from_ref(value)),
                        (other, _) => return Err(StoreError::UnsupportedOperator(other.to_string())),
                    };
                }
                all
            }
            value => field_matches(doc, field, std::slice::from_ref(value)),
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}
