#[cfg(test)]
mod tests;

use crate::{
    db::store::DocumentStore,
    document::{get_present, is_null},
    error::{ErrorOrigin, InternalError},
    key::{distinct_object_ids, keys_from_bson},
    model::{FieldKind, FieldModel, ReferenceModel, TypeModel},
    overrides::Overrides,
    path::FieldPath,
};
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

///
/// ScalarMatch
///
/// What a scalar reference does when its query returns several documents.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarMatch {
    /// Keep the first document in store order.
    #[default]
    First,
    /// Fail with `AmbiguousReference`.
    Unique,
}

///
/// Populator
///
/// Client-side resolution of reference edges. Walks a document against its
/// type model and splices in the referenced documents, one batched query
/// per unresolved edge instance.
///

pub struct Populator<'a, S: ?Sized> {
    store: &'a S,
    overrides: &'a Overrides,
    scalar_match: ScalarMatch,
    verify_joined: bool,
}

impl<'a, S> Populator<'a, S>
where
    S: DocumentStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a S, overrides: &'a Overrides) -> Self {
        Self {
            store,
            overrides,
            scalar_match: ScalarMatch::First,
            verify_joined: false,
        }
    }

    #[must_use]
    pub const fn scalar_match(mut self, scalar_match: ScalarMatch) -> Self {
        self.scalar_match = scalar_match;
        self
    }

    /// Check edges a server-side join already filled against their local field.
    ///
    /// A join compares identifiers strictly and writes an empty array when
    /// the local value is absent. Checked edges fail on unsupported
    /// identifiers, are cleared when the local value is absent and are
    /// fetched again when it holds text identifiers.
    #[must_use]
    pub const fn verify_joined(mut self, verify_joined: bool) -> Self {
        self.verify_joined = verify_joined;
        self
    }

    /// Populate a root document in place.
    ///
    /// On error the document may be partially populated.
    pub fn populate(&self, model: &'static TypeModel, doc: &mut Document) -> Result<(), InternalError> {
        self.populate_at(model, doc, &FieldPath::root())
    }

    /// Populate a document that sits at `path` below the entity root.
    pub fn populate_at(
        &self,
        model: &'static TypeModel,
        doc: &mut Document,
        path: &FieldPath,
    ) -> Result<(), InternalError> {
        for field in model.edges() {
            let field_path = path.join(field.name);
            trace!(path = %field_path, level = field_path.level(), "populate.field");

            let target = match &field.kind {
                FieldKind::Embed { target } => target(),
                FieldKind::Reference(reference) => {
                    if !self.overrides.resolve(&field_path, reference) {
                        trace!(path = %field_path, "populate.reference.disabled");
                        continue;
                    }
                    if is_null(doc.get(field.name)) {
                        self.fetch(doc, field, reference, &field_path)?;
                    } else if self.verify_joined {
                        self.verify(doc, field, reference, &field_path)?;
                    }

                    &reference.target_model().ty
                }
                FieldKind::Plain => continue,
            };

            self.descend(target, doc, field, &field_path)?;
        }

        Ok(())
    }

    // Recurse into the current value(s) of an edge field.
    fn descend(
        &self,
        target: &'static TypeModel,
        doc: &mut Document,
        field: &FieldModel,
        path: &FieldPath,
    ) -> Result<(), InternalError> {
        if !target.has_edges() {
            return Ok(());
        }

        match doc.get_mut(field.name) {
            None | Some(Bson::Null) => {}
            Some(Bson::Array(items)) if field.is_collection() => {
                for item in items {
                    if let Bson::Document(inner) = item {
                        self.populate_at(target, inner, path)?;
                    }
                }
            }
            Some(Bson::Document(inner)) if !field.is_collection() => {
                self.populate_at(target, inner, path)?;
            }
            Some(other) => {
                warn!(path = %path, found = ?other.element_type(), "populate.unexpected_shape");
            }
        }

        Ok(())
    }

    fn fetch(
        &self,
        doc: &mut Document,
        field: &FieldModel,
        reference: &ReferenceModel,
        path: &FieldPath,
    ) -> Result<(), InternalError> {
        let local = match get_present(doc, reference.local_field) {
            Ok(Some(local)) => local,
            Ok(None) => {
                trace!(path = %path, local = reference.local_field, "populate.reference.no_local");
                return Ok(());
            }
            Err(err) => {
                warn!(path = %path, error = %err, "populate.missing_field");
                return Ok(());
            }
        };

        let keys = keys_from_bson(&local)
            .and_then(|keys| distinct_object_ids(&keys))
            .map_err(|err| err.into_internal(ErrorOrigin::Populate, path.as_str()))?;

        if keys.is_empty() {
            if field.is_collection() {
                doc.insert(field.name, Bson::Array(Vec::new()));
            }
            return Ok(());
        }

        let collection = reference.collection();
        debug!(
            path = %path,
            level = path.level(),
            collection,
            keys = keys.len(),
            "populate.reference.fetch"
        );

        let filter: Vec<Bson> = keys.into_iter().map(Bson::ObjectId).collect();
        let found = self
            .store
            .find_by_field(collection, reference.foreign_field(), &filter)?;

        if field.is_collection() {
            doc.insert(
                field.name,
                Bson::Array(found.into_iter().map(Bson::Document).collect()),
            );

            return Ok(());
        }

        if found.len() > 1 && self.scalar_match == ScalarMatch::Unique {
            return Err(InternalError::ambiguous_reference(
                path.as_str(),
                collection,
                found.len(),
            ));
        }
        if let Some(first) = found.into_iter().next() {
            doc.insert(field.name, Bson::Document(first));
        }

        Ok(())
    }

    fn verify(
        &self,
        doc: &mut Document,
        field: &FieldModel,
        reference: &ReferenceModel,
        path: &FieldPath,
    ) -> Result<(), InternalError> {
        let local = match get_present(doc, reference.local_field) {
            Ok(Some(local)) => local,
            Ok(None) | Err(_) => {
                trace!(path = %path, local = reference.local_field, "populate.joined.no_local");
                doc.remove(field.name);
                return Ok(());
            }
        };

        keys_from_bson(&local)
            .and_then(|keys| distinct_object_ids(&keys))
            .map_err(|err| err.into_internal(ErrorOrigin::Populate, path.as_str()))?;

        if !holds_native_ids(&local) {
            debug!(path = %path, "populate.joined.refetch");
            doc.remove(field.name);
            self.fetch(doc, field, reference, path)?;
        }

        Ok(())
    }
}

fn holds_native_ids(value: &Bson) -> bool {
    match value {
        Bson::Array(items) => items.iter().all(|item| matches!(item, Bson::ObjectId(_))),
        other => matches!(other, Bson::ObjectId(_)),
    }
}
