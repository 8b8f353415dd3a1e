
use crate::{
    document::set_path,
    model::{FieldKind, FieldModel, ReferenceModel, TypeModel},
    path::FieldPath,
};
use bson::{Bson, Document};
use tracing::{trace, warn};

///
/// Depopulator
///
/// Inverse of populate, applied before writes. Works on a copy: reference
/// fields are removed at every depth and embeds are walked. With back-fill
/// on, the identifiers of hydrated values are written into the local field
/// first. Overrides do not apply here.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Depopulator {
    backfill: bool,
}

impl Depopulator {
    #[must_use]
    pub const fn new() -> Self {
        Self { backfill: false }
    }

    #[must_use]
    pub const fn backfill(mut self, backfill: bool) -> Self {
        self.backfill = backfill;
        self
    }

    /// Depopulated copy of `doc`; the input is left untouched.
    #[must_use]
    pub fn depopulate(&self, model: &'static TypeModel, doc: &Document) -> Document {
        let mut copy = doc.clone();
        self.strip(model, &mut copy, &FieldPath::root());

        copy
    }

    fn strip(&self, model: &'static TypeModel, doc: &mut Document, path: &FieldPath) {
        for field in model.edges() {
            let field_path = path.join(field.name);

            match &field.kind {
                FieldKind::Embed { target } => {
                    let target = target();
                    match doc.get_mut(field.name) {
                        Some(Bson::Array(items)) => {
                            for item in items {
                                if let Bson::Document(inner) = item {
                                    self.strip(target, inner, &field_path);
                                }
                            }
                        }
                        Some(Bson::Document(inner)) => self.strip(target, inner, &field_path),
                        _ => {}
                    }
                }
                FieldKind::Reference(reference) => {
                    if self.backfill {
                        Self::backfill_local(doc, field, reference, &field_path);
                    }
                    if doc.remove(field.name).is_some() {
                        trace!(path = %field_path, "depopulate.reference.removed");
                    }
                }
                FieldKind::Plain => {}
            }
        }
    }

    // Write the hydrated value's identifier(s) into the local field.
    fn backfill_local(
        doc: &mut Document,
        field: &FieldModel,
        reference: &ReferenceModel,
        path: &FieldPath,
    ) {
        let foreign = reference.foreign_field();

        let ids = match doc.get(field.name) {
            Some(Bson::Array(items)) => Bson::Array(
                items
                    .iter()
                    .filter_map(|item| item.as_document()?.get(foreign).cloned())
                    .collect(),
            ),
            Some(Bson::Document(inner)) => match inner.get(foreign) {
                Some(id) => id.clone(),
                None => return,
            },
            _ => return,
        };

        if let Err(err) = set_path(doc, reference.local_field, ids) {
            warn!(path = %path, error = %err, "depopulate.missing_field");
        }
    }
}
