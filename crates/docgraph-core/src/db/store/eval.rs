//! In-process evaluation of pipeline stages.
//!
//! Mirrors what a document database does with the rendered stages:
//! `$lookup` by strict equality (no identifier coercion, `as: []` when the
//! local value is absent), `$unwind` keeping empty and missing arrays with
//! a null element index, scalar flattening to the first element, and
//! `$group` with `$first` / `$push` accumulators.

use crate::{
    db::pipeline::{Stage, UNWIND_INDEX},
    document::{MissingField, get_path, remove_path, set_path},
};
use bson::{Bson, Document};
use std::collections::BTreeMap;
use tracing::warn;

/// Evaluate `stages` over `rows`; `collection` resolves lookup targets.
pub(super) fn evaluate<'a, F>(stages: &[Stage], mut rows: Vec<Document>, collection: F) -> Vec<Document>
where
    F: Fn(&str) -> &'a [Document],
{
    for stage in stages {
        rows = match stage {
            Stage::Lookup {
                from,
                local_field,
                foreign_field,
                as_field,
                ..
            } => rows
                .into_iter()
                .map(|row| lookup(row, collection(from), local_field, foreign_field, as_field))
                .collect(),
            Stage::Unwind {
                path,
                is_collection: true,
            } => rows.into_iter().flat_map(|row| unwind(row, path)).collect(),
            Stage::Unwind {
                path,
                is_collection: false,
            } => rows.into_iter().map(|row| first_element(row, path)).collect(),
            Stage::Group {
                id_key,
                keep_first,
                push_field,
            } => group(rows, id_key, keep_first, push_field),
        };
    }

    rows
}

/// True when `doc[field]` equals one of `candidates` (or, for an array, contains one).
pub(super) fn field_matches(doc: &Document, field: &str, candidates: &[Bson]) -> bool {
    match get_path(doc, field) {
        Ok(Some(Bson::Array(items))) => items.iter().any(|item| candidates.contains(item)),
        Ok(Some(value)) => candidates.contains(value),
        _ => false,
    }
}

fn lookup(
    mut row: Document,
    targets: &[Document],
    local_field: &str,
    foreign_field: &str,
    as_field: &str,
) -> Document {
    let candidates: Vec<Bson> = match get_path(&row, local_field) {
        Ok(Some(Bson::Array(items))) => items.clone(),
        Ok(Some(value)) => vec![value.clone()],
        // an absent local value matches documents whose foreign field is absent too
        Ok(None) | Err(_) => vec![Bson::Null],
    };

    let joined = targets
        .iter()
        .filter(|target| {
            field_matches(target, foreign_field, &candidates)
                || (candidates.contains(&Bson::Null)
                    && matches!(get_path(target, foreign_field), Ok(None | Some(Bson::Null))))
        })
        .cloned()
        .map(Bson::Document)
        .collect();

    if let Err(err) = set_path(&mut row, as_field, Bson::Array(joined)) {
        shape_mismatch("lookup", &err);
    }

    row
}

fn unwind(mut row: Document, path: &str) -> Vec<Document> {
    let items = match get_path(&row, path) {
        Ok(Some(Bson::Array(items))) => items.clone(),
        // not an array: the row passes through with a null index
        _ => {
            row.insert(UNWIND_INDEX, Bson::Null);
            return vec![row];
        }
    };

    if items.is_empty() {
        if let Err(err) = remove_path(&mut row, path) {
            shape_mismatch("unwind", &err);
        }
        row.insert(UNWIND_INDEX, Bson::Null);

        return vec![row];
    }

    items
        .into_iter()
        .zip(0_i64..)
        .map(|(item, index)| {
            let mut out = row.clone();
            if let Err(err) = set_path(&mut out, path, item) {
                shape_mismatch("unwind", &err);
            }
            out.insert(UNWIND_INDEX, index);
            out
        })
        .collect()
}

fn first_element(mut row: Document, path: &str) -> Document {
    let first = match get_path(&row, path) {
        Ok(Some(Bson::Array(items))) => items.first().cloned(),
        _ => return row,
    };

    let written = match first {
        Some(value) => set_path(&mut row, path, value),
        None => remove_path(&mut row, path).map(|_| ()),
    };
    if let Err(err) = written {
        shape_mismatch("first", &err);
    }

    row
}

fn shape_mismatch(stage: &str, err: &MissingField) {
    warn!(stage, path = %err.path, segment = %err.segment, "store.memory.shape_mismatch");
}

fn group(rows: Vec<Document>, id_key: &str, keep_first: &[String], push_field: &str) -> Vec<Document> {
    let mut order: Vec<Bson> = Vec::new();
    let mut groups: BTreeMap<usize, (Document, Vec<Bson>)> = BTreeMap::new();

    for row in rows {
        let id = row.get(id_key).cloned().unwrap_or(Bson::Null);
        let pushed = match row.get(UNWIND_INDEX) {
            None | Some(Bson::Null) => None,
            Some(_) => Some(row.get(push_field).cloned().unwrap_or(Bson::Null)),
        };

        let index = match order.iter().position(|seen| *seen == id) {
            Some(index) => index,
            None => {
                order.push(id);
                groups.insert(order.len() - 1, (row, Vec::new()));
                order.len() - 1
            }
        };

        if let (Some(value), Some((_, values))) = (pushed, groups.get_mut(&index)) {
            values.push(value);
        }
    }

    groups
        .into_values()
        .map(|(first, values)| assemble(&first, id_key, keep_first, push_field, values))
        .collect()
}

// Output keeps the first row's field order.
fn assemble(
    first: &Document,
    id_key: &str,
    keep_first: &[String],
    push_field: &str,
    values: Vec<Bson>,
) -> Document {
    let mut out = Document::new();
    let mut pushed = Some(Bson::Array(values));

    for (key, value) in first {
        if key == push_field {
            if let Some(array) = pushed.take() {
                out.insert(key, array);
            }
        } else if key == id_key || keep_first.iter().any(|kept| kept == key) {
            out.insert(key, value.clone());
        }
    }
    if let Some(array) = pushed {
        out.insert(push_field, array);
    }

    out
}
