use crate::{
    error::InternalError,
    model::{EntityModel, FieldKind, TypeModel},
};
use std::collections::BTreeSet;

/// Validate an entity model and every model reachable from it.
pub fn validate_entity_model(model: &'static EntityModel) -> Result<(), InternalError> {
    let mut seen = BTreeSet::new();

    validate_entity(model, &mut seen)
}

/// Validate a type model and every model reachable from it.
///
/// Checks are structural only: duplicate names, reference local fields that
/// do not exist or are themselves edges, and empty storage coordinates.
pub fn validate_type_model(model: &'static TypeModel) -> Result<(), InternalError> {
    let mut seen = BTreeSet::new();

    validate_type(model, &mut seen)
}

fn validate_entity(
    model: &'static EntityModel,
    seen: &mut BTreeSet<&'static str>,
) -> Result<(), InternalError> {
    let path = model.path();

    if model.collection.is_empty() {
        return Err(InternalError::configuration(path, "collection name is empty"));
    }
    if model.ty.field(model.primary_key).is_none() {
        return Err(InternalError::configuration(
            path,
            format!("primary key '{}' is not a declared field", model.primary_key),
        ));
    }

    validate_type(&model.ty, seen)
}

fn validate_type(
    model: &'static TypeModel,
    seen: &mut BTreeSet<&'static str>,
) -> Result<(), InternalError> {
    // recursive schemas are legal; each type is checked once
    if !seen.insert(model.path) {
        return Ok(());
    }

    let mut names = BTreeSet::new();
    for field in model.fields {
        if field.name.is_empty() {
            return Err(InternalError::configuration(model.path, "empty field name"));
        }
        if !names.insert(field.name) {
            return Err(InternalError::configuration(
                model.path,
                format!("duplicate field '{}'", field.name),
            ));
        }
    }

    for field in model.edges() {
        match &field.kind {
            FieldKind::Embed { target } => validate_type(target(), seen)?,
            FieldKind::Reference(reference) => {
                let local_root = reference.local_field.split('.').next().unwrap_or_default();
                let Some(local) = model.field(local_root) else {
                    return Err(InternalError::configuration(
                        model.path,
                        format!(
                            "reference '{}' names local field '{}' which does not exist",
                            field.name, reference.local_field
                        ),
                    ));
                };

                if local.name == field.name {
                    return Err(InternalError::configuration(
                        model.path,
                        format!("reference '{}' uses itself as its local field", field.name),
                    ));
                }
                if local.is_edge() {
                    return Err(InternalError::configuration(
                        model.path,
                        format!(
                            "reference '{}' local field '{}' is itself an edge",
                            field.name, local.name
                        ),
                    ));
                }
                if reference.collection().is_empty() || reference.foreign_field().is_empty() {
                    return Err(InternalError::configuration(
                        model.path,
                        format!("reference '{}' has an empty target coordinate", field.name),
                    ));
                }

                validate_entity(reference.target_model(), seen)?;
            }
            FieldKind::Plain => {}
        }
    }

    Ok(())
}
