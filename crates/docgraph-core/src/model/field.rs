use crate::model::entity::{EntityModel, EntityModelFn, TypeModel, TypeModelFn};
use std::fmt;

///
/// FieldModel
/// Runtime metadata for one serialized field.
///

#[derive(Debug)]
pub struct FieldModel {
    /// Serialized field name.
    pub name: &'static str,
    pub cardinality: Cardinality,
    pub kind: FieldKind,
}

impl FieldModel {
    #[must_use]
    pub const fn is_edge(&self) -> bool {
        !matches!(self.kind, FieldKind::Plain)
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.cardinality, Cardinality::Many)
    }

    #[must_use]
    pub const fn reference(&self) -> Option<&ReferenceModel> {
        match &self.kind {
            FieldKind::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Element type model of an embed edge.
    #[must_use]
    pub fn embed_target(&self) -> Option<&'static TypeModel> {
        match &self.kind {
            FieldKind::Embed { target } => Some(target()),
            _ => None,
        }
    }
}

///
/// Cardinality
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cardinality {
    One,
    Many,
}

///
/// FieldKind
///
/// Edge classification. Embed and reference targets are resolved lazily
/// through function pointers so recursive schemas stay constructible.
///

pub enum FieldKind {
    Plain,
    Embed { target: TypeModelFn },
    Reference(ReferenceModel),
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("Plain"),
            Self::Embed { target } => write!(f, "Embed({})", target().path),
            Self::Reference(reference) => fmt::Debug::fmt(reference, f),
        }
    }
}

///
/// ReferenceModel
/// Cross-collection edge declaration.
///

pub struct ReferenceModel {
    pub target: EntityModelFn,
    /// Collection override; defaults to the target entity's collection.
    pub collection: Option<&'static str>,
    /// Field holding the identifier(s), relative to the declaring document.
    pub local_field: &'static str,
    /// Field matched in the target; defaults to the target's identifier.
    pub foreign_field: Option<&'static str>,
    /// Static default for the enabled flag.
    pub auto_populate: bool,
}

impl ReferenceModel {
    #[must_use]
    pub fn target_model(&self) -> &'static EntityModel {
        (self.target)()
    }

    #[must_use]
    pub fn collection(&self) -> &'static str {
        self.collection
            .unwrap_or_else(|| self.target_model().collection)
    }

    #[must_use]
    pub fn foreign_field(&self) -> &'static str {
        self.foreign_field
            .unwrap_or_else(|| self.target_model().primary_key)
    }
}

impl fmt::Debug for ReferenceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("target", &self.target_model().path())
            .field("collection", &self.collection())
            .field("local_field", &self.local_field)
            .field("foreign_field", &self.foreign_field())
            .field("auto_populate", &self.auto_populate)
            .finish()
    }
}
