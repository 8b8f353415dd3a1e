use crate::model::field::FieldModel;

/// Deferred access to a type model; lets models refer to each other.
pub type TypeModelFn = fn() -> &'static TypeModel;

/// Deferred access to an entity model.
pub type EntityModelFn = fn() -> &'static EntityModel;

///
/// TypeModel
/// Ordered field list of one entity or embedded type.
///

#[derive(Debug)]
pub struct TypeModel {
    /// Fully-qualified Rust type path (for diagnostics).
    pub path: &'static str,
    /// Serialized fields in declaration order.
    pub fields: &'static [FieldModel],
}

impl TypeModel {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Fields carrying an embed or reference edge, in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = &'static FieldModel> + use<> {
        let fields = self.fields;

        fields.iter().filter(|field| field.is_edge())
    }

    #[must_use]
    pub fn has_edges(&self) -> bool {
        self.edges().next().is_some()
    }
}

///
/// EntityModel
/// Type model of a collection root plus its storage coordinates.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Default collection name.
    pub collection: &'static str,
    /// Serialized name of the identifier field.
    pub primary_key: &'static str,
    pub ty: TypeModel,
}

impl EntityModel {
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.ty.path
    }
}
