use syn::{GenericArgument, PathArguments, Type};

///
/// FieldShape
///
/// Wrapper analysis of one field type: whether it is optional, whether it
/// holds a collection, and the element type underneath the wrappers.
///

pub struct FieldShape<'a> {
    pub optional: bool,
    pub many: bool,
    pub element: &'a Type,
}

impl<'a> FieldShape<'a> {
    pub fn of(ty: &'a Type) -> Self {
        let (optional, ty) = match single_generic(ty, "Option") {
            Some(inner) => (true, inner),
            None => (false, ty),
        };

        let (many, ty) = match collection_element(ty) {
            Some(inner) => (true, inner),
            None => (false, ty),
        };

        Self {
            optional,
            many,
            element: strip_box(ty),
        }
    }
}

fn collection_element(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Array(array) => Some(&array.elem),
        Type::Slice(slice) => Some(&slice.elem),
        _ => single_generic(ty, "Vec").or_else(|| single_generic(ty, "VecDeque")),
    }
}

fn strip_box(ty: &Type) -> &Type {
    single_generic(ty, "Box").map_or(ty, strip_box)
}

// Inner type of `Ident<T>` when the last path segment is `ident`.
fn single_generic<'a>(ty: &'a Type, ident: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != ident {
        return None;
    }

    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };

    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}
