use proc_macro::TokenStream;

mod field;
mod model;
mod serde_attr;
mod ty;

/// Derive `EntitySchema` and `TypeSchema` for a collection root.
#[proc_macro_derive(Entity, attributes(docgraph))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    model::derive_entity(input.into()).into()
}

/// Derive `TypeSchema` for an inline value object.
#[proc_macro_derive(Embedded, attributes(docgraph))]
pub fn derive_embedded(input: TokenStream) -> TokenStream {
    model::derive_embedded(input.into()).into()
}
