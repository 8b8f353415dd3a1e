use crate::{
    field::{FieldDef, FieldInput},
    serde_attr::SerdeContainer,
};
use darling::{FromDeriveInput, ast::Data};
use docgraph_utils::case::default_collection_name;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, DeriveInput, Error, Generics, Ident};

const PRIMARY_KEY: &str = "_id";

///
/// ModelInput
///

#[derive(FromDeriveInput)]
#[darling(attributes(docgraph), forward_attrs(serde), supports(struct_named))]
struct ModelInput {
    ident: Ident,
    generics: Generics,
    attrs: Vec<Attribute>,
    data: Data<(), FieldInput>,

    #[darling(default)]
    collection: Option<String>,
}

impl ModelInput {
    fn parse(input: TokenStream) -> Result<Self, TokenStream> {
        let input: DeriveInput = syn::parse2(input).map_err(|err| err.to_compile_error())?;
        let model = Self::from_derive_input(&input).map_err(|err| err.write_errors())?;

        if !model.generics.params.is_empty() {
            return Err(Error::new_spanned(
                &model.generics,
                "docgraph models cannot be derived for generic types",
            )
            .to_compile_error());
        }

        Ok(model)
    }

    fn fields(&self) -> &[FieldInput] {
        match &self.data {
            Data::Struct(fields) => &fields.fields,
            Data::Enum(_) => &[],
        }
    }

    // Resolve every serialized field, then emit the `TypeModel` literal.
    fn type_model_tokens(&self) -> Result<(Vec<String>, TokenStream), Error> {
        let container = SerdeContainer::from_attrs(&self.attrs)?;

        let mut defs = Vec::new();
        for input in self.fields() {
            if let Some(def) = FieldDef::resolve(input, &container)? {
                defs.push(def);
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for def in &defs {
            if seen.contains(&def.name.as_str()) {
                return Err(Error::new_spanned(
                    def.ident,
                    format!("duplicate serialized field name '{}'", def.name),
                ));
            }
            seen.push(&def.name);
        }

        let fields = defs
            .iter()
            .map(|def| def.model_tokens(&defs))
            .collect::<Result<Vec<_>, _>>()?;
        let names = defs.iter().map(|def| def.name.clone()).collect();
        let path = self.ident.to_string();

        let tokens = quote! {
            ::docgraph::model::TypeModel {
                path: ::core::concat!(::core::module_path!(), "::", #path),
                fields: &[#(#fields),*],
            }
        };

        Ok((names, tokens))
    }
}

// derive_entity
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let model = match ModelInput::parse(input) {
        Ok(model) => model,
        Err(err) => return err,
    };

    let (names, type_model) = match model.type_model_tokens() {
        Ok(out) => out,
        Err(err) => return err.to_compile_error(),
    };

    if !names.iter().any(|name| name == PRIMARY_KEY) {
        return Error::new_spanned(
            &model.ident,
            "entities need a field serialized as `_id`; add `#[serde(rename = \"_id\")]`",
        )
        .to_compile_error();
    }

    let ident = &model.ident;
    let collection = model
        .collection
        .clone()
        .unwrap_or_else(|| default_collection_name(&ident.to_string()));

    quote! {
        impl ::docgraph::traits::EntitySchema for #ident {
            const COLLECTION: &'static str = #collection;

            fn entity_model() -> &'static ::docgraph::model::EntityModel {
                static MODEL: ::docgraph::model::EntityModel = ::docgraph::model::EntityModel {
                    collection: #collection,
                    primary_key: #PRIMARY_KEY,
                    ty: #type_model,
                };

                &MODEL
            }
        }

        impl ::docgraph::traits::TypeSchema for #ident {
            fn model() -> &'static ::docgraph::model::TypeModel {
                &<Self as ::docgraph::traits::EntitySchema>::entity_model().ty
            }
        }
    }
}

// derive_embedded
pub fn derive_embedded(input: TokenStream) -> TokenStream {
    let model = match ModelInput::parse(input) {
        Ok(model) => model,
        Err(err) => return err,
    };

    if model.collection.is_some() {
        return Error::new_spanned(
            &model.ident,
            "`collection` only applies to `#[derive(Entity)]`",
        )
        .to_compile_error();
    }

    let type_model = match model.type_model_tokens() {
        Ok((_, tokens)) => tokens,
        Err(err) => return err.to_compile_error(),
    };

    let ident = &model.ident;

    quote! {
        impl ::docgraph::traits::TypeSchema for #ident {
            fn model() -> &'static ::docgraph::model::TypeModel {
                static MODEL: ::docgraph::model::TypeModel = #type_model;

                &MODEL
            }
        }
    }
}
