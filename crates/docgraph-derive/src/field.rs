use crate::{
    serde_attr::{SerdeContainer, SerdeField},
    ty::FieldShape,
};
use darling::{FromField, FromMeta, util::Flag};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Error, Ident, Type};

///
/// FieldInput
///

#[derive(FromField)]
#[darling(attributes(docgraph), forward_attrs(serde))]
pub struct FieldInput {
    pub ident: Option<Ident>,
    pub ty: Type,
    pub attrs: Vec<Attribute>,

    pub embed: Flag,

    #[darling(default)]
    pub reference: Option<ReferenceArgs>,
}

///
/// ReferenceArgs
///
/// `#[docgraph(reference(local = "...", foreign = "...", collection = "...", lazy))]`
///

#[derive(FromMeta)]
pub struct ReferenceArgs {
    pub local: String,

    #[darling(default)]
    pub foreign: Option<String>,

    #[darling(default)]
    pub collection: Option<String>,

    pub lazy: Flag,
}

///
/// FieldDef
///
/// One serialized field after attribute resolution.
///

pub struct FieldDef<'a> {
    pub ident: &'a Ident,
    pub name: String,
    pub input: &'a FieldInput,
}

impl<'a> FieldDef<'a> {
    /// Resolve serialized names; `Ok(None)` for `#[serde(skip)]` fields.
    pub fn resolve(input: &'a FieldInput, container: &SerdeContainer) -> Result<Option<Self>, Error> {
        let Some(ident) = input.ident.as_ref() else {
            return Err(Error::new_spanned(&input.ty, "expected a named field"));
        };

        let serde = SerdeField::from_attrs(&input.attrs)?;
        if serde.skip {
            return Ok(None);
        }

        Ok(Some(Self {
            ident,
            name: serde.serialized_name(&ident.to_string(), container),
            input,
        }))
    }

    pub fn is_edge(&self) -> bool {
        self.input.embed.is_present() || self.input.reference.is_some()
    }

    /// Emit the `FieldModel` literal for this field.
    pub fn model_tokens(&self, siblings: &[Self]) -> Result<TokenStream, Error> {
        let name = &self.name;
        let shape = FieldShape::of(&self.input.ty);
        let element = shape.element;
        let cardinality = if shape.many {
            quote!(::docgraph::model::Cardinality::Many)
        } else {
            quote!(::docgraph::model::Cardinality::One)
        };

        let kind = match (&self.input.reference, self.input.embed.is_present()) {
            (Some(_), true) => {
                return Err(Error::new_spanned(
                    self.ident,
                    "a field cannot be both `embed` and `reference`",
                ));
            }
            (Some(reference), false) => {
                if !shape.optional {
                    return Err(Error::new_spanned(
                        &self.input.ty,
                        "reference fields must be `Option<_>` so they can be stored depopulated",
                    ));
                }

                self.reference_tokens(reference, element, siblings)?
            }
            (None, true) => quote! {
                ::docgraph::model::FieldKind::Embed {
                    target: <#element as ::docgraph::traits::TypeSchema>::model,
                }
            },
            (None, false) => quote!(::docgraph::model::FieldKind::Plain),
        };

        Ok(quote! {
            ::docgraph::model::FieldModel {
                name: #name,
                cardinality: #cardinality,
                kind: #kind,
            }
        })
    }

    fn reference_tokens(
        &self,
        args: &ReferenceArgs,
        element: &Type,
        siblings: &[Self],
    ) -> Result<TokenStream, Error> {
        let local = siblings
            .iter()
            .find(|field| *field.ident == args.local)
            .ok_or_else(|| {
                Error::new_spanned(
                    self.ident,
                    format!(
                        "reference local field '{}' does not exist on this type",
                        args.local
                    ),
                )
            })?;

        if local.ident == self.ident {
            return Err(Error::new_spanned(
                self.ident,
                "a reference cannot use itself as its local field",
            ));
        }
        if local.is_edge() {
            return Err(Error::new_spanned(
                self.ident,
                format!("reference local field '{}' must be a plain field", args.local),
            ));
        }

        let local_name = &local.name;
        let foreign = option_str(args.foreign.as_deref());
        let collection = option_str(args.collection.as_deref());
        let auto_populate = !args.lazy.is_present();

        Ok(quote! {
            ::docgraph::model::FieldKind::Reference(::docgraph::model::ReferenceModel {
                target: <#element as ::docgraph::traits::EntitySchema>::entity_model,
                collection: #collection,
                local_field: #local_name,
                foreign_field: #foreign,
                auto_populate: #auto_populate,
            })
        })
    }
}

fn option_str(value: Option<&str>) -> TokenStream {
    value.map_or_else(
        || quote!(::core::option::Option::None),
        |value| quote!(::core::option::Option::Some(#value)),
    )
}
