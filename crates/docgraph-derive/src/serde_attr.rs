use docgraph_utils::case::RenameRule;
use proc_macro2::TokenStream;
use syn::{Attribute, Error, Lit, LitStr, Token, meta::ParseNestedMeta};

///
/// SerdeContainer
///
/// The container-level serde attributes that change serialized field names.
///

#[derive(Default)]
pub struct SerdeContainer {
    pub rename_all: Option<RenameRule>,
}

impl SerdeContainer {
    pub fn from_attrs(attrs: &[Attribute]) -> Result<Self, Error> {
        let mut out = Self::default();

        for attr in serde_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    let lit: LitStr = meta.value()?.parse()?;
                    let rule = lit
                        .value()
                        .parse::<RenameRule>()
                        .map_err(|err| Error::new_spanned(&lit, err.to_string()))?;
                    out.rename_all = Some(rule);

                    return Ok(());
                }

                skip_value(&meta)
            })?;
        }

        Ok(out)
    }
}

///
/// SerdeField
///

#[derive(Default)]
pub struct SerdeField {
    pub rename: Option<String>,
    pub skip: bool,
}

impl SerdeField {
    pub fn from_attrs(attrs: &[Attribute]) -> Result<Self, Error> {
        let mut out = Self::default();

        for attr in serde_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.rename = Some(lit.value());

                    return Ok(());
                }
                if meta.path.is_ident("skip") {
                    out.skip = true;

                    return Ok(());
                }

                skip_value(&meta)
            })?;
        }

        Ok(out)
    }

    /// Serialized name of a field, after `rename` and the container rule.
    pub fn serialized_name(&self, ident: &str, container: &SerdeContainer) -> String {
        let ident = ident.strip_prefix("r#").unwrap_or(ident);

        match (&self.rename, container.rename_all) {
            (Some(rename), _) => rename.clone(),
            (None, Some(rule)) => rule.apply(ident),
            (None, None) => ident.to_string(),
        }
    }
}

fn serde_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("serde"))
}

// Consume the value of a serde key this derive does not interpret.
fn skip_value(meta: &ParseNestedMeta<'_>) -> Result<(), Error> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<Lit>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<TokenStream>()?;
    }

    Ok(())
}
