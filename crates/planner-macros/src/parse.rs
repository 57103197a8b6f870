//! Parsing of `#[derive(Bind)]` input.
//!
//! Collects the named fields of the struct together with their
//! `#[bind(...)]` attributes.

use proc_macro2::Span;
use syn::{
    ext::IdentExt, punctuated::Punctuated, spanned::Spanned, Data, DeriveInput, Expr, ExprLit,
    Fields, Generics, Ident, Lit, LitStr, Meta, Token, Type,
};

/// A struct that derives `Bind`.
#[derive(Debug)]
pub struct BindStruct {
    /// Struct name.
    pub name: Ident,
    /// Struct generics, forwarded to the impl.
    pub generics: Generics,
    /// Bindable fields in declaration order (skipped fields excluded).
    pub fields: Vec<BindField>,
}

/// One bindable field.
#[derive(Debug)]
pub struct BindField {
    /// Rust identifier as written (may be raw).
    pub ident: Ident,
    /// Declared type.
    pub ty: Type,
    /// Explicit lookup key from `#[bind(key = "...")]`.
    pub key: Option<LitStr>,
}

impl BindField {
    /// Identifier without any `r#` prefix.
    pub fn name(&self) -> String {
        self.ident.unraw().to_string()
    }
}

#[derive(Debug, Default)]
struct FieldAttrs {
    key: Option<LitStr>,
    skip: bool,
}

impl FieldAttrs {
    fn from_field(field: &syn::Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("bind")) {
            let metas =
                attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;

            for meta in metas {
                match meta {
                    Meta::Path(path) if path.is_ident("skip") => attrs.skip = true,
                    Meta::NameValue(nv) if nv.path.is_ident("key") => {
                        let key = match &nv.value {
                            Expr::Lit(ExprLit {
                                lit: Lit::Str(s), ..
                            }) => s.clone(),
                            _ => {
                                return Err(syn::Error::new(
                                    nv.value.span(),
                                    "expected string literal",
                                ))
                            }
                        };
                        if key.value().is_empty() {
                            return Err(syn::Error::new(key.span(), "bind key cannot be empty"));
                        }
                        if attrs.key.is_some() {
                            return Err(syn::Error::new(nv.path.span(), "duplicate `key` attribute"));
                        }
                        attrs.key = Some(key);
                    }
                    other => {
                        return Err(syn::Error::new(
                            other.span(),
                            "unknown bind attribute, expected `key = \"...\"` or `skip`",
                        ))
                    }
                }
            }
        }

        if attrs.skip && attrs.key.is_some() {
            return Err(syn::Error::new(
                field.span(),
                "`skip` and `key` cannot be combined",
            ));
        }
        Ok(attrs)
    }
}

impl BindStruct {
    /// Parses a derive input, rejecting anything but a struct with named fields.
    pub fn parse(input: DeriveInput) -> syn::Result<Self> {
        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named,
                Fields::Unnamed(_) | Fields::Unit => {
                    return Err(syn::Error::new(
                        input.ident.span(),
                        "Bind can only be derived for structs with named fields",
                    ))
                }
            },
            Data::Enum(_) | Data::Union(_) => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "Bind can only be derived for structs",
                ))
            }
        };

        let mut fields = Vec::new();
        for field in &named.named {
            let attrs = FieldAttrs::from_field(field)?;
            if attrs.skip {
                continue;
            }
            let ident = field
                .ident
                .clone()
                .ok_or_else(|| syn::Error::new(Span::call_site(), "expected named field"))?;

            if let Some(key) = &attrs.key {
                let clash = fields
                    .iter()
                    .any(|f: &BindField| f.key.as_ref().is_some_and(|k| k.value() == key.value()));
                if clash {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("duplicate bind key `{}`", key.value()),
                    ));
                }
            }

            fields.push(BindField {
                ident,
                ty: field.ty.clone(),
                key: attrs.key,
            });
        }

        Ok(Self {
            name: input.ident,
            generics: input.generics,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_parse_named_struct() {
        let input: DeriveInput = parse_quote! {
            struct EchoQuery {
                name: Option<String>,
                #[bind(key = "years")]
                age: Option<u32>,
            }
        };
        let parsed = BindStruct::parse(input).unwrap();

        assert_eq!(parsed.name.to_string(), "EchoQuery");
        assert_eq!(parsed.fields.len(), 2);
        assert_eq!(parsed.fields[0].name(), "name");
        assert!(parsed.fields[0].key.is_none());
        assert_eq!(parsed.fields[1].key.as_ref().unwrap().value(), "years");
    }

    #[test]
    fn test_skip_field() {
        let input: DeriveInput = parse_quote! {
            struct Headers {
                authorization: Option<String>,
                #[bind(skip)]
                cached: bool,
            }
        };
        let parsed = BindStruct::parse(input).unwrap();

        assert_eq!(parsed.fields.len(), 1);
        assert_eq!(parsed.fields[0].name(), "authorization");
    }

    #[test]
    fn test_raw_identifier() {
        let input: DeriveInput = parse_quote! {
            struct Filter {
                r#type: Option<String>,
            }
        };
        let parsed = BindStruct::parse(input).unwrap();

        assert_eq!(parsed.fields[0].name(), "type");
    }

    #[test]
    fn test_tuple_struct_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Id(String);
        };
        let err = BindStruct::parse(input).unwrap_err();

        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn test_enum_rejected() {
        let input: DeriveInput = parse_quote! {
            enum Choice { A, B }
        };
        assert!(BindStruct::parse(input).is_err());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Dup {
                #[bind(key = "id")]
                a: String,
                #[bind(key = "id")]
                b: String,
            }
        };
        let err = BindStruct::parse(input).unwrap_err();

        assert!(err.to_string().contains("duplicate bind key"));
    }

    #[test]
    fn test_non_string_key_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Bad {
                #[bind(key = 5)]
                a: String,
            }
        };
        let err = BindStruct::parse(input).unwrap_err();

        assert!(err.to_string().contains("expected string literal"));
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Bad {
                #[bind(rename = "x")]
                a: String,
            }
        };
        assert!(BindStruct::parse(input).is_err());
    }

    #[test]
    fn test_skip_with_key_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Bad {
                #[bind(skip, key = "x")]
                a: String,
            }
        };
        assert!(BindStruct::parse(input).is_err());
    }
}
