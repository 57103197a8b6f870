//! `#[derive(Bind)]` expansion.

use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::{spanned::Spanned, DeriveInput};

use crate::parse::{BindField, BindStruct};

/// Expands `#[derive(Bind)]` into an `impl ::planner_bind::Bind`.
pub fn expand_bind(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let parsed = BindStruct::parse(input)?;
    Ok(generate_impl(&parsed))
}

fn generate_impl(parsed: &BindStruct) -> TokenStream {
    let name = &parsed.name;
    let (impl_generics, ty_generics, where_clause) = parsed.generics.split_for_impl();
    let specs = parsed.fields.iter().map(field_spec);

    quote! {
        impl #impl_generics ::planner_bind::Bind for #name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::planner_bind::FieldSpec<Self>> {
                ::std::vec![#(#specs),*]
            }
        }
    }
}

fn field_spec(field: &BindField) -> TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;
    let name = field.name();

    // Spanned at the type so an unsupported field type points at the field.
    let coerce = quote_spanned! {ty.span()=>
        <#ty as ::planner_bind::Coerce>::coerce(raw)?
    };

    let with_key = field.key.as_ref().map(|key| quote! { .with_key(#key) });

    quote! {
        ::planner_bind::FieldSpec::new(#name, |target: &mut Self, raw: &str| {
            target.#ident = #coerce;
            ::std::result::Result::Ok(())
        })
        #with_key
    }
}
