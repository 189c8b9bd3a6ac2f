//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Result};

struct FieldAttrs {
    column: Option<String>,
    skip: bool,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut metas = Vec::new();
    let mut arms = Vec::new();
    for field in fields {
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let field_name = ident.to_string();
        let tag = match &attrs.column {
            Some(column) => quote! { ::core::option::Option::Some(#column) },
            None => quote! { ::core::option::Option::None },
        };
        let index = metas.len();

        metas.push(quote! {
            ::anyorm::FieldMeta::new(
                #field_name,
                #tag,
                <#ty as ::anyorm::FromValue>::KIND,
                <#ty as ::anyorm::FromValue>::NULLABLE,
            )
        });
        arms.push(quote! {
            #index => self.#ident = <#ty as ::anyorm::FromValue>::from_value(value)?,
        });
    }

    Ok(quote! {
        impl ::anyorm::Record for #name {
            fn fields() -> &'static [::anyorm::FieldMeta] {
                const FIELDS: &[::anyorm::FieldMeta] = &[#(#metas),*];
                FIELDS
            }

            fn set_field(
                &mut self,
                index: usize,
                value: ::anyorm::Value,
            ) -> ::core::result::Result<(), ::anyorm::CoerceError> {
                match index {
                    #(#arms)*
                    _ => {}
                }
                ::core::result::Result::Ok(())
            }
        }
    })
}

fn parse_field_attrs(field: &syn::Field) -> Result<FieldAttrs> {
    let mut attrs = FieldAttrs {
        column: None,
        skip: false,
    };
    for attr in &field.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.column = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported orm attribute, expected `column` or `skip`"))
            }
        })?;
    }
    Ok(attrs)
}
