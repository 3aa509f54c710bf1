use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields};

use crate::attributes::{VariantAttributes, VariantValue, reject_all};
use crate::utils;

/// Generates `Typed` for a field-less enum.
pub(crate) fn impl_enumeration(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &ast.data else {
        return Err(syn::Error::new(
            ast.ident.span(),
            "`Enumeration` can only be derived for enums",
        ));
    };
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new(
            ast.generics.span(),
            "`Enumeration` does not support generics",
        ));
    }
    if data.variants.is_empty() {
        return Err(syn::Error::new(
            ast.ident.span(),
            "`Enumeration` needs at least one variant",
        ));
    }
    reject_all(&ast.attrs, "an enumeration")?;

    let mc_pack_path = crate::path::mc_pack();
    let exports = crate::path::exports_(&mc_pack_path);
    let option_ = crate::path::option_();
    let ident = &ast.ident;

    let mut values: Vec<VariantValue> = Vec::with_capacity(data.variants.len());
    let mut variant_infos = Vec::with_capacity(data.variants.len());
    let mut index_arms = Vec::with_capacity(data.variants.len());
    let mut make_arms = Vec::with_capacity(data.variants.len());
    let mut share_arms = Vec::with_capacity(data.variants.len());

    for (index, variant) in data.variants.iter().enumerate() {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.fields.span(),
                "`Enumeration` variants cannot hold fields",
            ));
        }
        let attrs = VariantAttributes::parse(&variant.attrs)?;
        let variant_ident = &variant.ident;
        let name = utils::ident_name(variant_ident);

        let (value, span) = attrs
            .value
            .unwrap_or_else(|| (VariantValue::Str(name.clone()), variant_ident.span()));
        if let Some(first) = values.first()
            && core::mem::discriminant(first) != core::mem::discriminant(&value)
        {
            return Err(syn::Error::new(
                span,
                "underlying values must all be strings or all be integers",
            ));
        }
        if values.iter().any(|v| same_value(v, &value)) {
            return Err(syn::Error::new(span, "duplicate underlying value"));
        }

        let value_tokens = match &value {
            VariantValue::Str(s) => quote!(#exports::Value::Str(::std::string::String::from(#s))),
            VariantValue::Int(i) => quote!(#exports::Value::Int(#i)),
        };
        values.push(value);

        variant_infos.push(quote! {
            #exports::EnumVariant::new(#name, #value_tokens)
        });
        index_arms.push(quote!(Self::#variant_ident => #index));
        make_arms.push(quote!(#index => #option_::Some(#exports::boxed(Self::#variant_ident))));
        share_arms.push(quote!(#index => #option_::Some(#exports::OpaqueValue::new(Self::#variant_ident))));
    }

    let info = quote! {
        #exports::TypeInfo::Enum(#exports::EnumInfo::new::<Self>(
            [#(#variant_infos),*],
            |value| #option_::Some(match value.downcast_ref::<Self>()? {
                #(#index_arms,)*
            }),
            |index| match index {
                #(#make_arms,)*
                _ => #option_::None,
            },
            |index| match index {
                #(#share_arms,)*
                _ => #option_::None,
            },
        ))
    };
    let cell = utils::type_info_cell(&exports, false, info);

    Ok(quote! {
        impl #exports::Typed for #ident {
            fn type_info() -> &'static #exports::TypeInfo {
                #cell
            }
        }
    })
}

fn same_value(a: &VariantValue, b: &VariantValue) -> bool {
    match (a, b) {
        (VariantValue::Str(a), VariantValue::Str(b)) => a == b,
        (VariantValue::Int(a), VariantValue::Int(b)) => a == b,
        _ => false,
    }
}
