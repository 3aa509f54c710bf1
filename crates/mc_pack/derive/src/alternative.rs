use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields};

use crate::attributes::reject_all;
use crate::utils;

/// Generates `Typed` for an enum of single-value variants.
pub(crate) fn impl_alternative(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &ast.data else {
        return Err(syn::Error::new(
            ast.ident.span(),
            "`Alternative` can only be derived for enums",
        ));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new(
            ast.ident.span(),
            "`Alternative` needs at least one variant",
        ));
    }
    reject_all(&ast.attrs, "an alternative")?;

    let mc_pack_path = crate::path::mc_pack();
    let exports = crate::path::exports_(&mc_pack_path);
    let any_ = crate::path::any_();
    let option_ = crate::path::option_();

    let ident = &ast.ident;
    let generic = utils::is_generic(&ast.generics);
    let generics = utils::typed_generics(&ast.generics, &exports)?;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut members = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        reject_all(&variant.attrs, "an alternative member")?;
        let field = match &variant.fields {
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => &fields.unnamed[0],
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "`Alternative` variants must hold exactly one unnamed field",
                ));
            }
        };
        let ty = &field.ty;
        let variant_ident = &variant.ident;
        let name = utils::ident_name(variant_ident);

        members.push(quote_spanned! { ty.span() =>
            #exports::UnionMember::new::<#ty>(
                #name,
                |value| match value.downcast_ref::<Self>()? {
                    Self::#variant_ident(inner) => #option_::Some(inner as &dyn #any_),
                    _ => #option_::None,
                },
                |boxed| #option_::Some(#exports::boxed(Self::#variant_ident(
                    *boxed.downcast::<#ty>().ok()?
                ))),
            )
        });
    }

    let info = quote! {
        #exports::TypeInfo::Union(#exports::UnionInfo::new::<Self>([#(#members),*]))
    };
    let cell = utils::type_info_cell(&exports, generic, info);

    Ok(quote! {
        #[allow(unreachable_patterns)]
        impl #impl_generics #exports::Typed for #ident #ty_generics #where_clause {
            fn type_info() -> &'static #exports::TypeInfo {
                #cell
            }
        }
    })
}
