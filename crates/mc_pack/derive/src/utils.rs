use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::spanned::Spanned;
use syn::{GenericParam, Generics, Ident, parse_quote};

/// Adds `T: Typed` to every type parameter and rejects lifetime parameters,
/// which `Any` cannot carry.
pub(crate) fn typed_generics(generics: &Generics, exports: &TokenStream) -> syn::Result<Generics> {
    let mut generics = generics.clone();
    for param in &mut generics.params {
        match param {
            GenericParam::Lifetime(lt) => {
                return Err(syn::Error::new(
                    lt.span(),
                    "packed types cannot have lifetime parameters",
                ));
            }
            GenericParam::Type(ty) => ty.bounds.push(parse_quote!(#exports::Typed)),
            GenericParam::Const(_) => {}
        }
    }
    Ok(generics)
}

/// The body of `Typed::type_info`, caching `info` in the right kind of cell.
pub(crate) fn type_info_cell(exports: &TokenStream, generic: bool, info: TokenStream) -> TokenStream {
    if generic {
        quote! {
            static CELL: #exports::GenericTypeInfoCell = #exports::GenericTypeInfoCell::new();
            CELL.get_or_insert::<Self>(|| #info)
        }
    } else {
        quote! {
            static CELL: #exports::NonGenericTypeInfoCell = #exports::NonGenericTypeInfoCell::new();
            CELL.get_or_init(|| #info)
        }
    }
}

/// The name of an identifier as written, without a raw prefix.
pub(crate) fn ident_name(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_owned(),
        None => name,
    }
}

#[inline]
pub(crate) fn is_generic(generics: &Generics) -> bool {
    generics
        .params
        .iter()
        .any(|p| !matches!(p, GenericParam::Lifetime(_)))
}

/// `inventory::submit!` for a non-generic record.
#[cfg(feature = "auto_register")]
pub(crate) fn auto_register(
    mc_pack_path: &syn::Path,
    ident: &Ident,
    generic: bool,
    span: Option<Span>,
) -> syn::Result<TokenStream> {
    let Some(span) = span else {
        return Ok(TokenStream::new());
    };
    if generic {
        return Err(syn::Error::new(
            span,
            "`auto_register` is not available on generic types",
        ));
    }
    let auto_register_ = crate::path::auto_register_(mc_pack_path);
    let exports = crate::path::exports_(mc_pack_path);
    Ok(quote::quote_spanned! { span =>
        #auto_register_::inventory::submit! {
            #auto_register_::AutoRegistration {
                type_info: <#ident as #exports::Typed>::type_info,
            }
        }
    })
}

#[cfg(not(feature = "auto_register"))]
pub(crate) fn auto_register(
    _: &syn::Path,
    _: &Ident,
    _: bool,
    _: Option<Span>,
) -> syn::Result<TokenStream> {
    Ok(TokenStream::new())
}
