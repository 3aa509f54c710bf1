//! Paths used by the generated code.
//!
//! Everything is reached through `mc_pack::__macro_exports`, so moving items
//! inside `mc_pack` only needs a change there.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the correct access path to the `mc_pack` crate.
///
/// 1. For crates that depend on `mc_pack`, `::mc_pack` is returned.
/// 2. For crates that depend on `mapcast`, `::mapcast::pack` is returned.
/// 3. Otherwise `::mc_pack` is returned, which is also what `mc_pack` uses
///    for itself through `extern crate self as mc_pack`.
///
/// Reading the manifest is not cheap, so the path is resolved once per
/// derive and passed down.
pub(crate) fn mc_pack() -> syn::Path {
    mc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("mc_pack"))
}

#[inline(always)]
pub(crate) fn exports_(mc_pack_path: &syn::Path) -> TokenStream {
    quote! {
        #mc_pack_path::__macro_exports
    }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(mc_pack_path: &syn::Path) -> TokenStream {
    quote! {
        #mc_pack_path::__macro_exports::auto_register
    }
}

#[inline(always)]
pub(crate) fn any_() -> TokenStream {
    quote! {
        ::core::any::Any
    }
}

#[inline(always)]
pub(crate) fn option_() -> TokenStream {
    quote! {
        ::core::option::Option
    }
}
