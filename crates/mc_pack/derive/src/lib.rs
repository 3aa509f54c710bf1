//! See following macros:
//!
//! - [`Record`]
//! - [`Enumeration`]
//! - [`Alternative`]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

static PACK_ATTRIBUTE_NAME: &str = "pack";

// -----------------------------------------------------------------------------
// Modules

mod alternative;
mod attributes;
mod enumeration;
mod path;
mod record;
mod utils;

// -----------------------------------------------------------------------------
// Macros

/// # Record Derivation
///
/// `#[derive(Record)]` implements `Typed` for a struct with named fields,
/// describing it as a record the `PackRegistry` can compile routines for.
///
/// Every field type must implement `Typed`, unless the field is marked
/// `opaque`. Type parameters receive a `Typed` bound.
///
/// ## Type Attributes
///
/// ```rust, ignore
/// #[derive(Record)]
/// #[pack(omit_absent_flag, use_datetime, deny_unknown_fields)]
/// struct Event { /* ... */ }
/// ```
///
/// - `debug`: emit the rendered routines to the registry's debug sink when
///   the type is registered.
/// - `omit_absent_flag`: accept `Flags::OMIT_ABSENT` on `pack`.
/// - `use_bytes`: pack byte sequences as `Value::Bytes`, not base64 text.
/// - `use_enum`: pack enumerations as `Value::Opaque`, not their underlying value.
/// - `use_datetime`: pack dates and times as `Value::Temporal`, not ISO-8601 text.
/// - `deny_unknown_fields`: reject input keys that match no field.
/// - `hooks`: the type implements `PackHooks` itself. Without it a no-op
///   implementation is generated.
/// - `auto_register`: collect the type for `PackRegistry::auto_register`.
///   Requires the `auto_register` feature; not available on generic types.
///
/// ## Field Attributes
///
/// ```rust, ignore
/// #[derive(Record)]
/// struct User {
///     #[pack(rename = "userName")]
///     name: String,
///     #[pack(default)]
///     tags: Vec<String>,
///     #[pack(default = "default_level")]
///     level: u8,
///     #[pack(opaque)]
///     handle: Handle,
/// }
/// ```
///
/// - `rename = "key"`: the key used in the packed mapping.
/// - `default`: fill a missing key with `Default::default()`.
/// - `default = "path"`: fill a missing key by calling `path()`.
/// - `opaque`: carry the value through unchanged as `Value::Opaque`; the
///   type must be `Clone + Send + Sync + 'static`.
#[proc_macro_derive(Record, attributes(pack))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    expand(record::impl_record(&ast))
}

/// # Enumeration Derivation
///
/// `#[derive(Enumeration)]` implements `Typed` for a field-less enum. Each
/// variant packs to its underlying value: the variant name, or the literal
/// given with `#[pack(value = ...)]` (a string or an integer).
///
/// ```rust, ignore
/// #[derive(Enumeration, Clone, Copy)]
/// enum Level {
///     #[pack(value = "low")]
///     Low,
///     #[pack(value = "high")]
///     High,
/// }
///
/// #[derive(Enumeration)]
/// enum Code {
///     #[pack(value = 200)]
///     Ok,
///     #[pack(value = 404)]
///     NotFound,
/// }
/// ```
///
/// Underlying values must be distinct and of one kind.
#[proc_macro_derive(Enumeration, attributes(pack))]
pub fn derive_enumeration(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    expand(enumeration::impl_enumeration(&ast))
}

/// # Alternative Derivation
///
/// `#[derive(Alternative)]` implements `Typed` for an enum whose variants each
/// hold exactly one unnamed field. Packing uses the held member; unpacking
/// tries the members in declaration order and keeps the first that succeeds.
///
/// ```rust, ignore
/// #[derive(Alternative)]
/// enum IdOrName {
///     Id(u64),
///     Name(String),
/// }
/// ```
///
/// Put the narrower members first: with `Name(String)` first, `Id` would
/// never be tried for string input, but with `Any(Value)` first nothing else
/// would ever be.
#[proc_macro_derive(Alternative, attributes(pack))]
pub fn derive_alternative(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    expand(alternative::impl_alternative(&ast))
}

fn expand(result: syn::Result<proc_macro2::TokenStream>) -> TokenStream {
    match result {
        Ok(tokens) => TokenStream::from(quote! {
            const _: () = {
                #tokens
            };
        }),
        Err(err) => err.into_compile_error().into(),
    }
}
