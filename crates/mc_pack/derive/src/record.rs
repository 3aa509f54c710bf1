use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields};

use crate::attributes::{FieldAttributes, FieldDefault, TypeAttributes};
use crate::utils;

/// Generates `Typed` (and a no-op `PackHooks` unless `hooks` is set) for a
/// struct with named fields.
pub(crate) fn impl_record(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Struct(data) = &ast.data else {
        return Err(syn::Error::new(
            ast.ident.span(),
            "`Record` can only be derived for structs with named fields",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new(
            data.fields.span(),
            "`Record` needs named fields",
        ));
    };

    let attrs = TypeAttributes::parse(&ast.attrs)?;
    let mc_pack_path = crate::path::mc_pack();
    let exports = crate::path::exports_(&mc_pack_path);
    let any_ = crate::path::any_();
    let option_ = crate::path::option_();

    let ident = &ast.ident;
    let generic = utils::is_generic(&ast.generics);
    let generics = utils::typed_generics(&ast.generics, &exports)?;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut keys = HashSet::new();
    let mut field_infos = Vec::with_capacity(named.named.len());
    let mut takes = Vec::with_capacity(named.named.len());

    for field in &named.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let field_attrs = FieldAttributes::parse(&field.attrs)?;
        let ty = &field.ty;
        let name = utils::ident_name(field_ident);

        let key = field_attrs
            .rename
            .as_ref()
            .map_or_else(|| name.clone(), |lit| lit.value());
        if !keys.insert(key.clone()) {
            return Err(syn::Error::new(
                field_ident.span(),
                format!("two fields use the output key `{key}`"),
            ));
        }

        let getter = quote! {
            |value| #option_::Some(&value.downcast_ref::<Self>()?.#field_ident as &dyn #any_)
        };
        let mut info = if field_attrs.opaque {
            quote_spanned! { ty.span() => #exports::FieldInfo::opaque::<#ty>(#name, #getter) }
        } else {
            quote_spanned! { ty.span() => #exports::FieldInfo::new::<#ty>(#name, #getter) }
        };
        if let Some(rename) = &field_attrs.rename {
            info = quote! { #info.with_key(#rename) };
        }
        match &field_attrs.default {
            Some(FieldDefault::Trait) => {
                info = quote! {
                    #info.with_default(|| #exports::boxed::<#ty>(::core::default::Default::default()))
                };
            }
            Some(FieldDefault::Path(path)) => {
                info = quote! {
                    #info.with_default(|| #exports::boxed::<#ty>(#path()))
                };
            }
            None => {}
        }
        field_infos.push(info);
        takes.push(quote! {
            #field_ident: #exports::take::<#ty>(&mut values)?
        });
    }

    let TypeAttributes {
        debug,
        omit_absent_flag,
        use_bytes,
        use_enum,
        use_datetime,
        deny_unknown_fields,
        hooks,
        auto_register,
    } = attrs;

    let fields = if field_infos.is_empty() {
        quote!([] as [#exports::FieldInfo; 0])
    } else {
        quote!([#(#field_infos),*])
    };
    let with_hooks = hooks.then(|| quote!(.with_hooks(#exports::HookTable::of::<Self>())));
    let record_info = quote! {
        #exports::TypeInfo::Record(
            #exports::RecordInfo::new::<Self>(
                #fields,
                |values| {
                    let mut values = values.into_iter();
                    #option_::Some(#exports::boxed(Self { #(#takes),* }))
                },
            )
            .with_config(
                #exports::RecordConfig::new()
                    .with_debug(#debug)
                    .with_omit_absent_flag(#omit_absent_flag)
                    .with_use_bytes(#use_bytes)
                    .with_use_enum(#use_enum)
                    .with_use_datetime(#use_datetime)
                    .with_deny_unknown_fields(#deny_unknown_fields)
            )
            #with_hooks
        )
    };
    let cell = utils::type_info_cell(&exports, generic, record_info);

    let no_op_hooks = (!hooks).then(|| {
        quote! {
            impl #impl_generics #exports::PackHooks for #ident #ty_generics #where_clause {}
        }
    });
    let auto_register = utils::auto_register(&mc_pack_path, ident, generic, auto_register)?;

    Ok(quote! {
        impl #impl_generics #exports::Typed for #ident #ty_generics #where_clause {
            fn type_info() -> &'static #exports::TypeInfo {
                #cell
            }
        }

        #no_op_hooks

        #auto_register
    })
}
