//! Parsing of `#[pack(...)]` attributes.

use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, ExprLit, ExprPath, ExprUnary, Lit, LitStr, UnOp};

use crate::PACK_ATTRIBUTE_NAME;

fn pack_attributes(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident(PACK_ATTRIBUTE_NAME))
}

fn unsupported(meta: &ParseNestedMeta, place: &str) -> syn::Error {
    let name = meta
        .path
        .get_ident()
        .map(ToString::to_string)
        .unwrap_or_default();
    meta.error(format!("unsupported `pack` attribute `{name}` on {place}"))
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// Attributes on a `Record` type.
#[derive(Default, Debug)]
pub(crate) struct TypeAttributes {
    pub debug: bool,
    pub omit_absent_flag: bool,
    pub use_bytes: bool,
    pub use_enum: bool,
    pub use_datetime: bool,
    pub deny_unknown_fields: bool,
    pub hooks: bool,
    pub auto_register: Option<Span>,
}

impl TypeAttributes {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in pack_attributes(attrs) {
            attr.parse_nested_meta(|meta| {
                let path = &meta.path;
                if path.is_ident("debug") {
                    out.debug = true;
                } else if path.is_ident("omit_absent_flag") {
                    out.omit_absent_flag = true;
                } else if path.is_ident("use_bytes") {
                    out.use_bytes = true;
                } else if path.is_ident("use_enum") {
                    out.use_enum = true;
                } else if path.is_ident("use_datetime") {
                    out.use_datetime = true;
                } else if path.is_ident("deny_unknown_fields") {
                    out.deny_unknown_fields = true;
                } else if path.is_ident("hooks") {
                    out.hooks = true;
                } else if path.is_ident("auto_register") {
                    out.auto_register = Some(path.span());
                } else {
                    return Err(unsupported(&meta, "a record"));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

/// Rejects any `#[pack(...)]` attribute on items that take none.
pub(crate) fn reject_all(attrs: &[Attribute], place: &str) -> syn::Result<()> {
    for attr in pack_attributes(attrs) {
        attr.parse_nested_meta(|meta| Err(unsupported(&meta, place)))?;
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// How a missing key is filled on unpack.
#[derive(Debug)]
pub(crate) enum FieldDefault {
    /// `#[pack(default)]`
    Trait,
    /// `#[pack(default = "path")]`
    Path(ExprPath),
}

/// Attributes on a `Record` field.
#[derive(Default, Debug)]
pub(crate) struct FieldAttributes {
    pub rename: Option<LitStr>,
    pub default: Option<FieldDefault>,
    pub opaque: bool,
}

impl FieldAttributes {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in pack_attributes(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let key: LitStr = meta.value()?.parse()?;
                    if key.value().is_empty() {
                        return Err(syn::Error::new(key.span(), "the key must not be empty"));
                    }
                    out.rename = Some(key);
                } else if meta.path.is_ident("default") {
                    out.default = Some(if meta.input.peek(syn::Token![=]) {
                        let path: LitStr = meta.value()?.parse()?;
                        FieldDefault::Path(path.parse()?)
                    } else {
                        FieldDefault::Trait
                    });
                } else if meta.path.is_ident("opaque") {
                    out.opaque = true;
                } else {
                    return Err(unsupported(&meta, "a field"));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// VariantAttributes

/// The underlying value of an `Enumeration` variant.
#[derive(Debug, Clone)]
pub(crate) enum VariantValue {
    Str(String),
    Int(i64),
}

/// Attributes on an `Enumeration` variant.
#[derive(Default, Debug)]
pub(crate) struct VariantAttributes {
    pub value: Option<(VariantValue, Span)>,
}

impl VariantAttributes {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in pack_attributes(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("value") {
                    let expr: Expr = meta.value()?.parse()?;
                    out.value = Some((parse_variant_value(&expr)?, expr.span()));
                    Ok(())
                } else {
                    Err(unsupported(&meta, "an enumeration variant"))
                }
            })?;
        }
        Ok(out)
    }
}

fn parse_variant_value(expr: &Expr) -> syn::Result<VariantValue> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(VariantValue::Str(s.value())),
        Expr::Lit(ExprLit {
            lit: Lit::Int(i), ..
        }) => Ok(VariantValue::Int(i.base10_parse()?)),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => match &**expr {
            Expr::Lit(ExprLit {
                lit: Lit::Int(i), ..
            }) => Ok(VariantValue::Int(-i.base10_parse::<i64>()?)),
            other => Err(syn::Error::new(other.span(), "expected an integer literal")),
        },
        other => Err(syn::Error::new(
            other.span(),
            "expected a string or integer literal",
        )),
    }
}
