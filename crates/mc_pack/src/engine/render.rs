//! Pseudo-source rendering of compiled routines, for `#[pack(debug)]`.
//!
//! The listing mirrors what the strategies do; it is never parsed or run.

use alloc::format;
use alloc::string::String;
use core::fmt::Write;

use crate::config::RecordConfig;
use crate::engine::compile::CompiledField;
use crate::engine::strategy::{KeyForm, MemberNode, Node, Strategy};
use crate::schema::Type;

const INDENT: &str = "    ";

/// Renders `fn pack` and `fn unpack` of one record.
pub(crate) fn render(ty: &Type, config: &RecordConfig, fields: &[CompiledField]) -> String {
    let mut out = String::new();
    let name = ty.name();

    // Writing into a `String` cannot fail.
    let _ = writeln!(out, "// {} {:?}", ty.path(), config);
    let _ = writeln!(out, "fn pack(value: &{name}, flags: Flags) -> Result<Map, PackError> {{");
    if config.omit_absent_flag_enabled {
        let _ = writeln!(out, "{INDENT}let omit = flags.contains(Flags::OMIT_ABSENT);");
    } else {
        let _ = writeln!(out, "{INDENT}reject_flags(flags, Flags::OMIT_ABSENT)?;");
    }
    let _ = writeln!(out, "{INDENT}let mut map = Map::with_capacity({});", fields.len());
    for field in fields {
        let key = field.info.key();
        let expr = pack_expr(&field.strategy, &format!("value.{}", field.info.name()));
        if config.omit_absent_flag_enabled {
            let _ = writeln!(out, "{INDENT}let packed = {expr};");
            let _ = writeln!(
                out,
                "{INDENT}if !(omit && packed.is_null()) {{ map.insert({key:?}, packed); }}"
            );
        } else {
            let _ = writeln!(out, "{INDENT}map.insert({key:?}, {expr});");
        }
    }
    let _ = writeln!(out, "{INDENT}Ok(map)");
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);

    let _ = writeln!(out, "fn unpack(map: Map) -> Result<{name}, UnpackError> {{");
    if config.deny_unknown_fields {
        let keys: alloc::vec::Vec<_> = fields.iter().map(|f| f.info.key()).collect();
        let _ = writeln!(out, "{INDENT}deny_unknown(&map, &{keys:?})?;");
    }
    for field in fields {
        let key = field.info.key();
        let missing = if field.info.has_default() {
            String::from("default()")
        } else {
            format!("return Err(missing_field({key:?}))")
        };
        let _ = writeln!(
            out,
            "{INDENT}let {} = match map.get({key:?}) {{ Some(v) => {}, None => {missing} }};",
            field.info.name(),
            unpack_expr(&field.strategy, "v"),
        );
    }
    let names: alloc::vec::Vec<_> = fields.iter().map(|f| f.info.name()).collect();
    let _ = writeln!(out, "{INDENT}Ok({name} {{ {} }})", names.join(", "));
    let _ = writeln!(out, "}}");
    out
}

fn pack_expr(strategy: &Strategy, input: &str) -> String {
    match strategy.node() {
        Node::Primitive { .. } => format!("Value::from({input})"),
        Node::Bytes { native: true, .. } => format!("Value::Bytes({input}.to_vec())"),
        Node::Bytes { native: false, .. } => format!("Value::Str(base64::encode({input}))"),
        Node::Temporal { native: true, .. } => format!("Value::Temporal({input}.into())"),
        Node::Temporal { native: false, .. } => format!("Value::Str({input}.to_iso_string())"),
        Node::Enumeration { native: true, .. } => format!("Value::Opaque(share({input}))"),
        Node::Enumeration { ty, native: false } => format!("{ty}::value_of({input})"),
        Node::Text { .. } => format!("Value::Str({input}.to_string())"),
        Node::Opaque { .. } => format!("Value::Opaque(OpaqueValue::new({input}.clone()))"),
        Node::Sequence { item, .. } => format!(
            "Value::List({input}.iter().map(|item| {}).collect::<Result<_, _>>()?)",
            pack_expr(item, "item"),
        ),
        Node::Mapping {
            key,
            key_form,
            value,
            ..
        } => {
            let key = match key_form {
                KeyForm::Str => pack_expr(key, "k"),
                _ => format!("key_text({})", pack_expr(key, "k")),
            };
            format!(
                "Value::Map({input}.iter().map(|(k, v)| ({key}, {})).collect::<Result<_, _>>()?)",
                pack_expr(value, "v"),
            )
        }
        Node::Record { ty } => format!("Value::Map(pack::<{ty}>({input}, nested(flags))?)"),
        Node::Alternative { members, .. } => {
            let arms: alloc::vec::Vec<_> = members
                .iter()
                .map(|m| format!("{} => {}", member_pattern(m), member_pack(m)))
                .collect();
            format!("match {input} {{ {} }}", arms.join(", "))
        }
    }
}

fn unpack_expr(strategy: &Strategy, input: &str) -> String {
    match strategy.node() {
        Node::Primitive { ty } => format!("{ty}::try_from({input})?"),
        Node::Bytes { ty, native: true } => format!("{ty}::from(bytes_or_base64({input})?)"),
        Node::Bytes { ty, native: false } => format!("{ty}::from(base64::decode({input}.as_str()?)?)"),
        Node::Temporal { ty, native: true } => format!("{ty}::from_temporal_or_iso({input})?"),
        Node::Temporal { ty, native: false } => format!("{ty}::parse_iso({input}.as_str()?)?"),
        Node::Enumeration { ty, native: true } => format!("{ty}::from_opaque_or_value({input})?"),
        Node::Enumeration { ty, native: false } => format!("{ty}::from_value({input})?"),
        Node::Text { ty } => format!("{input}.as_str()?.parse::<{ty}>()?"),
        Node::Opaque { ty } => format!("{input}.as_opaque()?.downcast_ref::<{ty}>()?.clone()"),
        Node::Sequence { ty, item } => format!(
            "{input}.as_list()?.iter().map(|item| Ok({})).collect::<Result<{ty}, _>>()?",
            unpack_expr(item, "item"),
        ),
        Node::Mapping {
            ty,
            key,
            key_form,
            value,
        } => {
            let key = match key_form {
                KeyForm::Str => unpack_expr(key, "&Value::from(k)"),
                KeyForm::Int => unpack_expr(key, "&parse_int(k)?"),
                KeyForm::UInt => unpack_expr(key, "&parse_uint(k)?"),
                KeyForm::Bool => unpack_expr(key, "&parse_bool(k)?"),
            };
            format!(
                "{input}.as_map()?.iter().map(|(k, v)| Ok(({key}, {}))).collect::<Result<{ty}, _>>()?",
                unpack_expr(value, "v"),
            )
        }
        Node::Record { ty } => format!("unpack::<{ty}>({input}.as_map()?.clone())?"),
        Node::Alternative { ty, members } => {
            let tries: alloc::vec::Vec<_> = members
                .iter()
                .filter(|m| !m.pack_only)
                .map(|m| match &m.strategy {
                    Some(s) => format!("|v| Ok({}({}))", m.label, unpack_expr(s, "v")),
                    None => String::from("|v| expect_null(v)"),
                })
                .collect();
            format!("first_of::<{ty}>({input}, [{}])?", tries.join(", "))
        }
    }
}

fn member_pattern(member: &MemberNode) -> String {
    match member.strategy {
        Some(_) => format!("{}(member)", member.label),
        None => String::from("None"),
    }
}

fn member_pack(member: &MemberNode) -> String {
    match &member.strategy {
        Some(s) => pack_expr(s, "member"),
        None => String::from("Value::Null"),
    }
}
