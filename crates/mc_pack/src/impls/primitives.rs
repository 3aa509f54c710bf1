use alloc::boxed::Box;
use alloc::string::String;
use core::any::Any;

use crate::schema::{DynBox, NonGenericTypeInfoCell, PrimitiveInfo, PrimitiveKind, TypeInfo, Typed};
use crate::value::Value;

macro_rules! impl_primitive {
    ($ty:ty, $kind:expr, $to:expr, $from:expr) => {
        impl Typed for $ty {
            fn type_info() -> &'static TypeInfo {
                static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| TypeInfo::Primitive(PrimitiveInfo::new::<$ty>($kind, $to, $from)))
            }
        }
    };
}

macro_rules! impl_signed {
    ($($ty:ty),*) => {$(
        impl_primitive!(
            $ty,
            PrimitiveKind::Int,
            |v: &dyn Any| v.downcast_ref::<$ty>().map(|n| Value::Int(*n as i64)),
            |v: &Value| {
                let n = <$ty>::try_from(v.as_i64()?).ok()?;
                Some(Box::new(n) as DynBox)
            }
        );
    )*};
}

macro_rules! impl_unsigned {
    ($($ty:ty),*) => {$(
        impl_primitive!(
            $ty,
            PrimitiveKind::UInt,
            |v: &dyn Any| v.downcast_ref::<$ty>().map(|n| Value::UInt(*n as u64)),
            |v: &Value| {
                let n = <$ty>::try_from(v.as_u64()?).ok()?;
                Some(Box::new(n) as DynBox)
            }
        );
    )*};
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl_primitive!(
    f64,
    PrimitiveKind::Float,
    |v: &dyn Any| v.downcast_ref::<f64>().map(|n| Value::Float(*n)),
    |v: &Value| Some(Box::new(v.as_f64()?) as DynBox)
);

impl_primitive!(
    f32,
    PrimitiveKind::Float,
    |v: &dyn Any| v.downcast_ref::<f32>().map(|n| Value::Float(f64::from(*n))),
    |v: &Value| {
        let n = v.as_f64()?;
        let narrow = n as f32;
        // Finite input must stay finite.
        if n.is_finite() && narrow.is_infinite() {
            return None;
        }
        Some(Box::new(narrow) as DynBox)
    }
);

impl_primitive!(
    bool,
    PrimitiveKind::Bool,
    |v: &dyn Any| v.downcast_ref::<bool>().map(|b| Value::Bool(*b)),
    |v: &Value| Some(Box::new(v.as_bool()?) as DynBox)
);

impl_primitive!(
    String,
    PrimitiveKind::Str,
    |v: &dyn Any| v.downcast_ref::<String>().map(|s| Value::Str(s.clone())),
    |v: &Value| Some(Box::new(String::from(v.as_str()?)) as DynBox)
);

impl_primitive!(
    char,
    PrimitiveKind::Char,
    |v: &dyn Any| {
        v.downcast_ref::<char>()
            .map(|c| Value::Str(String::from(*c)))
    },
    |v: &Value| {
        let mut chars = v.as_str()?.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Box::new(c) as DynBox),
            _ => None,
        }
    }
);

impl_primitive!(
    (),
    PrimitiveKind::Unit,
    |v: &dyn Any| v.is::<()>().then_some(Value::Null),
    |v: &Value| v.is_null().then(|| Box::new(()) as DynBox)
);

#[cfg(test)]
mod tests {
    use crate::schema::Typed;
    use crate::value::Value;

    fn unpack<T: Typed + Copy>(v: Value) -> Option<T> {
        let info = T::type_info().as_primitive().unwrap();
        info.from_value(&v).map(|b| *b.downcast::<T>().unwrap())
    }

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(unpack::<u8>(Value::Int(255)), Some(255));
        assert_eq!(unpack::<u8>(Value::Int(256)), None);
        assert_eq!(unpack::<i8>(Value::UInt(3)), Some(3));
        assert_eq!(unpack::<u32>(Value::Int(-1)), None);
        assert_eq!(unpack::<i64>(Value::Str("1".into())), None);
    }

    #[test]
    fn floats_accept_integers() {
        assert_eq!(unpack::<f64>(Value::Int(2)), Some(2.0));
        assert_eq!(unpack::<f32>(Value::Float(0.5)), Some(0.5));
        assert_eq!(unpack::<f64>(Value::Bool(true)), None);
    }

    #[test]
    fn f32_rejects_overflow() {
        assert_eq!(unpack::<f32>(Value::Float(1e39)), None);
        assert_eq!(unpack::<f32>(Value::Float(-1e39)), None);
        assert_eq!(unpack::<f32>(Value::Float(f64::INFINITY)), Some(f32::INFINITY));
        assert_eq!(unpack::<f32>(Value::Float(f64::from(f32::MAX))), Some(f32::MAX));
    }

    #[test]
    fn char_needs_a_single_character() {
        assert_eq!(unpack::<char>(Value::from("x")), Some('x'));
        assert_eq!(unpack::<char>(Value::from("xy")), None);
        assert_eq!(unpack::<char>(Value::from("")), None);

        let info = char::type_info().as_primitive().unwrap();
        assert_eq!(info.to_value(&'z'), Some(Value::from("z")));
    }
}
