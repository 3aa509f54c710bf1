use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::schema::{BytesInfo, DynBox, NonGenericTypeInfoCell, OpaqueInfo, TemporalInfo};
use crate::schema::{TextInfo, TypeInfo, Typed};
use crate::value::{Temporal, TemporalKind, Value};

// -----------------------------------------------------------------------------
// Byte sequences

impl Typed for Bytes {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Bytes(BytesInfo::of::<Bytes>()))
    }
}

impl Typed for BytesMut {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            TypeInfo::Bytes(BytesInfo::new::<BytesMut>(|v: Vec<u8>| {
                Box::new(BytesMut::from(&v[..])) as DynBox
            }))
        })
    }
}

// -----------------------------------------------------------------------------
// Dates and times

macro_rules! impl_temporal {
    ($ty:ty, $kind:ident, $to:expr, $from:expr) => {
        impl Typed for $ty {
            fn type_info() -> &'static TypeInfo {
                static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| {
                    TypeInfo::Temporal(TemporalInfo::new::<$ty>(TemporalKind::$kind, $to, $from))
                })
            }
        }
    };
}

impl_temporal!(
    NaiveDate,
    Date,
    |v: &dyn Any| v.downcast_ref::<NaiveDate>().map(|d| Temporal::Date(*d)),
    |t: &Temporal| match t {
        Temporal::Date(d) => Some(Box::new(*d) as DynBox),
        _ => None,
    }
);

impl_temporal!(
    NaiveTime,
    Time,
    |v: &dyn Any| v.downcast_ref::<NaiveTime>().map(|d| Temporal::Time(*d)),
    |t: &Temporal| match t {
        Temporal::Time(d) => Some(Box::new(*d) as DynBox),
        _ => None,
    }
);

impl_temporal!(
    NaiveDateTime,
    DateTime,
    |v: &dyn Any| v.downcast_ref::<NaiveDateTime>().map(|d| Temporal::DateTime(*d)),
    |t: &Temporal| match t {
        Temporal::DateTime(d) => Some(Box::new(*d) as DynBox),
        _ => None,
    }
);

impl_temporal!(
    DateTime<Utc>,
    DateTimeUtc,
    |v: &dyn Any| {
        v.downcast_ref::<DateTime<Utc>>()
            .map(|d| Temporal::Zoned(d.fixed_offset()))
    },
    |t: &Temporal| match t {
        Temporal::Zoned(d) => Some(Box::new(d.with_timezone(&Utc)) as DynBox),
        _ => None,
    }
);

impl_temporal!(
    DateTime<FixedOffset>,
    DateTimeOffset,
    |v: &dyn Any| v.downcast_ref::<DateTime<FixedOffset>>().map(|d| Temporal::Zoned(*d)),
    |t: &Temporal| match t {
        Temporal::Zoned(d) => Some(Box::new(*d) as DynBox),
        _ => None,
    }
);

// -----------------------------------------------------------------------------
// Text forms

macro_rules! impl_text {
    ($($ty:ty),*) => {$(
        impl Typed for $ty {
            fn type_info() -> &'static TypeInfo {
                static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| TypeInfo::Text(TextInfo::new::<$ty>()))
            }
        }
    )*};
}

impl_text!(Uuid, IpAddr, Ipv4Addr, Ipv6Addr);

impl Typed for PathBuf {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            TypeInfo::Text(TextInfo::with_fns::<PathBuf>(
                |v: &dyn Any| {
                    let path = v.downcast_ref::<PathBuf>()?;
                    Some(path.to_string_lossy().into_owned())
                },
                |s: &str| Ok(Box::new(PathBuf::from(s)) as DynBox),
            ))
        })
    }
}

// -----------------------------------------------------------------------------
// Value

/// A `Value` field accepts anything and packs to itself.
impl Typed for Value {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            TypeInfo::Opaque(OpaqueInfo::new::<Value>(
                |v: &dyn Any| v.downcast_ref::<Value>().cloned(),
                |v: &Value| Some(Box::new(v.clone()) as DynBox),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use core::any::Any;

    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    use crate::schema::Typed;
    use crate::value::{Temporal, TemporalKind};

    #[test]
    fn utc_goes_through_fixed_offset() {
        let info = <DateTime<Utc>>::type_info().as_temporal().unwrap();
        assert_eq!(info.kind(), TemporalKind::DateTimeUtc);

        let at = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let t = info.to_temporal(&at as &dyn Any).unwrap();
        assert_eq!(t.to_iso_string(), "2020-01-02T03:04:05+00:00");

        let shifted = Temporal::parse(TemporalKind::DateTimeUtc, "2020-01-02T05:04:05+02:00").unwrap();
        let back = info.from_temporal(&shifted).unwrap();
        assert_eq!(back.downcast_ref::<DateTime<Utc>>(), Some(&at));
    }

    #[test]
    fn uuid_is_text() {
        let info = Uuid::type_info().as_text().unwrap();
        let id = Uuid::from_u128(0x1234);
        let text = info.to_text(&id as &dyn Any).unwrap();
        assert_eq!(text, "00000000-0000-0000-0000-000000001234");
        assert!(info.parse("not-a-uuid").is_err());
        assert_eq!(info.parse(&text).unwrap().downcast_ref::<Uuid>(), Some(&id));
    }
}
