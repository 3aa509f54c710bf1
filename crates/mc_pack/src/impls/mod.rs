//! [`Typed`](crate::schema::Typed) implementations for standard and
//! third-party types.
//!
//! | Shape | Types |
//! |---|---|
//! | primitive | `bool`, `char`, integers, floats, `String`, `()` |
//! | option | `Option<T>` |
//! | pointer | `Box<T>`, `Arc<T>`, `Rc<T>` |
//! | list | `Vec<T>`, `VecDeque<T>`, `HashSet<T>`, `BTreeSet<T>` |
//! | map | `HashMap<K, V>`, `BTreeMap<K, V>` |
//! | bytes | `bytes::Bytes`, `bytes::BytesMut` |
//! | temporal | chrono `NaiveDate`, `NaiveTime`, `NaiveDateTime`, `DateTime<Utc>`, `DateTime<FixedOffset>` |
//! | text | `uuid::Uuid`, `PathBuf`, `IpAddr`, `Ipv4Addr`, `Ipv6Addr` |
//! | opaque | [`Value`](crate::Value), anything passed to [`impl_opaque!`](crate::impl_opaque) |
//!
//! `Vec<u8>` is a list of integers; use `bytes::Bytes` for a byte sequence.

// -----------------------------------------------------------------------------
// Modules

mod collections;
mod external;
mod opaque;
mod primitives;
mod wrappers;

// -----------------------------------------------------------------------------
// Exports

pub use opaque::opaque_type_info;
