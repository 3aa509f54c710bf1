use alloc::boxed::Box;
use core::any::Any;

use crate::schema::TypeInfo;

/// A type-erased, owned value produced while unpacking.
pub type DynBox = Box<dyn Any>;

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to the shape description of a type.
///
/// Implemented for the supported standard types in [`crate::impls`] and by the
/// `Record`, `Enumeration` and `Alternative` derives. The routine compiler
/// reads nothing else: a type without `Typed` cannot be a field type, unless
/// the field is marked `#[pack(opaque)]`.
///
/// # Manually Impl
///
/// Use [`NonGenericTypeInfoCell`] for plain types and [`GenericTypeInfoCell`]
/// for generic ones, so the description is built once:
///
/// ```
/// use mc_pack::schema::{NonGenericTypeInfoCell, TextInfo, TypeInfo, Typed};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Email(String);
///
/// impl core::fmt::Display for Email {
///     fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
///         f.write_str(&self.0)
///     }
/// }
///
/// impl core::str::FromStr for Email {
///     type Err = &'static str;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.contains('@').then(|| Email(s.to_owned())).ok_or("missing `@`")
///     }
/// }
///
/// impl Typed for Email {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| TypeInfo::Text(TextInfo::new::<Email>()))
///     }
/// }
///
/// assert!(Email::type_info().as_text().is_some());
/// ```
///
/// [`NonGenericTypeInfoCell`]: crate::schema::NonGenericTypeInfoCell
/// [`GenericTypeInfoCell`]: crate::schema::GenericTypeInfoCell
pub trait Typed: Any {
    /// Returns the static description of `Self`.
    fn type_info() -> &'static TypeInfo;
}
