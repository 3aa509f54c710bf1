use alloc::borrow::Cow;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

use crate::hooks::HookError;
use crate::value::ValueKind;

// -----------------------------------------------------------------------------
// RegistrationError

/// A record type could not be compiled.
///
/// Registration aborts for the failing type and every record registered in
/// the same call; previously registered types are untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Cannot register `{type_name}`: {kind}")]
pub struct RegistrationError {
    pub type_name: &'static str,
    pub kind: RegistrationErrorKind,
}

impl RegistrationError {
    #[inline]
    pub(crate) fn new(type_name: &'static str, kind: RegistrationErrorKind) -> Self {
        Self { type_name, kind }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistrationErrorKind {
    #[error("the type is not a record")]
    NotARecord,

    #[error("field `{field}` has mapping keys of type `{key_type}`, which do not pack to text")]
    UnsupportedKey {
        field: &'static str,
        key_type: &'static str,
    },

    #[error("two fields use the output key `{key}`")]
    DuplicateKey { key: &'static str },

    #[error("alternative `{type_name}` has no members")]
    EmptyAlternative { type_name: &'static str },

    #[error("alternative `{type_name}` contains itself without a record in between")]
    RecursiveAlternative { type_name: &'static str },
}

// -----------------------------------------------------------------------------
// FieldPath

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A record field, by output key.
    Field(Cow<'static, str>),
    /// A sequence position.
    Index(usize),
    /// A mapping entry, by packed key.
    Key(String),
}

/// Where inside the unpacked input a [`DecodeError`] happened.
///
/// Rendered as `$`, `$.items[2].owner` or `$.scores["ada"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(VecDeque<PathSegment>);

impl FieldPath {
    /// The root of the input.
    #[inline]
    pub const fn root() -> Self {
        Self(VecDeque::new())
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Segments from the outermost inward.
    #[inline]
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &PathSegment> {
        self.0.iter()
    }

    #[inline]
    fn push_front(&mut self, segment: PathSegment) {
        self.0.push_front(segment);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(i) => write!(f, "[{i}]")?,
                PathSegment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// DecodeError

/// The input mapping does not satisfy a record's schema.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{path}: {kind}")]
pub struct DecodeError {
    pub path: FieldPath,
    pub kind: DecodeErrorKind,
}

/// One member tried while unpacking an alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeAttempt {
    pub member: &'static str,
    pub error: DecodeError,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("unknown field `{field}`")]
    UnknownField { field: String },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: Cow<'static, str>,
        found: ValueKind,
    },

    #[error("invalid {expected}: {reason}")]
    InvalidValue {
        expected: &'static str,
        reason: String,
    },

    #[error("{value} is not a variant of `{enumeration}`")]
    UnknownVariant {
        enumeration: &'static str,
        value: String,
    },

    #[error("no member of `{alternative}` matched ({})", AttemptList(.attempts))]
    NoAlternative {
        alternative: &'static str,
        attempts: Vec<AlternativeAttempt>,
    },

    #[error("expected a map, found {found}")]
    NotAMapping { found: ValueKind },
}

struct AttemptList<'a>(&'a [AlternativeAttempt]);

impl fmt::Display for AttemptList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attempt) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", attempt.member, attempt.error)?;
        }
        Ok(())
    }
}

impl DecodeError {
    /// Creates an error at the root of the input.
    #[inline]
    pub fn new(kind: DecodeErrorKind) -> Self {
        Self {
            path: FieldPath::root(),
            kind,
        }
    }

    #[inline]
    pub(crate) fn mismatch(expected: impl Into<Cow<'static, str>>, found: ValueKind) -> Self {
        Self::new(DecodeErrorKind::TypeMismatch {
            expected: expected.into(),
            found,
        })
    }

    #[inline]
    pub(crate) fn invalid(expected: &'static str, reason: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::InvalidValue {
            expected,
            reason: reason.into(),
        })
    }

    /// Prefixes the path with `segment`; used while the error travels outward.
    #[inline]
    pub fn at(mut self, segment: PathSegment) -> Self {
        self.path.push_front(segment);
        self
    }
}

// -----------------------------------------------------------------------------
// UsageError

/// The caller passed a runtime flag the type's configuration never enabled.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum UsageError {
    #[error("`{type_name}` does not enable `omit_absent_flag`, so `Flags::OMIT_ABSENT` is not accepted")]
    OmitAbsentNotEnabled { type_name: &'static str },
}

// -----------------------------------------------------------------------------
// PackError / UnpackError

/// Failure of a `pack` call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PackError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("`{type_name}` is not registered")]
    NotRegistered { type_name: &'static str },

    #[error("Expected a value of type `{expected}` while packing")]
    Mismatch { expected: &'static str },
}

/// Failure of an `unpack` call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UnpackError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("`{type_name}` is not registered")]
    NotRegistered { type_name: &'static str },

    #[error("Cannot construct `{type_name}` from its unpacked fields")]
    Construct { type_name: &'static str },
}

impl UnpackError {
    /// Prefixes the path of a decode failure; other failures pass unchanged.
    #[inline]
    pub(crate) fn at(self, segment: PathSegment) -> Self {
        match self {
            Self::Decode(e) => Self::Decode(e.at(segment)),
            other => other,
        }
    }

    /// Returns the decode failure, if this is one.
    #[inline]
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeError, DecodeErrorKind, PathSegment};
    use crate::value::ValueKind;

    #[test]
    fn path_renders_outermost_first() {
        let err = DecodeError::mismatch("int", ValueKind::Str)
            .at(PathSegment::Field("owner".into()))
            .at(PathSegment::Index(2))
            .at(PathSegment::Field("items".into()));
        assert_eq!(err.to_string(), "$.items[2].owner: expected int, found string");

        let err = DecodeError::new(DecodeErrorKind::MissingField { field: "id" })
            .at(PathSegment::Key("ada".into()));
        assert_eq!(err.to_string(), r#"$["ada"]: missing field `id`"#);
    }
}
