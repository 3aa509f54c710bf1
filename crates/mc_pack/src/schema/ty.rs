use core::any::{Any, TypeId, type_name};
use core::fmt;
use core::hash::{Hash, Hasher};

// -----------------------------------------------------------------------------
// Type

/// The identity of a described type: its [`TypeId`] and type path.
///
/// # Examples
///
/// ```
/// use mc_pack::schema::Type;
///
/// let ty = Type::of::<Vec<String>>();
/// assert!(ty.is::<Vec<String>>());
/// assert_eq!(ty.name(), "Vec<alloc::string::String>");
/// ```
#[derive(Clone, Copy)]
pub struct Type {
    id: TypeId,
    path: &'static str,
}

impl Type {
    /// Creates the [`Type`] of `T`.
    #[inline]
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`].
    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the full type path, as reported by [`core::any::type_name`].
    #[inline(always)]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Returns the path with the module prefix of the outermost type removed.
    ///
    /// Generic arguments keep their full paths.
    pub fn name(&self) -> &'static str {
        let path = self.path;
        let head = path.find('<').unwrap_or(path.len());
        match path[..head].rfind("::") {
            Some(i) => &path[i + 2..],
            None => path,
        }
    }

    /// Check if the given type matches this one.
    #[inline]
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::Type;

    struct Local;

    #[test]
    fn short_names() {
        assert_eq!(Type::of::<u32>().name(), "u32");
        assert_eq!(Type::of::<Local>().name(), "Local");
        assert_eq!(Type::of::<Option<Local>>().name().split('<').next(), Some("Option"));
        assert_eq!(Type::of::<Local>(), Type::of::<Local>());
        assert_ne!(Type::of::<Local>(), Type::of::<u32>());
    }
}
