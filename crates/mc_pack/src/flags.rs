use bitflags::bitflags;

bitflags! {
    /// Call-time flags passed to `pack` and `unpack`.
    ///
    /// Unpacking accepts the same type and ignores the pack-only flags.
    ///
    /// # Examples
    ///
    /// ```
    /// use mc_pack::Flags;
    ///
    /// let flags = Flags::OMIT_ABSENT;
    /// assert!(flags.contains(Flags::OMIT_ABSENT));
    /// assert!(Flags::empty().is_empty());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u8 {
        /// Drop fields whose packed value is `Value::Null`.
        ///
        /// Only accepted by records that enable `omit_absent_flag`; forwarded
        /// into nested records that enable it too.
        const OMIT_ABSENT = 1 << 0;
    }
}

impl Flags {
    /// The flags a nested record with `omit_absent_enabled` sees.
    #[inline]
    pub(crate) const fn for_nested(self, omit_absent_enabled: bool) -> Self {
        if omit_absent_enabled {
            self
        } else {
            self.difference(Self::OMIT_ABSENT)
        }
    }
}
