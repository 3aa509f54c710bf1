/// Registration-time configuration of a record type.
///
/// Read once when the routine pair is compiled and baked into it. Declared
/// on the type through `#[pack(...)]` attributes and optionally overridden with
/// [`PackRegistry::register_with`](crate::PackRegistry::register_with).
///
/// # Examples
///
/// ```
/// use mc_pack::RecordConfig;
///
/// const CONFIG: RecordConfig = RecordConfig::new()
///     .with_omit_absent_flag(true)
///     .with_use_datetime(true);
///
/// assert!(CONFIG.omit_absent_flag_enabled);
/// assert!(!CONFIG.debug);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RecordConfig {
    /// Emit the rendered routines to the registry's debug sink at registration.
    pub debug: bool,
    /// Allow [`Flags::OMIT_ABSENT`](crate::Flags::OMIT_ABSENT) on `pack`.
    pub omit_absent_flag_enabled: bool,
    /// Pack byte sequences as `Value::Bytes` instead of base64 text.
    pub use_bytes: bool,
    /// Pack enumerations as `Value::Opaque` instead of their underlying value.
    pub use_enum: bool,
    /// Pack dates and times as `Value::Temporal` instead of ISO-8601 text.
    pub use_datetime: bool,
    /// Reject input keys that match no field.
    pub deny_unknown_fields: bool,
}

impl RecordConfig {
    /// All options off.
    pub const DEFAULT: Self = Self::new();

    #[inline]
    pub const fn new() -> Self {
        Self {
            debug: false,
            omit_absent_flag_enabled: false,
            use_bytes: false,
            use_enum: false,
            use_datetime: false,
            deny_unknown_fields: false,
        }
    }

    #[inline]
    pub const fn with_debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    #[inline]
    pub const fn with_omit_absent_flag(mut self, on: bool) -> Self {
        self.omit_absent_flag_enabled = on;
        self
    }

    #[inline]
    pub const fn with_use_bytes(mut self, on: bool) -> Self {
        self.use_bytes = on;
        self
    }

    #[inline]
    pub const fn with_use_enum(mut self, on: bool) -> Self {
        self.use_enum = on;
        self
    }

    #[inline]
    pub const fn with_use_datetime(mut self, on: bool) -> Self {
        self.use_datetime = on;
        self
    }

    #[inline]
    pub const fn with_deny_unknown_fields(mut self, on: bool) -> Self {
        self.deny_unknown_fields = on;
        self
    }
}
