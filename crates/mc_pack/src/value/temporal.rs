use alloc::string::{String, ToString};
use core::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

// -----------------------------------------------------------------------------
// TemporalKind

/// The declared date/time type a [`Temporal`] is converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalKind {
    /// `chrono::NaiveDate`
    Date,
    /// `chrono::NaiveTime`
    Time,
    /// `chrono::NaiveDateTime`
    DateTime,
    /// `chrono::DateTime<Utc>`
    DateTimeUtc,
    /// `chrono::DateTime<FixedOffset>`
    DateTimeOffset,
}

impl fmt::Display for TemporalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => f.pad("date"),
            Self::Time => f.pad("time"),
            Self::DateTime => f.pad("datetime"),
            Self::DateTimeUtc => f.pad("datetime (utc)"),
            Self::DateTimeOffset => f.pad("datetime (offset)"),
        }
    }
}

// -----------------------------------------------------------------------------
// Temporal

/// A native date/time value carried inside [`Value::Temporal`](crate::Value).
///
/// Its textual form is ISO-8601: `2024-05-01`, `13:45:00.250`,
/// `2024-05-01T13:45:00` and `2024-05-01T13:45:00+02:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl Temporal {
    /// Renders the ISO-8601 text form.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use mc_pack::value::Temporal;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    /// assert_eq!(Temporal::Date(day).to_iso_string(), "2024-05-01");
    ///
    /// let at = day.and_hms_opt(13, 45, 0).unwrap();
    /// assert_eq!(Temporal::DateTime(at).to_iso_string(), "2024-05-01T13:45:00");
    /// ```
    pub fn to_iso_string(&self) -> String {
        match self {
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Time(t) => t.format("%H:%M:%S%.f").to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Self::Zoned(dt) => dt.to_rfc3339(),
        }
    }

    /// Parses ISO-8601 text into the form expected by `kind`.
    ///
    /// `DateTimeUtc` and `DateTimeOffset` both parse into [`Temporal::Zoned`];
    /// the offset is normalized by the target type.
    pub fn parse(kind: TemporalKind, text: &str) -> Result<Self, chrono::ParseError> {
        Ok(match kind {
            TemporalKind::Date => Self::Date(text.parse()?),
            TemporalKind::Time => Self::Time(text.parse()?),
            TemporalKind::DateTime => Self::DateTime(text.parse()?),
            TemporalKind::DateTimeUtc | TemporalKind::DateTimeOffset => {
                Self::Zoned(DateTime::parse_from_rfc3339(text)?)
            }
        })
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_iso_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{Temporal, TemporalKind};
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn iso_text_round_trips() {
        let time = NaiveTime::from_hms_milli_opt(7, 5, 9, 250).unwrap();
        let text = Temporal::Time(time).to_iso_string();
        assert_eq!(text, "07:05:09.250");
        assert_eq!(Temporal::parse(TemporalKind::Time, &text).unwrap(), Temporal::Time(time));

        let zoned = "2024-02-29T23:59:00+05:30";
        let parsed = Temporal::parse(TemporalKind::DateTimeOffset, zoned).unwrap();
        assert_eq!(parsed.to_iso_string(), zoned);
    }

    #[test]
    fn rejects_wrong_form() {
        assert!(Temporal::parse(TemporalKind::Date, "29/02/2024").is_err());
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            Temporal::parse(TemporalKind::Date, "2024-02-29").unwrap(),
            Temporal::Date(day)
        );
    }
}
