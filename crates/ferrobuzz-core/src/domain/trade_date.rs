use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ValidationError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Calendar day used to key mention counts and daily closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradeDate(Date);

impl TradeDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDate {
            value: input.to_owned(),
        };
        let trimmed = input.trim();
        // Full timestamps such as "2021-01-28 16:00:00" keep their day part.
        let day = match (trimmed.get(..10), trimmed.get(10..)) {
            (Some(day), Some(rest)) if rest.is_empty() || rest.starts_with([' ', 'T']) => day,
            _ => return Err(invalid()),
        };
        Date::parse(day, ISO_DATE).map(Self).map_err(|_| invalid())
    }

    /// UTC calendar day of a unix timestamp in seconds.
    pub fn from_unix_timestamp(seconds: i64) -> Result<Self, ValidationError> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .map(|value| Self(value.date()))
            .map_err(|_| ValidationError::InvalidTimestamp { value: seconds })
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }
}

impl Display for TradeDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let formatted = self.0.format(ISO_DATE).map_err(|_| std::fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl From<Date> for TradeDate {
    fn from(value: Date) -> Self {
        Self(value)
    }
}

impl Serialize for TradeDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TradeDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_iso_date() {
        let parsed = TradeDate::parse("2021-01-28").expect("must parse");
        assert_eq!(parsed.into_inner(), date!(2021 - 01 - 28));
        assert_eq!(parsed.to_string(), "2021-01-28");
    }

    #[test]
    fn keeps_day_part_of_timestamps() {
        let parsed = TradeDate::parse("2021-01-28 16:00:00").expect("must parse");
        assert_eq!(parsed.into_inner(), date!(2021 - 01 - 28));
    }

    #[test]
    fn rejects_trailing_characters_after_the_day() {
        for input in ["2021-01-28junk", "2021-01-281", "2021-01-28_16:00"] {
            let err = TradeDate::parse(input).expect_err(input);
            assert!(matches!(err, ValidationError::InvalidDate { .. }), "{input}");
        }
        let parsed = TradeDate::parse("2021-01-28T16:00:00Z").expect("iso timestamp");
        assert_eq!(parsed.to_string(), "2021-01-28");
    }

    #[test]
    fn rejects_garbage() {
        let err = TradeDate::parse("28/01/2021").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }

    #[test]
    fn converts_unix_seconds_to_utc_day() {
        // 2021-01-28T23:59:59Z
        let parsed = TradeDate::from_unix_timestamp(1_611_878_399).expect("in range");
        assert_eq!(parsed.to_string(), "2021-01-28");
    }
}
