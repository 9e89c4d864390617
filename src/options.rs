use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::QueryError;

/// Connection-wide defaults for formatting and decoding.
///
/// ```rust
/// use wirequery::prelude::*;
///
/// let option = ConnectionOption::from_json(r#"{"time_zone": "+09:00"}"#).unwrap();
/// assert_eq!(option.time_zone.local_minus_utc(), 9 * 3600);
/// assert!(!option.omit_details_on_error);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionOption {
    /// Zone used to render date parameters and to read temporal columns.
    #[serde(deserialize_with = "deserialize_time_zone")]
    pub time_zone: FixedOffset,
    /// Leave the command text out of error messages.
    pub omit_details_on_error: bool,
}

impl Default for ConnectionOption {
    fn default() -> Self {
        Self {
            time_zone: utc(),
            omit_details_on_error: false,
        }
    }
}

impl ConnectionOption {
    #[must_use]
    pub fn with_time_zone(mut self, time_zone: FixedOffset) -> Self {
        self.time_zone = time_zone;
        self
    }

    #[must_use]
    pub fn with_omit_details_on_error(mut self, omit: bool) -> Self {
        self.omit_details_on_error = omit;
        self
    }

    /// Load options from a JSON document; missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns `QueryError::Config` on malformed JSON or an unknown time zone.
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        serde_json::from_str(json).map_err(|e| QueryError::Config(e.to_string()))
    }

    /// Per-call option that uses this connection's zone.
    #[must_use]
    pub fn parameter_option(&self) -> QueryParameterOption {
        QueryParameterOption {
            time_zone: self.time_zone,
        }
    }
}

/// Per-call override for formatting and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParameterOption {
    pub time_zone: FixedOffset,
}

impl QueryParameterOption {
    #[must_use]
    pub fn new(time_zone: FixedOffset) -> Self {
        Self { time_zone }
    }
}

impl Default for QueryParameterOption {
    fn default() -> Self {
        Self { time_zone: utc() }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Parse `UTC`, `Z`, `+09:00`, `-0530` or `+09` into a fixed offset.
///
/// # Errors
/// Returns `QueryError::Config` if the string is not one of those forms.
pub fn parse_time_zone(s: &str) -> Result<FixedOffset, QueryError> {
    let invalid = || QueryError::Config(format!("invalid time zone `{s}`"));
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
        return Ok(utc());
    }

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let (hours, minutes) = match digits.len() {
        2 => (&digits[..2], "0"),
        4 => (&digits[..2], &digits[2..]),
        _ => return Err(invalid()),
    };
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

fn deserialize_time_zone<'de, D>(deserializer: D) -> Result<FixedOffset, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_time_zone(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zone_forms() {
        assert_eq!(parse_time_zone("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_time_zone("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_time_zone("+09:00").unwrap().local_minus_utc(), 32400);
        assert_eq!(parse_time_zone("-0530").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_time_zone("+02").unwrap().local_minus_utc(), 7200);
        for bad in ["", "JST", "+9", "+09:75", "+25:00", "0900"] {
            assert!(parse_time_zone(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn json_defaults_and_overrides() {
        let option = ConnectionOption::from_json("{}").unwrap();
        assert_eq!(option, ConnectionOption::default());

        let option =
            ConnectionOption::from_json(r#"{"time_zone":"-05:00","omit_details_on_error":true}"#)
                .unwrap();
        assert_eq!(option.time_zone.local_minus_utc(), -18000);
        assert!(option.omit_details_on_error);

        assert!(matches!(
            ConnectionOption::from_json(r#"{"time_zone":"Mars/Olympus"}"#),
            Err(QueryError::Config(_))
        ));
    }
}
