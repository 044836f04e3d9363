//! Timestamp precision and unit conversion.
//!
//! Points keep their timestamp as canonical nanoseconds. `WritePrecision`
//! describes the unit a timestamp is expressed in on the wire and converts
//! between that unit and nanoseconds with exact integer arithmetic.

use crate::error::{CoreError, Result};
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generation of the write API a precision token is destined for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteApi {
    /// `/api/v2/write`, short precision codes only
    V2,
    /// `/api/v3/write_lp`, long precision names (short codes tolerated)
    #[default]
    V3,
}

/// Unit of a timestamp on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WritePrecision {
    #[default]
    #[serde(rename = "ns")]
    Nanosecond,
    #[serde(rename = "us")]
    Microsecond,
    #[serde(rename = "ms")]
    Millisecond,
    #[serde(rename = "s")]
    Second,
}

impl WritePrecision {
    /// All precisions, finest first
    pub const ALL: [WritePrecision; 4] = [
        WritePrecision::Nanosecond,
        WritePrecision::Microsecond,
        WritePrecision::Millisecond,
        WritePrecision::Second,
    ];

    /// Short code used by the v2 write path
    pub fn legacy_token(self) -> &'static str {
        match self {
            WritePrecision::Nanosecond => "ns",
            WritePrecision::Microsecond => "us",
            WritePrecision::Millisecond => "ms",
            WritePrecision::Second => "s",
        }
    }

    /// Long name used by the v3 write path
    pub fn modern_token(self) -> &'static str {
        match self {
            WritePrecision::Nanosecond => "nanosecond",
            WritePrecision::Microsecond => "microsecond",
            WritePrecision::Millisecond => "millisecond",
            WritePrecision::Second => "second",
        }
    }

    /// Token for the given API generation
    pub fn token(self, api: WriteApi) -> &'static str {
        match api {
            WriteApi::V2 => self.legacy_token(),
            WriteApi::V3 => self.modern_token(),
        }
    }

    /// Parse a precision token as accepted by the given API generation.
    ///
    /// The v2 path only understands the short codes; the v3 path also
    /// accepts the long names. Matching is case-insensitive.
    pub fn parse(s: &str, api: WriteApi) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some(precision) = Self::from_legacy_token(&lower) {
            return Ok(precision);
        }
        if api == WriteApi::V3 {
            if let Some(precision) = Self::from_modern_token(&lower) {
                return Ok(precision);
            }
        }
        Err(CoreError::InvalidPrecision(s.to_string()))
    }

    fn from_legacy_token(s: &str) -> Option<Self> {
        match s {
            "ns" => Some(WritePrecision::Nanosecond),
            "us" => Some(WritePrecision::Microsecond),
            "ms" => Some(WritePrecision::Millisecond),
            "s" => Some(WritePrecision::Second),
            _ => None,
        }
    }

    fn from_modern_token(s: &str) -> Option<Self> {
        match s {
            "nanosecond" => Some(WritePrecision::Nanosecond),
            "microsecond" => Some(WritePrecision::Microsecond),
            "millisecond" => Some(WritePrecision::Millisecond),
            "second" => Some(WritePrecision::Second),
            _ => None,
        }
    }

    /// Number of nanoseconds in one unit of this precision
    pub const fn nanos_per_unit(self) -> i64 {
        match self {
            WritePrecision::Nanosecond => 1,
            WritePrecision::Microsecond => 1_000,
            WritePrecision::Millisecond => 1_000_000,
            WritePrecision::Second => 1_000_000_000,
        }
    }

    /// Scale a timestamp expressed in this precision up to nanoseconds.
    ///
    /// Fails with `PrecisionOverflow` instead of wrapping when the result
    /// does not fit in an `i64`.
    pub fn to_nanos(self, value: i64) -> Result<Timestamp> {
        value
            .checked_mul(self.nanos_per_unit())
            .ok_or(CoreError::PrecisionOverflow {
                value: value as i128,
                precision: self,
            })
    }

    /// Like [`to_nanos`](Self::to_nanos), passing an unset timestamp through.
    pub fn to_nanos_opt(self, value: Option<i64>) -> Result<Option<Timestamp>> {
        value.map(|v| self.to_nanos(v)).transpose()
    }

    /// Express a nanosecond timestamp in this precision.
    ///
    /// Floor division: sub-unit nanoseconds are dropped, and pre-epoch
    /// timestamps round toward negative infinity.
    pub const fn from_nanos(self, nanos: Timestamp) -> i64 {
        nanos.div_euclid(self.nanos_per_unit())
    }

    /// Re-express `value` from one precision in another.
    pub fn convert(value: i64, from: WritePrecision, to: WritePrecision) -> Result<i64> {
        if from == to {
            return Ok(value);
        }
        Ok(to.from_nanos(from.to_nanos(value)?))
    }
}

impl fmt::Display for WritePrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.legacy_token())
    }
}

/// Parses the short codes accepted in configuration files, environment
/// variables and connection strings.
impl FromStr for WritePrecision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, WriteApi::V2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        assert_eq!(WritePrecision::Nanosecond.legacy_token(), "ns");
        assert_eq!(WritePrecision::Microsecond.legacy_token(), "us");
        assert_eq!(WritePrecision::Millisecond.legacy_token(), "ms");
        assert_eq!(WritePrecision::Second.legacy_token(), "s");

        assert_eq!(WritePrecision::Nanosecond.modern_token(), "nanosecond");
        assert_eq!(WritePrecision::Second.modern_token(), "second");

        assert_eq!(WritePrecision::Millisecond.token(WriteApi::V2), "ms");
        assert_eq!(WritePrecision::Millisecond.token(WriteApi::V3), "millisecond");
    }

    #[test]
    fn test_parse_by_api_generation() {
        assert_eq!(
            WritePrecision::parse("ms", WriteApi::V2).unwrap(),
            WritePrecision::Millisecond
        );
        assert!(WritePrecision::parse("millisecond", WriteApi::V2).is_err());

        assert_eq!(
            WritePrecision::parse("Millisecond", WriteApi::V3).unwrap(),
            WritePrecision::Millisecond
        );
        assert_eq!(
            WritePrecision::parse("us", WriteApi::V3).unwrap(),
            WritePrecision::Microsecond
        );

        let err = WritePrecision::parse("minute", WriteApi::V3).unwrap_err();
        assert_eq!(err, CoreError::InvalidPrecision("minute".to_string()));
    }

    #[test]
    fn test_from_str_accepts_short_codes() {
        for precision in WritePrecision::ALL {
            let parsed: WritePrecision = precision.legacy_token().parse().unwrap();
            assert_eq!(parsed, precision);
        }
        assert!("second".parse::<WritePrecision>().is_err());
    }

    #[test]
    fn test_exact_conversion_above_2_pow_53() {
        let nanos: i64 = 1_700_000_000_123_456_789;
        assert!(nanos > (1_i64 << 53));

        let secs = WritePrecision::Second.from_nanos(nanos);
        assert_eq!(secs, 1_700_000_000);
        assert_eq!(
            WritePrecision::Second.to_nanos(secs).unwrap(),
            1_700_000_000_000_000_000
        );

        assert_eq!(WritePrecision::Millisecond.from_nanos(nanos), 1_700_000_000_123);
        assert_eq!(WritePrecision::Microsecond.from_nanos(nanos), 1_700_000_000_123_456);
        assert_eq!(WritePrecision::Nanosecond.from_nanos(nanos), nanos);
    }

    #[test]
    fn test_from_nanos_floors_negative() {
        assert_eq!(WritePrecision::Second.from_nanos(-1), -1);
        assert_eq!(WritePrecision::Second.from_nanos(-1_000_000_000), -1);
        assert_eq!(WritePrecision::Millisecond.from_nanos(-1_500_000), -2);
    }

    #[test]
    fn test_to_nanos_overflow_is_an_error() {
        let err = WritePrecision::Second.to_nanos(i64::MAX / 10).unwrap_err();
        assert!(matches!(
            err,
            CoreError::PrecisionOverflow {
                precision: WritePrecision::Second,
                ..
            }
        ));
        assert_eq!(WritePrecision::Nanosecond.to_nanos(i64::MAX).unwrap(), i64::MAX);
    }

    #[test]
    fn test_unset_timestamp_passes_through() {
        assert_eq!(WritePrecision::Second.to_nanos_opt(None).unwrap(), None);
        assert_eq!(
            WritePrecision::Second.to_nanos_opt(Some(2)).unwrap(),
            Some(2_000_000_000)
        );
    }

    #[test]
    fn test_convert() {
        assert_eq!(
            WritePrecision::convert(1_500, WritePrecision::Millisecond, WritePrecision::Second)
                .unwrap(),
            1
        );
        assert_eq!(
            WritePrecision::convert(3, WritePrecision::Second, WritePrecision::Microsecond)
                .unwrap(),
            3_000_000
        );
    }

    #[test]
    fn test_serde_uses_short_codes() {
        let json = serde_json::to_string(&WritePrecision::Millisecond).unwrap();
        assert_eq!(json, "\"ms\"");
        let parsed: WritePrecision = serde_json::from_str("\"us\"").unwrap();
        assert_eq!(parsed, WritePrecision::Microsecond);
        assert_eq!(WritePrecision::default(), WritePrecision::Nanosecond);
    }
}
