//! Line Protocol Parser
//!
//! Format: measurement,tag1=value1,tag2=value2 field1=value1,field2=value2 timestamp
//!
//! Example: cpu,host=server01,region=us-west usage=64.5,cores=8i 1609459200000000000
//!
//! Timestamps are read at the caller's precision and stored as nanoseconds.
//! A line without a timestamp yields a point whose timestamp is unset.

use crate::error::{LineProtocolError, Result};
use crate::escape::{unescape, unescape_string_value};
use rusts_core::{FieldValue, PointValues, WritePrecision};

/// Line protocol parser
pub struct LineProtocolParser;

impl LineProtocolParser {
    /// Parse a single line
    pub fn parse_line(line: &str, precision: WritePrecision) -> Result<PointValues> {
        let line = line.trim_start().trim_end_matches(['\n', '\r']);
        if line.is_empty() || line.starts_with('#') {
            return Err(parse_error("Empty or comment line"));
        }

        let (series, rest) = split_once_unescaped(line, ' ', false);
        let rest = rest.ok_or_else(|| parse_error("Missing fields"))?;
        let (field_set, timestamp) = split_once_unescaped(rest, ' ', true);

        let mut values = PointValues::new();
        Self::parse_series(series, &mut values)?;
        Self::parse_fields(field_set, &mut values)?;

        if let Some(ts) = timestamp.map(str::trim).filter(|ts| !ts.is_empty()) {
            let ts = ts
                .parse::<i64>()
                .map_err(|e| parse_error(format!("Invalid timestamp '{}': {}", ts, e)))?;
            values.set_timestamp(ts, precision)?;
        }

        Ok(values)
    }

    /// Parse multiple lines, skipping blank lines and comments
    pub fn parse_lines(input: &str, precision: WritePrecision) -> Vec<Result<PointValues>> {
        input
            .lines()
            .filter(|line| !is_blank_or_comment(line))
            .map(|line| Self::parse_line(line, precision))
            .collect()
    }

    /// Parse and collect only successful points
    pub fn parse_lines_ok(input: &str, precision: WritePrecision) -> (Vec<PointValues>, Vec<String>) {
        let mut points = Vec::new();
        let mut errors = Vec::new();

        for line in input.lines() {
            if is_blank_or_comment(line) {
                continue;
            }

            match Self::parse_line(line, precision) {
                Ok(point) => points.push(point),
                Err(e) => errors.push(format!("{}: {}", line.trim(), e)),
            }
        }

        (points, errors)
    }

    fn parse_series(s: &str, values: &mut PointValues) -> Result<()> {
        let mut parts = split_unescaped(s, ',', false).into_iter();

        let measurement = unescape(parts.next().unwrap_or_default());
        if measurement.is_empty() {
            return Err(parse_error("Empty measurement"));
        }
        values.set_measurement(measurement)?;

        for pair in parts {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = split_pair(pair, "tag")?;
            values.set_tag(unescape(key), unescape(value));
        }

        Ok(())
    }

    fn parse_fields(s: &str, values: &mut PointValues) -> Result<()> {
        if s.is_empty() {
            return Err(parse_error("Empty fields"));
        }

        for pair in split_unescaped(s, ',', true) {
            if pair.is_empty() {
                continue;
            }
            let (key, raw) = split_pair(pair, "field")?;
            values.set_field(unescape(key), Self::parse_field_value(raw)?);
        }

        if !values.has_fields() {
            return Err(parse_error("No fields"));
        }
        Ok(())
    }

    fn parse_field_value(s: &str) -> Result<FieldValue> {
        // String (quoted)
        if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
            return Ok(FieldValue::String(unescape_string_value(&s[1..s.len() - 1])));
        }

        match s {
            "t" | "T" | "true" | "True" | "TRUE" => return Ok(FieldValue::Boolean(true)),
            "f" | "F" | "false" | "False" | "FALSE" => return Ok(FieldValue::Boolean(false)),
            _ => {}
        }

        // Integer (ends with 'i'); too large for i64 falls back to unsigned
        if let Some(num) = s.strip_suffix('i') {
            return match num.parse::<i64>() {
                Ok(v) => Ok(FieldValue::Integer(v)),
                Err(e) => num
                    .parse::<u64>()
                    .map(FieldValue::UnsignedInteger)
                    .map_err(|_| parse_error(format!("Invalid integer '{}': {}", s, e))),
            };
        }

        // Unsigned integer (ends with 'u')
        if let Some(num) = s.strip_suffix('u') {
            return num
                .parse::<u64>()
                .map(FieldValue::UnsignedInteger)
                .map_err(|e| parse_error(format!("Invalid unsigned '{}': {}", s, e)));
        }

        let value = s
            .parse::<f64>()
            .map_err(|e| parse_error(format!("Invalid number '{}': {}", s, e)))?;
        if !value.is_finite() {
            return Err(parse_error(format!("Non-finite float '{}'", s)));
        }
        Ok(FieldValue::Float(value))
    }
}

fn parse_error(msg: impl Into<String>) -> LineProtocolError {
    LineProtocolError::Parse(msg.into())
}

fn is_blank_or_comment(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}

/// Split `key=value` on the first unescaped `=`.
fn split_pair<'a>(pair: &'a str, what: &str) -> Result<(&'a str, &'a str)> {
    match split_once_unescaped(pair, '=', false) {
        (key, Some(value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(parse_error(format!("Invalid {}: {}", what, pair))),
    }
}

/// Split on the first `sep` that is not backslash-escaped (and, when
/// `quoted` is set, not inside a double-quoted field value).
fn split_once_unescaped(s: &str, sep: char, quoted: bool) -> (&str, Option<&str>) {
    match find_unescaped(s, sep, quoted) {
        Some(i) => (&s[..i], Some(&s[i + sep.len_utf8()..])),
        None => (s, None),
    }
}

fn split_unescaped(s: &str, sep: char, quoted: bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(i) = find_unescaped(rest, sep, quoted) {
        parts.push(&rest[..i]);
        rest = &rest[i + sep.len_utf8()..];
    }
    parts.push(rest);
    parts
}

/// With `quoted` set, `s` is read as a field set: a `"` opens a string
/// only as the first character of a value, so quotes inside keys are
/// plain characters.
fn find_unescaped(s: &str, sep: char, quoted: bool) -> Option<usize> {
    let mut in_string = false;
    let mut in_key = true;
    let mut value_start = false;
    let mut escape_next = false;

    for (i, c) in s.char_indices() {
        let at_value_start = std::mem::take(&mut value_start);
        if escape_next {
            escape_next = false;
            continue;
        }

        if in_string {
            match c {
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '\\' => escape_next = true,
            c if c == sep => return Some(i),
            '"' if quoted && at_value_start => in_string = true,
            '=' if quoted && in_key => {
                in_key = false;
                value_start = true;
            }
            ',' if quoted => in_key = true,
            _ => {}
        }
    }

    None
}
