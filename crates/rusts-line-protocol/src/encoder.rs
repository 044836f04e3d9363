//! Line protocol encoder
//!
//! Renders one point per line:
//!
//! ```text
//! measurement[,tag=value...] field=value[,field=value...] [timestamp]
//! ```
//!
//! A point without a single encodable field yields `None` rather than a
//! partial line.

use crate::error::Result;
use crate::escape::{push_key, push_measurement, push_string_value};
use rusts_core::{CoreError, FieldValue, PointValues, WritePrecision};
use std::collections::BTreeMap;
use tracing::trace;

/// Encodes points at a fixed timestamp precision, optionally merging in
/// default tags. Immutable once built, so one encoder can be shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineProtocolEncoder {
    precision: WritePrecision,
    default_tags: BTreeMap<String, String>,
}

impl LineProtocolEncoder {
    pub fn new(precision: WritePrecision) -> Self {
        Self {
            precision,
            default_tags: BTreeMap::new(),
        }
    }

    /// Tags added to every encoded point that does not set the key itself.
    pub fn with_default_tags<K, V, I>(mut self, tags: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.default_tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn precision(&self) -> WritePrecision {
        self.precision
    }

    pub fn default_tags(&self) -> &BTreeMap<String, String> {
        &self.default_tags
    }

    /// Encode a point to a single line, or `None` if it has no encodable field.
    ///
    /// Fails only when the measurement name is missing.
    pub fn encode(&self, values: &PointValues) -> Result<Option<String>> {
        let mut line = String::with_capacity(64);
        Ok(self.encode_into(values, &mut line)?.then_some(line))
    }

    /// Append the encoded line to `out`. Returns `false`, leaving `out`
    /// untouched, when the point has no encodable field.
    pub fn encode_into(&self, values: &PointValues, out: &mut String) -> Result<bool> {
        let measurement = match values.measurement() {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(CoreError::InvalidArgument(
                    "measurement name is required to encode a point".to_string(),
                )
                .into())
            }
        };

        let start = out.len();
        push_measurement(out, measurement);
        self.push_tags(values, out);
        out.push(' ');

        if !push_fields(values, out) {
            trace!(measurement, "point has no encodable fields, skipping");
            out.truncate(start);
            return Ok(false);
        }

        if let Some(nanos) = values.timestamp() {
            out.push(' ');
            out.push_str(&self.precision.from_nanos(nanos).to_string());
        }

        Ok(true)
    }

    /// Encode every point, dropping the ones with nothing to write.
    pub fn encode_all<'a, P, I>(&self, points: I) -> Result<Vec<String>>
    where
        P: AsRef<PointValues> + 'a,
        I: IntoIterator<Item = &'a P>,
    {
        let mut lines = Vec::new();
        for point in points {
            if let Some(line) = self.encode(point.as_ref())? {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    fn push_tags(&self, values: &PointValues, out: &mut String) {
        if self.default_tags.is_empty() {
            push_tag_pairs(values.tags().iter(), out);
            return;
        }

        let mut merged: BTreeMap<&String, &String> = self.default_tags.iter().collect();
        merged.extend(values.tags().iter());
        push_tag_pairs(merged.into_iter(), out);
    }
}

/// Tags arrive sorted by key, which keeps the output deterministic.
fn push_tag_pairs<'a>(tags: impl Iterator<Item = (&'a String, &'a String)>, out: &mut String) {
    for (key, value) in tags {
        if key.is_empty() || value.is_empty() {
            continue;
        }
        out.push(',');
        push_key(out, key);
        out.push('=');
        push_key(out, value);
    }
}

/// Returns whether at least one field was written.
fn push_fields(values: &PointValues, out: &mut String) -> bool {
    let mut written = 0;

    for (key, value) in values.fields() {
        if key.is_empty() {
            continue;
        }
        if !value.is_finite() {
            trace!(field = %key, "skipping non-finite field value");
            continue;
        }
        if written > 0 {
            out.push(',');
        }
        push_key(out, key);
        out.push('=');
        push_field_value(out, value);
        written += 1;
    }

    written > 0
}

fn push_field_value(out: &mut String, value: &FieldValue) {
    match value {
        FieldValue::Float(v) => out.push_str(&format_float(*v)),
        FieldValue::Integer(v) => {
            out.push_str(&v.to_string());
            out.push('i');
        }
        FieldValue::UnsignedInteger(v) => {
            out.push_str(&v.to_string());
            out.push('i');
        }
        FieldValue::String(s) => push_string_value(out, s),
        FieldValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
    }
}

/// Plain decimal notation with at least one fractional digit, so a float is
/// never mistaken for an integer on the wire.
///
/// `Display` for `f64` prints the shortest digits that round-trip and never
/// switches to exponent notation.
pub fn format_float(v: f64) -> String {
    let mut s = v.to_string();
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

/// Conversion of a point into a line of line protocol.
pub trait ToLineProtocol {
    /// Encode at nanosecond precision without default tags.
    fn to_line_protocol(&self) -> Result<Option<String>>;

    fn to_line_protocol_with(&self, encoder: &LineProtocolEncoder) -> Result<Option<String>>;
}

impl<T: AsRef<PointValues> + ?Sized> ToLineProtocol for T {
    fn to_line_protocol(&self) -> Result<Option<String>> {
        LineProtocolEncoder::default().encode(self.as_ref())
    }

    fn to_line_protocol_with(&self, encoder: &LineProtocolEncoder) -> Result<Option<String>> {
        encoder.encode(self.as_ref())
    }
}
