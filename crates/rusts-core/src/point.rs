//! Point - a measurement event with a required measurement name

use crate::access::FieldAccess;
use crate::error::{CoreError, Result};
use crate::precision::WritePrecision;
use crate::row::Row;
use crate::types::{FieldValue, Timestamp};
use crate::values::PointValues;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A single data point: measurement, tags, typed fields and optional timestamp.
///
/// Unlike [`PointValues`] a `Point` always has a non-empty measurement.
///
/// ```
/// use rusts_core::{FieldAccess, Point};
///
/// let point = Point::measurement("temperature")?
///     .tag("location", "west")
///     .field("value", 55.15);
///
/// assert_eq!(point.get_float_field("value")?, Some(55.15));
/// # Ok::<(), rusts_core::CoreError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    values: PointValues,
}

impl Point {
    /// Start a point for `name`. Fails on an empty name.
    pub fn measurement(name: impl Into<String>) -> Result<Self> {
        let mut values = PointValues::new();
        values.set_measurement(name)?;
        Ok(Self { values })
    }

    /// Wrap an existing store, which must carry a measurement.
    pub fn from_values(values: PointValues) -> Result<Self> {
        match values.measurement() {
            Some(name) if !name.is_empty() => Ok(Self { values }),
            _ => Err(CoreError::MissingMeasurement),
        }
    }

    /// Rebuild a point from a query row. `measurement` takes precedence over
    /// the row's own measurement column.
    pub fn from_row(row: &Row, measurement: Option<&str>) -> Result<Self> {
        PointValues::from_row(row)?.as_point(measurement)
    }

    pub fn name(&self) -> &str {
        self.values.measurement().unwrap_or_default()
    }

    pub fn set_measurement(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.values.set_measurement(name)?;
        Ok(self)
    }

    // Builder-style setters

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.set_tag(key, value);
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.set_field(key, value);
        self
    }

    pub fn float_field(self, key: impl Into<String>, value: f64) -> Self {
        self.field(key, FieldValue::Float(value))
    }

    pub fn integer_field(self, key: impl Into<String>, value: i64) -> Self {
        self.field(key, FieldValue::Integer(value))
    }

    pub fn uinteger_field(self, key: impl Into<String>, value: u64) -> Self {
        self.field(key, FieldValue::UnsignedInteger(value))
    }

    pub fn string_field(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.field(key, FieldValue::String(value.into()))
    }

    pub fn boolean_field(self, key: impl Into<String>, value: bool) -> Self {
        self.field(key, FieldValue::Boolean(value))
    }

    pub fn timestamp(mut self, value: i64, precision: WritePrecision) -> Result<Self> {
        self.values.set_timestamp(value, precision)?;
        Ok(self)
    }

    pub fn timestamp_nanos(mut self, nanos: Timestamp) -> Self {
        self.values.set_timestamp_nanos(nanos);
        self
    }

    pub fn time(mut self, time: DateTime<Utc>) -> Result<Self> {
        self.values.set_time(time)?;
        Ok(self)
    }

    // In-place mutators

    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.set_tag(key, value);
        self
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.values.set_field(key, value);
        self
    }

    pub fn set_timestamp(&mut self, value: i64, precision: WritePrecision) -> Result<&mut Self> {
        self.values.set_timestamp(value, precision)?;
        Ok(self)
    }

    pub fn set_timestamp_nanos(&mut self, nanos: Timestamp) -> &mut Self {
        self.values.set_timestamp_nanos(nanos);
        self
    }

    pub fn clear_timestamp(&mut self) -> &mut Self {
        self.values.clear_timestamp();
        self
    }

    pub fn remove_tag(&mut self, key: &str) -> Option<String> {
        self.values.remove_tag(key)
    }

    pub fn remove_field(&mut self, key: &str) -> Option<FieldValue> {
        self.values.remove_field(key)
    }

    // Read access

    pub fn get_tag(&self, key: &str) -> Option<&str> {
        self.values.tag(key)
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        self.values.tags()
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        self.values.fields()
    }

    pub fn get_timestamp(&self) -> Option<Timestamp> {
        self.values.timestamp()
    }

    pub fn values(&self) -> &PointValues {
        &self.values
    }

    pub fn into_values(self) -> PointValues {
        self.values
    }

    pub fn as_row(&self) -> Result<Row> {
        self.values.as_row()
    }

    pub fn copy(&self) -> Self {
        self.clone()
    }
}

impl FieldAccess for Point {
    fn get_field_value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get_field_value(name)
    }
}

impl AsRef<PointValues> for Point {
    fn as_ref(&self) -> &PointValues {
        &self.values
    }
}

impl From<Point> for PointValues {
    fn from(point: Point) -> Self {
        point.values
    }
}

impl TryFrom<PointValues> for Point {
    type Error = CoreError;

    fn try_from(values: PointValues) -> Result<Self> {
        Point::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldKind;

    #[test]
    fn test_point_builder() {
        let point = Point::measurement("cpu")
            .unwrap()
            .tag("region", "us-west")
            .tag("host", "server01")
            .float_field("usage", 64.5)
            .integer_field("cores", 8)
            .timestamp(1_609_459_200, WritePrecision::Second)
            .unwrap();

        assert_eq!(point.name(), "cpu");
        assert_eq!(point.get_timestamp(), Some(1_609_459_200_000_000_000));

        let tag_keys: Vec<&str> = point.tags().keys().map(String::as_str).collect();
        assert_eq!(tag_keys, vec!["host", "region"]);
        assert_eq!(point.get_tag("host"), Some("server01"));
        assert_eq!(point.get_integer_field("cores").unwrap(), Some(8));
    }

    #[test]
    fn test_point_requires_measurement() {
        assert!(matches!(
            Point::measurement(""),
            Err(CoreError::InvalidArgument(_))
        ));
        assert_eq!(
            Point::from_values(PointValues::new()).unwrap_err(),
            CoreError::MissingMeasurement
        );

        let mut point = Point::measurement("cpu").unwrap();
        assert!(point.set_measurement("").is_err());
        assert_eq!(point.name(), "cpu");
    }

    #[test]
    fn test_last_write_wins_across_types() {
        let mut point = Point::measurement("m").unwrap().float_field("v", 1.0);
        point.set_field("v", "now a string");

        assert_eq!(point.field_kind("v"), Some(FieldKind::String));
        assert!(point.get_float_field("v").is_err());
        assert_eq!(point.get_string_field("v").unwrap(), Some("now a string".to_string()));
    }

    #[test]
    fn test_from_row() {
        let row = Row::new()
            .with_measurement("cpu")
            .with_tag("host", "a")
            .with_field("usage", 0.5)
            .with_time(1_000);

        let point = Point::from_row(&row, None).unwrap();
        assert_eq!(point.name(), "cpu");
        assert_eq!(point.get_tag("host"), Some("a"));
        assert_eq!(point.get_tag("iox::measurement"), None);
        assert_eq!(point.get_timestamp(), Some(1_000));

        let renamed = Point::from_row(&row, Some("cpu_1h")).unwrap();
        assert_eq!(renamed.name(), "cpu_1h");

        let anonymous = Row::new().with_field("usage", 0.5);
        assert_eq!(
            Point::from_row(&anonymous, None).unwrap_err(),
            CoreError::MissingMeasurement
        );
    }

    #[test]
    fn test_copy_and_values_conversion() {
        let point = Point::measurement("cpu").unwrap().field("v", 1_i64);
        let mut copy = point.copy();
        copy.remove_field("v");

        assert!(point.has_field("v"));
        assert!(!copy.has_field("v"));

        let values: PointValues = point.clone().into();
        assert_eq!(Point::try_from(values).unwrap(), point);
    }
}
