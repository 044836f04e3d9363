//! Field/tag store backing a point

use crate::access::FieldAccess;
use crate::error::{CoreError, Result};
use crate::point::Point;
use crate::precision::WritePrecision;
use crate::row::{Cell, Row, MEASUREMENT_COLUMN, TIME_COLUMN};
use crate::types::{FieldValue, Timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Measurement name, tags, typed fields and an optional timestamp.
///
/// Tags and fields live in separate key spaces and are kept ordered by key,
/// which is the order they are serialized in. The measurement may be unset
/// here; [`Point`] is the wrapper that requires one.
///
/// Not internally synchronized: build on one thread, then hand it off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointValues {
    measurement: Option<String>,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    /// Nanoseconds since the Unix epoch; `None` lets the server assign one
    timestamp: Option<Timestamp>,
}

impl PointValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measurement(&self) -> Option<&str> {
        self.measurement.as_deref()
    }

    /// Set the measurement name. An empty name is rejected.
    pub fn set_measurement(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::InvalidArgument(
                "measurement name must not be empty".to_string(),
            ));
        }
        self.measurement = Some(name);
        Ok(self)
    }

    // Tags

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Set a tag. An empty value is kept but never serialized.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn set_tags<K, V, I>(&mut self, tags: I) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in tags {
            self.set_tag(key, value);
        }
        self
    }

    /// Remove a tag, returning its value. Absent keys are a no-op.
    pub fn remove_tag(&mut self, key: &str) -> Option<String> {
        self.tags.remove(key)
    }

    // Fields

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Set a field, replacing whatever value (of any type) was stored at `key`.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn set_float_field(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.set_field(key, FieldValue::Float(value))
    }

    pub fn set_integer_field(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.set_field(key, FieldValue::Integer(value))
    }

    pub fn set_uinteger_field(&mut self, key: impl Into<String>, value: u64) -> &mut Self {
        self.set_field(key, FieldValue::UnsignedInteger(value))
    }

    pub fn set_string_field(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set_field(key, FieldValue::String(value.into()))
    }

    pub fn set_boolean_field(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.set_field(key, FieldValue::Boolean(value))
    }

    pub fn set_fields<K, V, I>(&mut self, fields: I) -> &mut Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in fields {
            self.set_field(key, value);
        }
        self
    }

    /// Remove a field, returning its value. Absent keys are a no-op.
    pub fn remove_field(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    // Timestamp

    /// Timestamp in nanoseconds since the Unix epoch
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    /// Set the timestamp from a value expressed in `precision`.
    pub fn set_timestamp(&mut self, value: i64, precision: WritePrecision) -> Result<&mut Self> {
        self.timestamp = Some(precision.to_nanos(value)?);
        Ok(self)
    }

    pub fn set_timestamp_nanos(&mut self, nanos: Timestamp) -> &mut Self {
        self.timestamp = Some(nanos);
        self
    }

    /// Set the timestamp from a UTC date-time.
    ///
    /// Only dates between 1677-09-21 and 2262-04-11 fit in nanoseconds.
    pub fn set_time(&mut self, time: DateTime<Utc>) -> Result<&mut Self> {
        let nanos = time.timestamp_nanos_opt().ok_or_else(|| {
            CoreError::InvalidArgument(format!("{time} is out of the nanosecond range"))
        })?;
        self.timestamp = Some(nanos);
        Ok(self)
    }

    pub fn clear_timestamp(&mut self) -> &mut Self {
        self.timestamp = None;
        self
    }

    // Conversions

    /// Deep copy; tags and fields are cloned into new containers.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Wrap into a [`Point`]. `measurement` overrides the stored name when given.
    pub fn as_point(&self, measurement: Option<&str>) -> Result<Point> {
        let mut values = self.clone();
        if let Some(name) = measurement {
            values.set_measurement(name)?;
        }
        Point::from_values(values)
    }

    /// Build a store from a query row.
    ///
    /// The reserved measurement column sets the measurement; all other tag
    /// columns become tags, field columns become fields and the `time`
    /// column becomes the timestamp. A time cell under any other column is
    /// rejected.
    pub fn from_row(row: &Row) -> Result<Self> {
        let mut values = Self::new();
        if let Some(name) = row.measurement() {
            values.set_measurement(name)?;
        }

        for (column, cell) in row {
            match cell {
                Cell::Tag(_) if column == MEASUREMENT_COLUMN => {}
                Cell::Tag(value) => {
                    values.set_tag(column.as_str(), value.as_str());
                }
                Cell::Field(value) => {
                    values.set_field(column.as_str(), value.clone());
                }
                Cell::Time(nanos) if column == TIME_COLUMN => {
                    let nanos = i64::try_from(*nanos).map_err(|_| CoreError::PrecisionOverflow {
                        value: *nanos,
                        precision: WritePrecision::Nanosecond,
                    })?;
                    values.set_timestamp_nanos(nanos);
                }
                Cell::Time(_) => {
                    return Err(CoreError::InvalidArgument(format!(
                        "time value in column '{}', expected '{}'",
                        column, TIME_COLUMN
                    )));
                }
            }
        }

        Ok(values)
    }

    /// Render as a query-shaped row.
    ///
    /// A row has a single column namespace, so a tag and a field sharing a
    /// key, or a tag or field named after a reserved column, cannot be
    /// represented and is an error.
    pub fn as_row(&self) -> Result<Row> {
        let mut row = Row::new();
        if let Some(name) = &self.measurement {
            row.insert(MEASUREMENT_COLUMN, Cell::Tag(name.clone()));
        }
        if let Some(nanos) = self.timestamp {
            row.insert(TIME_COLUMN, Cell::Time(i128::from(nanos)));
        }

        let columns = self
            .tags
            .iter()
            .map(|(key, value)| (key, Cell::Tag(value.clone())))
            .chain(
                self.fields
                    .iter()
                    .map(|(key, value)| (key, Cell::Field(value.clone()))),
            );
        for (key, cell) in columns {
            if key == TIME_COLUMN || key == MEASUREMENT_COLUMN {
                return Err(CoreError::InvalidArgument(format!(
                    "'{}' is a reserved row column",
                    key
                )));
            }
            if row.get(key).is_some() {
                return Err(CoreError::InvalidArgument(format!(
                    "'{}' is both a tag and a field",
                    key
                )));
            }
            row.insert(key.clone(), cell);
        }

        Ok(row)
    }
}

impl AsRef<PointValues> for PointValues {
    fn as_ref(&self) -> &PointValues {
        self
    }
}

impl FieldAccess for PointValues {
    fn get_field_value(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}
