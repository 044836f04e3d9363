//! Scalar types shared by the point model

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nanosecond-precision Unix epoch timestamp
pub type Timestamp = i64;

/// Runtime kind of a [`FieldValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Float,
    Integer,
    UnsignedInteger,
    String,
    Boolean,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Float => "float",
            FieldKind::Integer => "integer",
            FieldKind::UnsignedInteger => "unsigned_integer",
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// 64-bit floating point
    Float(f64),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit unsigned integer
    UnsignedInteger(u64),
    /// UTF-8 string
    String(String),
    /// Boolean value
    Boolean(bool),
}

impl FieldValue {
    /// Runtime kind of this value
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::UnsignedInteger(_) => FieldKind::UnsignedInteger,
            FieldValue::String(_) => FieldKind::String,
            FieldValue::Boolean(_) => FieldKind::Boolean,
        }
    }

    /// Get the type name of this field value
    pub fn type_name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// False for NaN and infinite floats, which line protocol cannot carry
    pub fn is_finite(&self) -> bool {
        match self {
            FieldValue::Float(v) => v.is_finite(),
            _ => true,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::UnsignedInteger(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(v as f64)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UnsignedInteger(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::UnsignedInteger(v as u64)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

/// A value type that can be read back out of a [`FieldValue`] without coercion.
pub trait FieldType: Sized {
    const KIND: FieldKind;

    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

macro_rules! field_type {
    ($ty:ty, $kind:ident, $accessor:expr) => {
        impl FieldType for $ty {
            const KIND: FieldKind = FieldKind::$kind;

            fn from_field_value(value: &FieldValue) -> Option<Self> {
                $accessor(value)
            }
        }
    };
}

field_type!(f64, Float, FieldValue::as_f64);
field_type!(i64, Integer, FieldValue::as_i64);
field_type!(u64, UnsignedInteger, FieldValue::as_u64);
field_type!(bool, Boolean, FieldValue::as_bool);
field_type!(String, String, |v: &FieldValue| v.as_str().map(str::to_string));

/// Checked extraction of a typed value from a named field.
pub(crate) fn extract<T: FieldType>(field: &str, value: &FieldValue) -> Result<T, CoreError> {
    T::from_field_value(value).ok_or_else(|| CoreError::TypeMismatch {
        field: field.to_string(),
        expected: T::KIND.as_str(),
        actual: value.type_name(),
    })
}
