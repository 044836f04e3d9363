//! RusTs Core - Point data model for the RusTs client
//!
//! This crate provides the in-memory representation of a single measurement
//! event and the timestamp rules shared by the write and query paths:
//! - `PointValues`: measurement, tags, typed fields and optional timestamp
//! - `Point`: `PointValues` with a required measurement name
//! - `FieldAccess`: typed field getters that fail on kind mismatches
//! - `FieldValue`: typed field values (Float, Integer, UnsignedInteger, String, Boolean)
//! - `WritePrecision`: wire precision tokens and nanosecond scaling
//! - `Row`: a query result row that converts to and from points

pub mod access;
pub mod error;
pub mod point;
pub mod precision;
pub mod row;
pub mod types;
pub mod values;

pub use access::FieldAccess;
pub use error::{CoreError, Result};
pub use point::Point;
pub use precision::{WriteApi, WritePrecision};
pub use row::{Cell, Row, MEASUREMENT_COLUMN, TIME_COLUMN};
pub use types::{FieldKind, FieldType, FieldValue, Timestamp};
pub use values::PointValues;
