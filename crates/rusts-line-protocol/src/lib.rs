//! RusTs Line Protocol - wire codec for the RusTs client
//!
//! This crate provides:
//! - Line protocol encoder with per-position escaping and typed field formatting
//! - Line protocol parser (InfluxDB compatible) producing `PointValues`
//! - Write options, the `WriteTransport` seam and a batching `PointWriter`

pub mod encoder;
pub mod error;
pub mod escape;
pub mod parser;
pub mod writer;

pub use encoder::{LineProtocolEncoder, ToLineProtocol};
pub use error::{LineProtocolError, Result};
pub use parser::LineProtocolParser;
pub use writer::{join_lines, PointWriter, WriteOptions, WriteRequest, WriteSummary, WriteTransport};
