//! Write path front-end: options, the transport seam and point batching.
//!
//! The HTTP call itself lives behind [`WriteTransport`]; this module only
//! turns points into batches of encoded lines and hands them over together
//! with the precision token and durability flag.

use crate::encoder::LineProtocolEncoder;
use crate::error::{LineProtocolError, Result};
use rusts_core::{PointValues, WriteApi, WritePrecision};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, trace};

pub const ENV_DATABASE: &str = "RUSTS_DATABASE";
pub const ENV_PRECISION: &str = "RUSTS_PRECISION";
pub const ENV_NO_SYNC: &str = "RUSTS_WRITE_NO_SYNC";

/// Options applied to every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Target database
    pub database: Option<String>,
    /// Precision timestamps are written in
    pub precision: WritePrecision,
    /// Write API generation, decides the precision token format
    pub api: WriteApi,
    /// Acknowledge before the write is durable (v3 only)
    pub no_sync: bool,
    /// Tags added to points that do not set them
    pub default_tags: BTreeMap<String, String>,
    /// Maximum lines per transport call
    pub batch_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            database: None,
            precision: WritePrecision::Nanosecond,
            api: WriteApi::V3,
            no_sync: false,
            default_tags: BTreeMap::new(),
            batch_size: 5000,
        }
    }
}

impl WriteOptions {
    /// Overlay `RUSTS_DATABASE`, `RUSTS_PRECISION` and `RUSTS_WRITE_NO_SYNC`.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup; unset variables keep the
    /// current value.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database) = lookup(ENV_DATABASE).filter(|v| !v.is_empty()) {
            self.database = Some(database);
        }
        if let Some(precision) = lookup(ENV_PRECISION) {
            self.precision = WritePrecision::parse(&precision, self.api)?;
        }
        if let Some(no_sync) = lookup(ENV_NO_SYNC) {
            self.no_sync = parse_bool(&no_sync).ok_or_else(|| {
                LineProtocolError::InvalidOption(format!("{}={}", ENV_NO_SYNC, no_sync))
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(LineProtocolError::InvalidOption(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.no_sync && self.api == WriteApi::V2 {
            return Err(LineProtocolError::InvalidOption(
                "no_sync requires the v3 write API".to_string(),
            ));
        }
        Ok(())
    }

    /// Precision token in the format of the configured API generation
    pub fn precision_token(&self) -> &'static str {
        self.precision.token(self.api)
    }

    pub fn encoder(&self) -> LineProtocolEncoder {
        LineProtocolEncoder::new(self.precision).with_default_tags(self.default_tags.clone())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// One transport call worth of encoded lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRequest<'a> {
    pub database: Option<&'a str>,
    pub lines: &'a [String],
    pub precision_token: &'static str,
    pub no_sync: bool,
}

impl WriteRequest<'_> {
    /// Request body: lines joined by `\n`
    pub fn body(&self) -> String {
        join_lines(self.lines)
    }
}

/// The external write transport.
///
/// Implementations own the HTTP call, compression and any retry policy; a
/// retried request must resend the same lines unchanged.
pub trait WriteTransport {
    type Error: fmt::Display;

    fn write(&self, request: &WriteRequest<'_>) -> std::result::Result<(), Self::Error>;
}

/// Join encoded lines into a request body.
pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

/// Outcome of [`PointWriter::write`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Points encoded and handed to the transport
    pub points_written: usize,
    /// Points with nothing to encode
    pub points_skipped: usize,
    /// Transport calls made
    pub batches: usize,
}

/// Encodes points and sends them through a transport in batches.
pub struct PointWriter<T> {
    transport: T,
    options: WriteOptions,
    encoder: LineProtocolEncoder,
}

impl<T: WriteTransport> PointWriter<T> {
    pub fn new(transport: T, options: WriteOptions) -> Result<Self> {
        options.validate()?;
        let encoder = options.encoder();
        Ok(Self {
            transport,
            options,
            encoder,
        })
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Encode and write points. Points without encodable fields are
    /// skipped; if none remain the transport is not called at all.
    pub fn write<'a, P, I>(&self, points: I) -> Result<WriteSummary>
    where
        P: AsRef<PointValues> + 'a,
        I: IntoIterator<Item = &'a P>,
    {
        let mut summary = WriteSummary::default();
        let mut lines = Vec::new();

        for point in points {
            match self.encoder.encode(point.as_ref())? {
                Some(line) => lines.push(line),
                None => summary.points_skipped += 1,
            }
        }

        if lines.is_empty() {
            trace!(skipped = summary.points_skipped, "nothing to write");
            return Ok(summary);
        }

        for chunk in lines.chunks(self.options.batch_size) {
            self.send(chunk)?;
            summary.points_written += chunk.len();
            summary.batches += 1;
        }

        Ok(summary)
    }

    /// Write lines that are already encoded, e.g. a retried batch.
    pub fn write_lines(&self, lines: &[String]) -> Result<WriteSummary> {
        let mut summary = WriteSummary::default();
        for chunk in lines.chunks(self.options.batch_size) {
            self.send(chunk)?;
            summary.points_written += chunk.len();
            summary.batches += 1;
        }
        Ok(summary)
    }

    fn send(&self, lines: &[String]) -> Result<()> {
        let request = WriteRequest {
            database: self.options.database.as_deref(),
            lines,
            precision_token: self.options.precision_token(),
            no_sync: self.options.no_sync,
        };

        debug!(
            lines = lines.len(),
            precision = request.precision_token,
            no_sync = request.no_sync,
            "sending write batch"
        );

        self.transport
            .write(&request)
            .map_err(|e| LineProtocolError::Transport(e.to_string()))
    }
}
