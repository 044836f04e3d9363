//! rusts-lp - line protocol re-encoding tool
//!
//! Reads line protocol, validates it and writes it back out through the
//! client encoder: sorted tags, canonical escaping and field formatting,
//! timestamps at the requested precision.
//!
//! ## Usage
//!
//! ```bash
//! # Re-encode second-precision input as milliseconds
//! rusts-lp convert data.lp --input-precision s --precision ms
//!
//! # Add default tags, read from stdin
//! cat data.lp | rusts-lp convert --default-tag dc=eu-1 --default-tag rack=4
//!
//! # Report invalid lines without writing anything
//! rusts-lp check data.lp
//!
//! # Write a default rusts-lp.yml
//! rusts-lp --generate-config
//! ```

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::LpConfig;
use rusts_core::{WriteApi, WritePrecision};
use rusts_line_protocol::{LineProtocolParser, PointWriter, WriteRequest, WriteTransport};
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rusts-lp")]
#[command(author, version, about = "Validate and re-encode RusTs line protocol")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, default_value = "rusts-lp.yml")]
    config: PathBuf,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    generate_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse line protocol and write it back out re-encoded
    Convert {
        /// Input file (stdin when omitted)
        input: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Precision of input timestamps (ns, us, ms, s)
        #[arg(long)]
        input_precision: Option<WritePrecision>,

        /// Precision of output timestamps (ns, us, ms, s)
        #[arg(short, long)]
        precision: Option<WritePrecision>,

        /// Default tag added to points without it, as key=value
        #[arg(long = "default-tag", value_parser = parse_tag)]
        default_tags: Vec<(String, String)>,

        /// Drop invalid lines instead of failing
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Parse line protocol and report invalid lines
    Check {
        /// Input file (stdin when omitted)
        input: Option<PathBuf>,

        /// Precision of input timestamps (ns, us, ms, s)
        #[arg(long)]
        input_precision: Option<WritePrecision>,
    },
}

fn parse_tag(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

/// Transport that writes each batch as text, one line per point.
struct TextSink<W: Write> {
    out: RefCell<W>,
}

impl<W: Write> TextSink<W> {
    fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    fn flush(&self) -> io::Result<()> {
        self.out.borrow_mut().flush()
    }
}

impl<W: Write> WriteTransport for TextSink<W> {
    type Error = io::Error;

    fn write(&self, request: &WriteRequest<'_>) -> io::Result<()> {
        let mut out = self.out.borrow_mut();
        out.write_all(request.body().as_bytes())?;
        out.write_all(b"\n")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        LpConfig::write_default(&cli.config)?;
        println!("Generated default configuration: {}", cli.config.display());
        return Ok(());
    }

    let mut config = LpConfig::load_or_default(&cli.config)?;
    config.write = config.write.with_env_overrides(|key| std::env::var(key).ok())?;

    // Logs go to stderr so stdout stays clean line protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level().as_str())),
        )
        .with_target(config.logging.show_target)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Some(Commands::Convert {
            input,
            output,
            input_precision,
            precision,
            default_tags,
            skip_invalid,
        }) => {
            if let Some(p) = input_precision {
                config.input.precision = p;
            }
            if let Some(p) = precision {
                config.write.precision = p;
            }
            config.write.default_tags.extend(default_tags);
            config.input.skip_invalid |= skip_invalid;
            convert(&config, input.as_deref(), output.as_deref())
        }
        Some(Commands::Check {
            input,
            input_precision,
        }) => {
            if let Some(p) = input_precision {
                config.input.precision = p;
            }
            check(&config, input.as_deref())
        }
        None => bail!("no command given, see --help"),
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    let mut content = String::new();
    match path {
        Some(path) => {
            File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?
                .read_to_string(&mut content)?;
        }
        None => {
            io::stdin().read_to_string(&mut content)?;
        }
    }
    Ok(content)
}

fn convert(config: &LpConfig, input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let content = read_input(input)?;
    let (points, errors) = LineProtocolParser::parse_lines_ok(&content, config.input.precision);

    if !errors.is_empty() {
        for error in &errors {
            warn!("{}", error);
        }
        if !config.input.skip_invalid {
            bail!("{} invalid line(s), rerun with --skip-invalid to drop them", errors.len());
        }
    }

    let out: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let writer = PointWriter::new(TextSink::new(out), config.write.clone())?;
    let summary = writer.write(&points)?;
    writer.transport().flush()?;

    info!(
        written = summary.points_written,
        skipped = summary.points_skipped,
        invalid = errors.len(),
        precision = %config.write.precision.token(WriteApi::V3),
        "conversion complete"
    );
    Ok(())
}

fn check(config: &LpConfig, input: Option<&Path>) -> Result<()> {
    let content = read_input(input)?;
    let (points, errors) = LineProtocolParser::parse_lines_ok(&content, config.input.precision);

    for error in &errors {
        println!("{}", error);
    }
    info!(valid = points.len(), invalid = errors.len(), "check complete");

    if !errors.is_empty() {
        bail!("{} invalid line(s)", errors.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        assert_eq!(
            parse_tag("dc=eu-1").unwrap(),
            ("dc".to_string(), "eu-1".to_string())
        );
        assert_eq!(parse_tag("k=a=b").unwrap().1, "a=b");
        assert!(parse_tag("novalue").is_err());
        assert!(parse_tag("=x").is_err());
    }

    #[test]
    fn test_text_sink_writes_one_line_per_point() {
        let mut config = LpConfig::default();
        config.write.precision = WritePrecision::Second;
        config.write.batch_size = 1;

        let (points, errors) = LineProtocolParser::parse_lines_ok(
            "cpu,region=eu,host=a v=1 1700000000123456789\nmem free=2i\n",
            config.input.precision,
        );
        assert!(errors.is_empty());

        let writer = PointWriter::new(TextSink::new(Vec::new()), config.write.clone()).unwrap();
        let summary = writer.write(&points).unwrap();
        assert_eq!(summary.batches, 2);

        let out = writer.into_transport().out.into_inner();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "cpu,host=a,region=eu v=1.0 1700000000\nmem free=2i\n"
        );
    }

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "rusts-lp",
            "convert",
            "in.lp",
            "--precision",
            "ms",
            "--default-tag",
            "dc=eu-1",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Convert {
                precision,
                default_tags,
                ..
            }) => {
                assert_eq!(precision, Some(WritePrecision::Millisecond));
                assert_eq!(default_tags, vec![("dc".to_string(), "eu-1".to_string())]);
            }
            _ => panic!("expected convert command"),
        }
    }
}
