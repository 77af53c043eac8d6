//! `.vhdr` header parsing.
//!
//! The header is read line by line into a [`HeaderBuilder`], which is
//! finalized into an immutable [`Header`] once the whole file is consumed.
//! Bad values never abort the parse: they fall back to defaults or are
//! skipped.

use crate::error::{require_file, Result};
use crate::parser::{self, LineKind};
use crate::types::{BinaryFormat, Header, Impedance, DEFAULT_UNIT};
use log::{debug, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Text that opens the impedance block.
const IMPEDANCE_MARKER: &str = "Impedance [kOhm]";

/// Prefix of channel declaration keys (`Ch1`, `Ch2`, ...).
const CHANNEL_KEY_PREFIX: &str = "Ch";

/// Parses a `.vhdr` file.
///
/// The data file named by `DataFile=` is resolved relative to the header's
/// directory and used to derive [`Header::sample_count`].
pub fn parse_header<P: AsRef<Path>>(path: P) -> Result<Header> {
    let path = path.as_ref();
    require_file(path)?;

    let reader = BufReader::new(File::open(path)?);
    let mut builder = HeaderBuilder::new();
    parser::for_each_line(reader, |line| builder.feed_line(line))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let header = builder.finish(base_dir);
    debug!(
        "Parsed header {}: {} channels, {} samples at {} Hz",
        path.display(),
        header.channel_count,
        header.sample_count,
        header.sampling_rate_hz
    );
    Ok(header)
}

/// Parses header text already held in memory.
///
/// `base_dir` is the directory the `DataFile=` entry is resolved against.
pub fn parse_header_str(text: &str, base_dir: &Path) -> Header {
    let mut builder = HeaderBuilder::new();
    for line in text.lines() {
        builder.feed_line(line);
    }
    builder.finish(base_dir)
}

/// Mutable accumulator for header fields.
#[derive(Debug, Default)]
pub struct HeaderBuilder {
    header: Header,
    impedances: Vec<f64>,
    in_impedance: bool,
}

impl HeaderBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one line of header text.
    pub fn feed_line(&mut self, line: &str) {
        let kind = parser::classify_line(line);

        if self.in_impedance {
            match kind {
                LineKind::Blank | LineKind::Section(_) => self.in_impedance = false,
                LineKind::Comment => {}
                LineKind::Content(content) => self.parse_impedance_line(content),
            }
            return;
        }

        let LineKind::Content(content) = kind else {
            return;
        };

        if content.contains(IMPEDANCE_MARKER) {
            self.in_impedance = true;
            return;
        }

        if let Some((key, value)) = parser::split_key_value(content) {
            self.parse_key_value(key, value);
        }
    }

    /// Handles a single `key=value` entry.
    fn parse_key_value(&mut self, key: &str, value: &str) {
        if key.starts_with(CHANNEL_KEY_PREFIX) {
            self.parse_channel_info(value);
            return;
        }

        let header = &mut self.header;
        match key {
            "DataFile" => header.data_file = value.to_string(),
            "MarkerFile" => header.marker_file = value.to_string(),
            "DataFormat" => header.data_format = value.to_string(),
            "DataOrientation" => header.data_orientation = value.to_string(),
            "BinaryFormat" => header.binary_format = value.to_string(),
            "Codepage" => header.codepage = Some(value.to_string()),
            "NumberOfChannels" => match value.parse() {
                Ok(n) => header.channel_count = n,
                Err(_) => warn!("Ignoring unparsable NumberOfChannels: {:?}", value),
            },
            "SamplingInterval" => match value.parse() {
                Ok(interval) => header.sampling_interval_us = interval,
                Err(_) => warn!("Ignoring unparsable SamplingInterval: {:?}", value),
            },
            _ => {}
        }
    }

    /// Parses `<label>,<reference>,<resolution>,<unit>`.
    ///
    /// Appends exactly one entry to each per-channel vector.
    fn parse_channel_info(&mut self, value: &str) {
        let tokens = parser::tokenize(value, ',');

        let label = tokens.first().cloned().unwrap_or_default();
        let reference = parser::token_at(&tokens, 1).unwrap_or_default().to_string();
        let resolution = parser::token_at(&tokens, 2)
            .and_then(|r| r.parse::<f64>().ok())
            .unwrap_or(1.0);
        let unit = parser::token_at(&tokens, 3)
            .map(normalize_unit)
            .unwrap_or(DEFAULT_UNIT)
            .to_string();

        let header = &mut self.header;
        header.labels.push(label);
        header.references.push(reference);
        header.resolutions.push(resolution);
        header.units.push(unit);
    }

    /// Parses `<name>: <kOhm>` inside the impedance block.
    fn parse_impedance_line(&mut self, content: &str) {
        let value = content
            .split_once(':')
            .and_then(|(_, value)| value.trim().parse::<f64>().ok());

        match value {
            Some(v) => self.impedances.push(v),
            None => debug!("Skipping impedance line: {:?}", content),
        }
    }

    /// Derives computed fields and returns the finished header.
    pub fn finish(self, base_dir: &Path) -> Header {
        let mut header = self.header;

        if header.sampling_interval_us > 0.0 {
            header.sampling_rate_hz = 1_000_000.0 / header.sampling_interval_us;
        }

        header.sample_count = derive_sample_count(&header, base_dir);

        if !self.impedances.is_empty() {
            header.impedance = Some(Impedance::from_channels(self.impedances));
        }

        header
    }
}

/// Maps the micro-sign spellings of microvolt to `uV`.
fn normalize_unit(unit: &str) -> &str {
    match unit {
        // U+00B5 MICRO SIGN, U+03BC GREEK SMALL LETTER MU, and a Latin-1
        // micro sign that was decoded lossily
        "\u{b5}V" | "\u{3bc}V" | "\u{fffd}V" => DEFAULT_UNIT,
        other => other,
    }
}

/// Number of complete samples in the data file, or 0 when it cannot be known.
fn derive_sample_count(header: &Header, base_dir: &Path) -> usize {
    if header.data_file.is_empty() || header.channel_count == 0 || !header.is_binary() {
        return 0;
    }
    let Some(format) = BinaryFormat::from_code(&header.binary_format) else {
        return 0;
    };

    let Some(frame) = header.channel_count.checked_mul(format.bytes_per_sample()) else {
        warn!(
            "NumberOfChannels={} is too large to size a sample frame",
            header.channel_count
        );
        return 0;
    };

    let data_path = base_dir.join(&header.data_file);
    match std::fs::metadata(&data_path) {
        Ok(meta) => (meta.len() / frame as u64) as usize,
        Err(_) => 0,
    }
}
