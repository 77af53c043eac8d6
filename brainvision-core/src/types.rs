//! Core types for BrainVision recordings.
//!
//! This module defines the header metadata, marker records and the assembled
//! dataset produced by the readers, plus the binary sample formats the
//! decoder understands.

use byteorder::{ByteOrder, LittleEndian};
use ndarray::{Array2, ArrayView1, Axis};
use std::path::PathBuf;

/// Unit assigned to channels that do not declare one.
pub const DEFAULT_UNIT: &str = "uV";

/// A single event from the marker file.
///
/// Markers tie stimuli, responses and segment boundaries to a position in
/// the sample stream. `sample` is 1-based, as written in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Marker type, e.g. `Stimulus`, `Response`, `New Segment`
    pub marker_type: String,
    /// Description/value, e.g. `S  1`
    pub value: String,
    /// Position in data points (1-based)
    pub sample: i64,
    /// Length in data points
    pub duration: i64,
    /// 20-digit `YYYYMMDDhhmmssuuuuuu` timestamp, when present
    pub timestamp: Option<String>,
}

impl Marker {
    /// Creates a marker without a timestamp.
    pub fn new(
        marker_type: impl Into<String>,
        value: impl Into<String>,
        sample: i64,
        duration: i64,
    ) -> Self {
        Self {
            marker_type: marker_type.into(),
            value: value.into(),
            sample,
            duration,
            timestamp: None,
        }
    }
}

/// Impedance values recorded in the header.
///
/// Only per-channel values are read from the file; `ground` keeps its
/// default and the reference vectors stay empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Impedance {
    /// Per-channel impedance in kOhm, in file order
    pub channels: Vec<f64>,
    pub reference: Vec<f64>,
    pub ground: f64,
    pub reference_channel: Vec<f64>,
}

impl Impedance {
    /// Creates an impedance record from channel values.
    pub fn from_channels(channels: Vec<f64>) -> Self {
        Self {
            channels,
            reference: Vec::new(),
            ground: 1.0,
            reference_channel: Vec::new(),
        }
    }
}

/// Header metadata parsed from a `.vhdr` file.
///
/// `labels`, `references`, `resolutions` and `units` always have the same
/// length: one entry per `Ch<n>=` line, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub data_file: String,
    pub marker_file: String,
    /// `BINARY` is the only format the decoder accepts
    pub data_format: String,
    /// `MULTIPLEXED` is the only orientation the decoder accepts
    pub data_orientation: String,
    /// One of `INT_16`, `INT_32`, `IEEE_FLOAT_32`
    pub binary_format: String,
    /// Text encoding declared by the file (`UTF-8`, `ANSI`), if any
    pub codepage: Option<String>,
    /// Declared `NumberOfChannels`
    pub channel_count: usize,
    /// Sampling interval in microseconds
    pub sampling_interval_us: f64,
    /// Derived sampling rate in Hz (0 when the interval is unknown)
    pub sampling_rate_hz: f64,
    pub labels: Vec<String>,
    pub references: Vec<String>,
    /// Per-channel scale factor from stored value to physical unit
    pub resolutions: Vec<f64>,
    pub units: Vec<String>,
    /// Number of samples in the data file, derived from its size
    pub sample_count: usize,
    pub trial_count: usize,
    pub pre_trigger_samples: usize,
    pub impedance: Option<Impedance>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            data_file: String::new(),
            marker_file: String::new(),
            data_format: String::new(),
            data_orientation: String::new(),
            binary_format: String::new(),
            codepage: None,
            channel_count: 0,
            sampling_interval_us: 0.0,
            sampling_rate_hz: 0.0,
            labels: Vec::new(),
            references: Vec::new(),
            resolutions: Vec::new(),
            units: Vec::new(),
            sample_count: 0,
            trial_count: 1,
            pre_trigger_samples: 0,
            impedance: None,
        }
    }
}

impl Header {
    /// Returns the index of the channel with the given label.
    pub fn channel_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Recording length in seconds, or 0 when the sampling rate is unknown.
    pub fn duration_secs(&self) -> f64 {
        if self.sampling_rate_hz <= 0.0 {
            return 0.0;
        }
        self.sample_count as f64 / self.sampling_rate_hz
    }

    /// Returns true if the data format is `BINARY`.
    pub fn is_binary(&self) -> bool {
        self.data_format.eq_ignore_ascii_case("BINARY")
    }

    /// Resolves the declared binary sample format.
    pub fn sample_format(&self) -> Option<BinaryFormat> {
        BinaryFormat::from_code(&self.binary_format)
    }
}

/// Binary sample encodings found in `.eeg` files.
///
/// All are little-endian and stored channel-interleaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFormat {
    /// Signed 16-bit integer (`INT_16`)
    Int16,
    /// Signed 32-bit integer (`INT_32`)
    Int32,
    /// IEEE-754 single precision (`IEEE_FLOAT_32`)
    IeeeFloat32,
}

/// Header codes for each binary format.
const BINARY_FORMATS: [(&str, BinaryFormat); 3] = [
    ("INT_16", BinaryFormat::Int16),
    ("INT_32", BinaryFormat::Int32),
    ("IEEE_FLOAT_32", BinaryFormat::IeeeFloat32),
];

impl BinaryFormat {
    /// Looks up a format from its header code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        BINARY_FORMATS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(code))
            .map(|&(_, format)| format)
    }

    /// Header code of this format.
    pub fn code(self) -> &'static str {
        match self {
            Self::Int16 => "INT_16",
            Self::Int32 => "INT_32",
            Self::IeeeFloat32 => "IEEE_FLOAT_32",
        }
    }

    /// Number of bytes per stored value.
    #[inline]
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::Int16 => 2,
            Self::Int32 | Self::IeeeFloat32 => 4,
        }
    }

    /// Conversion from one stored little-endian value to `f64`.
    #[inline]
    pub fn converter(self) -> fn(&[u8]) -> f64 {
        match self {
            Self::Int16 => read_int16,
            Self::Int32 => read_int32,
            Self::IeeeFloat32 => read_float32,
        }
    }
}

fn read_int16(bytes: &[u8]) -> f64 {
    LittleEndian::read_i16(bytes) as f64
}

fn read_int32(bytes: &[u8]) -> f64 {
    LittleEndian::read_i32(bytes) as f64
}

fn read_float32(bytes: &[u8]) -> f64 {
    LittleEndian::read_f32(bytes) as f64
}

/// Result of parsing a `.vmrk` file.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSet {
    /// File name of the parsed marker file
    pub filename: String,
    /// `DataFile=` entry of the marker file, if any
    pub data_file: Option<String>,
    /// Markers in file order
    pub markers: Vec<Marker>,
}

impl MarkerSet {
    /// Number of parsed markers.
    pub fn count(&self) -> usize {
        self.markers.len()
    }
}

/// A fully loaded BrainVision recording.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Base path without extension
    pub source_path: PathBuf,
    pub header: Header,
    /// Scaled samples, rows = samples, columns = channels
    pub samples: Array2<f64>,
    /// Header channel index of each column of `samples`
    pub channels: Vec<usize>,
    /// Markers in file order
    pub markers: Vec<Marker>,
}

impl Dataset {
    /// Number of sample rows held in memory.
    pub fn n_samples(&self) -> usize {
        self.samples.nrows()
    }

    /// Number of channel columns held in memory.
    pub fn n_channels(&self) -> usize {
        self.samples.ncols()
    }

    /// Returns the scaled signal of the channel with the given label.
    ///
    /// Returns `None` if the label is unknown or was left out of the read.
    pub fn channel(&self, label: &str) -> Option<ArrayView1<'_, f64>> {
        let index = self.header.channel_index(label)?;
        let column = self.channels.iter().position(|&ch| ch == index)?;
        (column < self.n_channels()).then(|| self.samples.index_axis(Axis(1), column))
    }
}
