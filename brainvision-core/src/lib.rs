//! BrainVision EEG reader.
//!
//! This crate reads recordings in the BrainVision exchange format, which
//! splits a recording across three files sharing a base name:
//!
//! - `.vhdr`: text header describing channels, sampling and binary layout
//! - `.vmrk`: text marker file listing events by sample position
//! - `.eeg`: raw little-endian, channel-interleaved sample payload
//!
//! # Example
//!
//! ```no_run
//! use brainvision_core::{read_dataset, query, ReadOptions};
//!
//! let dataset = read_dataset("recording.vhdr", &ReadOptions::default()).unwrap();
//!
//! println!("Fs = {} Hz", dataset.header.sampling_rate_hz);
//! println!("{} samples x {} channels", dataset.n_samples(), dataset.n_channels());
//!
//! for marker in query::filter_by_type(&dataset, "Stimulus") {
//!     let t = query::samples_to_time(marker.sample, dataset.header.sampling_rate_hz);
//!     println!("{} at {:.3}s", marker.value, t);
//! }
//! ```
//!
//! # Features
//!
//! - `INT_16`, `INT_32` and `IEEE_FLOAT_32` multiplexed binary data
//! - Per-channel resolution scaling to physical units
//! - Escaped commas (`\1`) in channel and marker labels
//! - Lenient parsing: malformed lines are skipped, not fatal
//! - Sample range and channel subset selection

pub mod dataset;
pub mod decoder;
pub mod error;
pub mod header;
pub mod markers;
pub mod parser;
pub mod query;
pub mod types;

// Re-export commonly used types
pub use dataset::{read_dataset, ReadOptions};
pub use decoder::decode_samples;
pub use error::{ReadError, Result};
pub use header::parse_header;
pub use markers::parse_markers;
pub use query::{filter_by_range, filter_by_type, samples_to_time, unique_types, MarkerSource};
pub use types::{BinaryFormat, Dataset, Header, Impedance, Marker, MarkerSet};
