//! Dataset assembly from the three BrainVision files.

use crate::decoder;
use crate::error::{require_file, ReadError, Result};
use crate::header;
use crate::markers;
use crate::types::Dataset;
use log::info;
use ndarray::{s, Array2, Axis};
use std::path::{Path, PathBuf};

/// Extensions that make up a BrainVision recording.
pub const HEADER_EXT: &str = "vhdr";
pub const MARKER_EXT: &str = "vmrk";
pub const DATA_EXT: &str = "eeg";

/// Selection applied to the decoded samples.
///
/// The default reads every sample of every channel. Selections are applied
/// after the full payload is decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// First sample row to keep (0-based)
    pub start_sample: Option<usize>,
    /// One past the last sample row to keep; clamped to the recording length
    pub end_sample: Option<usize>,
    /// Channel columns to keep, in the given order
    pub channels: Option<Vec<usize>>,
}

impl ReadOptions {
    /// Creates options that read the whole recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first sample row to keep.
    pub fn start_sample(mut self, start: usize) -> Self {
        self.start_sample = Some(start);
        self
    }

    /// Sets the exclusive end sample row.
    pub fn end_sample(mut self, end: usize) -> Self {
        self.end_sample = Some(end);
        self
    }

    /// Keeps only the given channel columns.
    pub fn channels(mut self, channels: impl Into<Vec<usize>>) -> Self {
        self.channels = Some(channels.into());
        self
    }

    /// Returns true if the options keep the full matrix.
    pub fn is_full(&self) -> bool {
        self.start_sample.is_none() && self.end_sample.is_none() && self.channels.is_none()
    }

    /// Header channel indices kept by the selection, in column order.
    pub fn selected_channels(&self, n_channels: usize) -> Vec<usize> {
        match &self.channels {
            Some(channels) => channels.clone(),
            None => (0..n_channels).collect(),
        }
    }

    /// Applies the selection to a decoded `samples x channels` matrix.
    pub fn apply(&self, samples: Array2<f64>) -> Result<Array2<f64>> {
        if self.is_full() {
            return Ok(samples);
        }

        let (n_samples, n_channels) = samples.dim();
        let start = self.start_sample.unwrap_or(0);
        let end = self.end_sample.unwrap_or(n_samples).min(n_samples);
        if start > end {
            return Err(ReadError::InvalidSelection(format!(
                "start sample {} is past end sample {}",
                start, end
            )));
        }

        let rows = samples.slice(s![start..end, ..]);
        let selected = match &self.channels {
            Some(channels) => {
                if let Some(&bad) = channels.iter().find(|&&ch| ch >= n_channels) {
                    return Err(ReadError::InvalidSelection(format!(
                        "channel index {} out of range for {} channels",
                        bad, n_channels
                    )));
                }
                rows.select(Axis(1), channels)
            }
            None => rows.to_owned(),
        };
        Ok(selected)
    }
}

/// Strips a recognized BrainVision extension from `path`.
pub fn base_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let known = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| [HEADER_EXT, MARKER_EXT, DATA_EXT].contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    if known {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}

/// Appends `.ext` to `base` without touching dots already in the name.
fn sibling(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Reads a complete recording.
///
/// `path` is the recording's base path, with or without one of the
/// `.vhdr`/`.vmrk`/`.eeg` extensions. All three files must exist next to
/// each other under the same base name.
pub fn read_dataset<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Dataset> {
    let base = base_path(path);
    let header_path = sibling(&base, HEADER_EXT);
    let marker_path = sibling(&base, MARKER_EXT);
    let data_path = sibling(&base, DATA_EXT);

    for required in [&header_path, &marker_path, &data_path] {
        require_file(required)?;
    }

    let header = header::parse_header(&header_path)?;
    let marker_set = markers::parse_markers(&marker_path)?;
    let samples = decoder::decode_samples(&data_path, &header)?;
    let channels = options.selected_channels(samples.ncols());
    let samples = options.apply(samples)?;

    info!(
        "Loaded {}: {} samples x {} channels, {} markers",
        base.display(),
        samples.nrows(),
        samples.ncols(),
        marker_set.count()
    );

    Ok(Dataset {
        source_path: base,
        header,
        samples,
        channels,
        markers: marker_set.markers,
    })
}
