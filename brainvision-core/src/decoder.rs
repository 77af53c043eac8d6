//! Binary sample decoding.
//!
//! This module turns the raw `.eeg` payload into a matrix of physical
//! values. The payload is a flat little-endian array of channel-interleaved
//! values (sample 0: ch 0..N, sample 1: ch 0..N, ...), with its layout
//! described entirely by the header.

use crate::error::{require_file, ReadError, Result};
use crate::types::{BinaryFormat, Header};
use log::{debug, warn};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Orientation the decoder understands.
const MULTIPLEXED: &str = "MULTIPLEXED";

/// Decodes the data file described by `header`.
///
/// Returns a `sample_count x channel_count` matrix in which every cell is the
/// stored value multiplied by the channel's resolution.
pub fn decode_samples<P: AsRef<Path>>(path: P, header: &Header) -> Result<Array2<f64>> {
    let path = path.as_ref();
    require_file(path)?;

    let format = check_format(header)?;
    let n_channels = header.channel_count;
    let expected = n_channels
        .checked_mul(format.bytes_per_sample())
        .and_then(|frame| (frame as u64).checked_mul(header.sample_count as u64))
        .ok_or_else(|| {
            ReadError::UnsupportedFormat(format!(
                "{} channels x {} samples does not fit in memory",
                n_channels, header.sample_count
            ))
        })?;

    let file = File::open(path)?;
    let actual = file.metadata()?.len();
    if actual < expected {
        warn!(
            "{} holds {} bytes, header implies {}",
            path.display(),
            actual,
            expected
        );
        return Err(ReadError::Truncated { expected, actual });
    }

    let mut bytes = vec![0u8; expected as usize];
    BufReader::new(file).read_exact(&mut bytes)?;

    debug!(
        "Decoding {} samples x {} channels of {} from {}",
        header.sample_count,
        n_channels,
        format.code(),
        path.display()
    );
    Ok(decode_buffer(&bytes, format, n_channels, &header.resolutions))
}

/// Validates the header's data layout and resolves its binary format.
pub fn check_format(header: &Header) -> Result<BinaryFormat> {
    if !header.is_binary() {
        return Err(ReadError::UnsupportedFormat(format!(
            "data format {:?} (only BINARY is supported)",
            header.data_format
        )));
    }

    let orientation = header.data_orientation.trim();
    if !orientation.is_empty() && !orientation.eq_ignore_ascii_case(MULTIPLEXED) {
        return Err(ReadError::UnsupportedFormat(format!(
            "data orientation {:?} (only MULTIPLEXED is supported)",
            header.data_orientation
        )));
    }

    header.sample_format().ok_or_else(|| {
        ReadError::UnsupportedFormat(format!("binary format {:?}", header.binary_format))
    })
}

/// Decodes an in-memory interleaved payload.
///
/// Only whole samples are decoded; a trailing partial frame is ignored.
/// Channels without a declared resolution are scaled by 1.0.
pub fn decode_buffer(
    bytes: &[u8],
    format: BinaryFormat,
    n_channels: usize,
    resolutions: &[f64],
) -> Array2<f64> {
    decode_interleaved(
        bytes,
        n_channels,
        resolutions,
        format.bytes_per_sample(),
        format.converter(),
    )
}

/// Single decode routine shared by all formats.
fn decode_interleaved(
    bytes: &[u8],
    n_channels: usize,
    resolutions: &[f64],
    width: usize,
    convert: fn(&[u8]) -> f64,
) -> Array2<f64> {
    if n_channels == 0 {
        return Array2::zeros((0, 0));
    }

    // A frame wider than the address space cannot fit even once
    let n_samples = n_channels
        .checked_mul(width)
        .map_or(0, |frame| bytes.len() / frame);
    if n_samples == 0 {
        return Array2::zeros((0, n_channels));
    }
    let frame = n_channels * width;
    let scales: Vec<f64> = (0..n_channels)
        .map(|ch| resolutions.get(ch).copied().unwrap_or(1.0))
        .collect();

    let mut samples = Array2::zeros((n_samples, n_channels));
    for (mut row, frame_bytes) in samples.rows_mut().into_iter().zip(bytes.chunks_exact(frame)) {
        for ((cell, raw), scale) in row
            .iter_mut()
            .zip(frame_bytes.chunks_exact(width))
            .zip(&scales)
        {
            *cell = convert(raw) * scale;
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_header(format: &str, n_channels: usize, sample_count: usize) -> Header {
        Header {
            data_format: "BINARY".to_string(),
            data_orientation: "MULTIPLEXED".to_string(),
            binary_format: format.to_string(),
            channel_count: n_channels,
            resolutions: vec![1.0; n_channels],
            sample_count,
            ..Header::default()
        }
    }

    #[test]
    fn test_decode_int16_scaled() {
        // 3 samples x 2 channels, interleaved
        let raw: [i16; 6] = [1, -2, 3, -4, 5, -6];
        let bytes: Vec<u8> = raw.iter().flat_map(|v| v.to_le_bytes()).collect();

        let samples = decode_buffer(&bytes, BinaryFormat::Int16, 2, &[0.5, 10.0]);
        assert_eq!(samples.dim(), (3, 2));
        assert_eq!(samples[[0, 0]], 0.5);
        assert_eq!(samples[[0, 1]], -20.0);
        assert_eq!(samples[[1, 0]], 1.5);
        assert_eq!(samples[[1, 1]], -40.0);
        assert_eq!(samples[[2, 0]], 2.5);
        assert_eq!(samples[[2, 1]], -60.0);
    }

    #[test]
    fn test_decode_int32() {
        let raw: [i32; 4] = [100_000, -1, i32::MIN, i32::MAX];
        let bytes: Vec<u8> = raw.iter().flat_map(|v| v.to_le_bytes()).collect();

        let samples = decode_buffer(&bytes, BinaryFormat::Int32, 2, &[1.0, 1.0]);
        assert_eq!(samples.dim(), (2, 2));
        assert_eq!(samples[[0, 0]], 100_000.0);
        assert_eq!(samples[[0, 1]], -1.0);
        assert_eq!(samples[[1, 0]], i32::MIN as f64);
        assert_eq!(samples[[1, 1]], i32::MAX as f64);
    }

    #[test]
    fn test_decode_float32_missing_resolution() {
        let raw: [f32; 3] = [0.25, -1.5, 8.0];
        let bytes: Vec<u8> = raw.iter().flat_map(|v| v.to_le_bytes()).collect();

        let samples = decode_buffer(&bytes, BinaryFormat::IeeeFloat32, 3, &[2.0]);
        assert_eq!(samples.dim(), (1, 3));
        assert_eq!(samples.row(0).to_vec(), vec![0.5, -1.5, 8.0]);
    }

    #[test]
    fn test_decode_ignores_partial_frame() {
        let bytes = [1u8, 0, 2, 0, 3];
        let samples = decode_buffer(&bytes, BinaryFormat::Int16, 2, &[1.0, 1.0]);
        assert_eq!(samples.dim(), (1, 2));
    }

    #[test]
    fn test_check_format_rejects_ascii() {
        let mut header = binary_header("INT_16", 1, 0);
        header.data_format = "ASCII".to_string();
        assert!(matches!(
            check_format(&header),
            Err(ReadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_check_format_rejects_unknown_binary_format() {
        let header = binary_header("UINT_8", 1, 0);
        assert!(matches!(
            check_format(&header),
            Err(ReadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_check_format_rejects_vectorized() {
        let mut header = binary_header("INT_16", 1, 0);
        header.data_orientation = "VECTORIZED".to_string();
        assert!(matches!(
            check_format(&header),
            Err(ReadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_check_format_case_insensitive() {
        let mut header = binary_header("ieee_float_32", 1, 0);
        header.data_format = "binary".to_string();
        assert_eq!(check_format(&header).unwrap(), BinaryFormat::IeeeFloat32);
    }

    #[test]
    fn test_decode_samples_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.eeg");
        std::fs::write(&path, [0u8; 6]).unwrap();

        let header = binary_header("INT_16", 2, 4);
        match decode_samples(&path, &header) {
            Err(ReadError::Truncated { expected, actual }) => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 6);
            }
            other => panic!("expected truncation error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_huge_channel_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.eeg");
        std::fs::write(&path, [0u8; 16]).unwrap();

        let header = binary_header("INT_32", 0, 1);
        let header = Header {
            channel_count: 1usize << 62,
            resolutions: Vec::new(),
            ..header
        };
        assert!(matches!(
            decode_samples(&path, &header),
            Err(ReadError::UnsupportedFormat(_))
        ));

        let samples = decode_buffer(&[0u8; 16], BinaryFormat::Int32, 1usize << 62, &[]);
        assert_eq!(samples.nrows(), 0);
    }

    #[test]
    fn test_decode_samples_missing_file() {
        let header = binary_header("INT_16", 2, 4);
        assert!(matches!(
            decode_samples("/nonexistent/data.eeg", &header),
            Err(ReadError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_decode_samples_reads_declared_samples_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.eeg");
        let raw: [i16; 6] = [1, 2, 3, 4, 5, 6];
        let bytes: Vec<u8> = raw.iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(&path, bytes).unwrap();

        let header = binary_header("INT_16", 2, 2);
        let samples = decode_samples(&path, &header).unwrap();
        assert_eq!(samples.dim(), (2, 2));
        assert_eq!(samples[[1, 1]], 4.0);
    }
}
