//! Marker queries and sample/time conversion.

use crate::types::{Dataset, Marker, MarkerSet};

/// Anything that holds an ordered marker list.
pub trait MarkerSource {
    fn markers(&self) -> &[Marker];
}

impl MarkerSource for [Marker] {
    fn markers(&self) -> &[Marker] {
        self
    }
}

impl MarkerSource for Vec<Marker> {
    fn markers(&self) -> &[Marker] {
        self
    }
}

impl MarkerSource for MarkerSet {
    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

impl MarkerSource for Dataset {
    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

/// Markers whose type equals `marker_type`, in file order.
pub fn filter_by_type<S: MarkerSource + ?Sized>(source: &S, marker_type: &str) -> Vec<Marker> {
    source
        .markers()
        .iter()
        .filter(|m| m.marker_type == marker_type)
        .cloned()
        .collect()
}

/// Markers with `start <= sample <= end`, in file order.
pub fn filter_by_range<S: MarkerSource + ?Sized>(source: &S, start: i64, end: i64) -> Vec<Marker> {
    source
        .markers()
        .iter()
        .filter(|m| (start..=end).contains(&m.sample))
        .cloned()
        .collect()
}

/// Distinct marker types in order of first occurrence.
pub fn unique_types<S: MarkerSource + ?Sized>(source: &S) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for marker in source.markers() {
        if !types.contains(&marker.marker_type) {
            types.push(marker.marker_type.clone());
        }
    }
    types
}

/// Converts a sample position to seconds.
///
/// No validation: a zero rate yields an infinity, a negative one flips
/// the sign.
#[inline]
pub fn samples_to_time(sample: i64, sampling_rate_hz: f64) -> f64 {
    sample as f64 / sampling_rate_hz
}

/// Converts a sequence of sample positions to seconds.
pub fn samples_to_times(samples: &[i64], sampling_rate_hz: f64) -> Vec<f64> {
    samples
        .iter()
        .map(|&s| samples_to_time(s, sampling_rate_hz))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers_at(samples: &[i64]) -> Vec<Marker> {
        samples
            .iter()
            .enumerate()
            .map(|(i, &s)| Marker::new("Stimulus", format!("S {}", i + 1), s, 1))
            .collect()
    }

    #[test]
    fn test_filter_by_range_inclusive() {
        let markers = markers_at(&[100, 200, 300, 400, 500]);
        let hits = filter_by_range(&markers, 200, 300);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].sample, 200);
        assert_eq!(hits[1].sample, 300);
    }

    #[test]
    fn test_filter_by_range_keeps_file_order() {
        let markers = markers_at(&[300, 100, 200]);
        let hits = filter_by_range(markers.as_slice(), 100, 300);
        let samples: Vec<i64> = hits.iter().map(|m| m.sample).collect();
        assert_eq!(samples, vec![300, 100, 200]);
    }

    #[test]
    fn test_filter_by_type_and_unique_types() {
        let markers = vec![
            Marker::new("Stimulus", "S  1", 10, 1),
            Marker::new("Stimulus", "S  2", 20, 1),
            Marker::new("Response", "R  1", 30, 1),
            Marker::new("New Segment", "", 40, 1),
            Marker::new("Response", "R  2", 50, 1),
        ];

        let responses = filter_by_type(&markers, "Response");
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].value, "R  1");
        assert_eq!(responses[1].value, "R  2");
        assert!(filter_by_type(&markers, "Comment").is_empty());

        assert_eq!(
            unique_types(&markers),
            vec!["Stimulus", "Response", "New Segment"]
        );
    }

    #[test]
    fn test_samples_to_time() {
        assert_eq!(samples_to_time(1000, 1000.0), 1.0);
        assert_eq!(samples_to_time(-100, 1000.0), -0.1);
        assert!(samples_to_time(100, 0.0).is_infinite());
        assert_eq!(samples_to_time(100, -100.0), -1.0);
        assert_eq!(samples_to_times(&[0, 500, 1000], 500.0), vec![0.0, 1.0, 2.0]);
    }
}
