//! `.vmrk` marker parsing.

use crate::error::{require_file, Result};
use crate::parser::{self, LineKind};
use crate::types::{Marker, MarkerSet};
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Prefix of marker entry keys (`Mk1`, `Mk2`, ...).
const MARKER_KEY_PREFIX: &str = "Mk";

/// Length of the `YYYYMMDDhhmmssuuuuuu` timestamp.
const TIMESTAMP_LEN: usize = 20;

/// Parses a `.vmrk` file.
///
/// Malformed marker lines are skipped; the returned set keeps file order.
pub fn parse_markers<P: AsRef<Path>>(path: P) -> Result<MarkerSet> {
    let path = path.as_ref();
    require_file(path)?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let reader = BufReader::new(File::open(path)?);
    let mut set = empty_set(filename);
    parser::for_each_line(reader, |line| feed_line(&mut set, line))?;

    debug!("Parsed {} markers from {}", set.count(), path.display());
    Ok(set)
}

/// Parses marker text already held in memory.
pub fn parse_markers_str(text: &str, filename: &str) -> MarkerSet {
    let mut set = empty_set(filename.to_string());
    for line in text.lines() {
        feed_line(&mut set, line);
    }
    set
}

fn empty_set(filename: String) -> MarkerSet {
    MarkerSet {
        filename,
        data_file: None,
        markers: Vec::new(),
    }
}

fn feed_line(set: &mut MarkerSet, line: &str) {
    let LineKind::Content(content) = parser::classify_line(line) else {
        return;
    };

    if content.starts_with(MARKER_KEY_PREFIX) {
        if let Some(marker) = parse_marker_line(content) {
            set.markers.push(marker);
        }
    } else if let Some(("DataFile", value)) = parser::split_key_value(content) {
        set.data_file = Some(value.to_string());
    }
}

/// Parses `Mk<n>=<type>,<value>,<sample>,<duration>[,<date>[,<timestamp>]]`.
///
/// Returns `None` for lines that do not hold a complete marker.
pub fn parse_marker_line(line: &str) -> Option<Marker> {
    let Some((_, value)) = parser::split_key_value(line) else {
        debug!("Skipping marker line without '=': {:?}", line);
        return None;
    };

    let tokens = parser::tokenize(value, ',');
    if tokens.len() < 4 {
        debug!("Skipping marker line with {} fields: {:?}", tokens.len(), line);
        return None;
    }

    let (Ok(sample), Ok(duration)) = (tokens[2].parse::<i64>(), tokens[3].parse::<i64>()) else {
        debug!("Skipping marker line with bad position: {:?}", line);
        return None;
    };

    let timestamp = tokens
        .get(5)
        .filter(|ts| is_timestamp(ts))
        .cloned();

    Some(Marker {
        marker_type: tokens[0].clone(),
        value: tokens[1].clone(),
        sample,
        duration,
        timestamp,
    })
}

/// A timestamp is exactly 20 ASCII digits.
#[inline]
fn is_timestamp(token: &str) -> bool {
    token.len() == TIMESTAMP_LEN && token.bytes().all(|b| b.is_ascii_digit())
}
