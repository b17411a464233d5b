//! Tolerant reader for per-game log files.
//!
//! Log files come in three encodings: a JSON array of records, a single JSON
//! object, or JSON Lines. The encodings are probed in that order and the first
//! one that matches wins. Malformed content never fails the load; it only
//! shrinks the result.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use serde_json::Value as JsonValue;

use crate::record::OutcomeMeta;

/// Encoding detected for a log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Array,
    Object,
    /// Newline-delimited objects; `skipped` counts lines that did not decode
    /// to an object.
    JsonLines { skipped: usize },
}

/// Outcome of a single encoding probe.
#[derive(Debug)]
pub enum ParseAttempt {
    /// Content had this encoding and decoded cleanly.
    Match(Vec<JsonValue>),
    /// Content is not in this encoding; try the next one.
    NoMatch,
    /// Content looked like this encoding but failed to decode.
    Malformed(serde_json::Error),
}

/// Decoded log content plus what was learned while decoding it.
#[derive(Debug)]
pub struct ParsedLog {
    pub format: LogFormat,
    /// Decoded values in file order. Array elements are passed through
    /// unfiltered, so entries may be non-objects.
    pub values: Vec<JsonValue>,
    /// Set when the content was bracket-shaped but not a valid array and the
    /// parser fell back to the remaining encodings.
    pub array_error: Option<serde_json::Error>,
}

/// Read `path` and decode it with [`parse_games`].
///
/// Only the read itself can fail; undecodable content yields fewer (or zero)
/// values.
pub fn load_games(path: &Path) -> Result<Vec<JsonValue>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parsed = parse_games(&raw);
    if let Some(err) = &parsed.array_error {
        warn!(
            "{} looks like a JSON array but failed to decode ({err}); fell back to {:?}",
            path.display(),
            parsed.format
        );
    }
    if let LogFormat::JsonLines { skipped } = parsed.format {
        if skipped > 0 {
            debug!(
                "{}: dropped {skipped} line(s) that were not JSON objects",
                path.display()
            );
        }
    }
    Ok(parsed.values)
}

/// Decode raw log text, trying array, single object, then JSON Lines.
pub fn parse_games(raw: &str) -> ParsedLog {
    let raw = raw.trim();

    let array_error = match parse_array(raw) {
        ParseAttempt::Match(values) => {
            return ParsedLog {
                format: LogFormat::Array,
                values,
                array_error: None,
            };
        }
        ParseAttempt::Malformed(err) => Some(err),
        ParseAttempt::NoMatch => None,
    };

    if let ParseAttempt::Match(values) = parse_object(raw) {
        return ParsedLog {
            format: LogFormat::Object,
            values,
            array_error,
        };
    }

    let (values, skipped) = parse_json_lines(raw);
    ParsedLog {
        format: LogFormat::JsonLines { skipped },
        values,
        array_error,
    }
}

/// Strictly read an outcome file: the whole content must be one JSON object.
///
/// Returns `Ok(None)` for content that does not decode or is not an object.
pub fn read_outcome_meta(path: &Path) -> Result<Option<OutcomeMeta>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    match serde_json::from_str::<JsonValue>(&raw) {
        Ok(value) => Ok(OutcomeMeta::from_json(&value)),
        Err(err) => {
            debug!("ignoring undecodable metadata {}: {err}", path.display());
            Ok(None)
        }
    }
}

fn parse_array(raw: &str) -> ParseAttempt {
    if !(raw.starts_with('[') && raw.ends_with(']')) {
        return ParseAttempt::NoMatch;
    }
    match serde_json::from_str::<JsonValue>(raw) {
        Ok(JsonValue::Array(values)) => ParseAttempt::Match(values),
        Ok(_) => ParseAttempt::NoMatch,
        Err(err) => ParseAttempt::Malformed(err),
    }
}

fn parse_object(raw: &str) -> ParseAttempt {
    match serde_json::from_str::<JsonValue>(raw) {
        Ok(value @ JsonValue::Object(_)) => ParseAttempt::Match(vec![value]),
        Ok(_) => ParseAttempt::NoMatch,
        Err(err) => ParseAttempt::Malformed(err),
    }
}

fn parse_json_lines(raw: &str) -> (Vec<JsonValue>, usize) {
    let mut values = Vec::new();
    let mut skipped = 0usize;
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<JsonValue>(line) {
            Ok(value @ JsonValue::Object(_)) => values.push(value),
            _ => skipped += 1,
        }
    }
    (values, skipped)
}
