//! Timestamp range parsing and clip duration derivation
//!
//! The store persists clip boundaries as loosely-validated strings like
//! `"02:15 - 04:40"` or `"1:02:15 - 1:04:40"`. Clip duration is always
//! derived from the parsed range, never stored. Malformed, single-sided,
//! or inverted ranges fall back to a default duration rather than erroring,
//! so a bad record can never produce a negative duration or kill a playlist.

use tracing::warn;

/// Fallback clip length in seconds when a timestamp range is unusable
pub const DEFAULT_CLIP_SECS: f64 = 300.0;

/// Parsed clip boundaries in seconds from the start of the source video
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampRange {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl TimestampRange {
    /// Clip length in seconds. Non-negative by construction.
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Parse a single clock time: `MM:SS` or `HH:MM:SS`
///
/// Components must be non-negative integers. Returns None on anything else.
fn parse_clock_time(raw: &str) -> Option<f64> {
    let parts: Vec<&str> = raw.trim().split(':').collect();

    let as_secs = |parts: &[&str], weights: &[f64]| -> Option<f64> {
        let mut total = 0.0;
        for (part, weight) in parts.iter().zip(weights) {
            let value: u64 = part.trim().parse().ok()?;
            total += value as f64 * weight;
        }
        Some(total)
    };

    match parts.len() {
        2 => as_secs(&parts, &[60.0, 1.0]),
        3 => as_secs(&parts, &[3600.0, 60.0, 1.0]),
        _ => None,
    }
}

/// Parse a raw timestamp range string into clip boundaries
///
/// The start time must parse; otherwise the whole range is unusable and
/// None is returned. A missing, malformed, or inverted end time is
/// tolerated by defaulting the end to `start + DEFAULT_CLIP_SECS`.
pub fn parse_timestamp_range(raw: &str) -> Option<TimestampRange> {
    let mut sides = raw.splitn(2, '-');
    let start_secs = parse_clock_time(sides.next()?)?;

    let end_secs = match sides.next().and_then(parse_clock_time) {
        Some(end) if end > start_secs => end,
        _ => start_secs + DEFAULT_CLIP_SECS,
    };

    Some(TimestampRange {
        start_secs,
        end_secs,
    })
}

/// Derived clip duration in seconds for a raw timestamp range
///
/// Invariant: the result is always >= 0. Unusable input yields exactly
/// `DEFAULT_CLIP_SECS`.
pub fn clip_duration_secs(raw: &str) -> f64 {
    match parse_timestamp_range(raw) {
        Some(range) => range.duration_secs(),
        None => {
            warn!("Unparsable timestamp range {:?}, using default duration", raw);
            DEFAULT_CLIP_SECS
        }
    }
}

/// Format seconds as a short clock time for logs and status output
///
/// `M:SS` below one hour, `H:MM:SS` above.
pub fn format_clip_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}
