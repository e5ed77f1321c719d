//! Timeline aggregation
//!
//! Maps the whole clip queue onto one proportional scrubber: each segment
//! gets a width proportional to its derived duration, the global playhead
//! combines completed-segment durations with the live clip-relative time,
//! and a click fraction resolves back to a (segment, offset) pair.

use crate::playlist::PlaylistQueue;

/// Result of resolving a click on the aggregate bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickSeek {
    /// Queue index of the segment the click lands in
    pub index: usize,
    /// Relative seek time within that segment, in seconds
    pub relative_secs: f64,
}

/// Proportional timeline over one clip queue
///
/// Durations are snapshotted at construction; rebuild the timeline when
/// the queue changes.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    durations: Vec<f64>,
    total_secs: f64,
}

impl Timeline {
    pub fn from_queue(queue: &PlaylistQueue) -> Self {
        let durations: Vec<f64> = queue.entries().iter().map(|e| e.duration_secs()).collect();
        let total_secs = durations.iter().sum();
        Self {
            durations,
            total_secs,
        }
    }

    pub fn total_secs(&self) -> f64 {
        self.total_secs
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Proportional width of each segment; a single-segment queue is 1.0
    pub fn segment_widths(&self) -> Vec<f64> {
        if self.total_secs <= 0.0 {
            return vec![0.0; self.durations.len()];
        }
        self.durations
            .iter()
            .map(|d| d / self.total_secs)
            .collect()
    }

    /// Global playhead fraction in [0, 1]
    ///
    /// Sum of completed-segment durations plus the in-progress relative
    /// time, over the total. Clamped so polled-time jitter can never push
    /// the playhead outside the bar.
    pub fn playhead_fraction(&self, current_index: usize, relative_secs: f64) -> f64 {
        if self.total_secs <= 0.0 {
            return 0.0;
        }
        let completed: f64 = self.durations.iter().take(current_index).sum();
        ((completed + relative_secs) / self.total_secs).clamp(0.0, 1.0)
    }

    /// Resolve a click fraction to a segment and relative seek time
    ///
    /// Walks the prefix sums until the click fraction falls inside a
    /// segment's span. A fraction at or past 1.0 resolves to the end of
    /// the last segment. Empty or zero-duration timelines yield None.
    pub fn seek_from_click(&self, fraction: f64) -> Option<ClickSeek> {
        if self.durations.is_empty() || self.total_secs <= 0.0 {
            return None;
        }

        let fraction = fraction.clamp(0.0, 1.0);
        let target_secs = fraction * self.total_secs;

        let mut elapsed = 0.0;
        for (index, duration) in self.durations.iter().enumerate() {
            if target_secs < elapsed + duration || index == self.durations.len() - 1 {
                return Some(ClickSeek {
                    index,
                    relative_secs: (target_secs - elapsed).clamp(0.0, *duration),
                });
            }
            elapsed += duration;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::PlaylistEntry;
    use reelmix_common::model::{Interview, Segment};
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn entry(range: &str) -> PlaylistEntry {
        let interview_id = Uuid::new_v4();
        PlaylistEntry {
            segment: Segment {
                id: Uuid::new_v4(),
                interview_id,
                topic: String::new(),
                summary_text: String::new(),
                timestamp_range: range.to_string(),
                keywords: BTreeSet::new(),
                thumbnail_url: String::new(),
            },
            interview: Interview {
                id: interview_id,
                display_name: String::new(),
                role: String::new(),
                source_ref: "src".to_string(),
                thumbnail_url: String::new(),
            },
        }
    }

    /// 30s + 40s + 20s = 90s queue
    fn ninety_second_timeline() -> Timeline {
        let queue = PlaylistQueue::new(vec![
            entry("00:10 - 00:40"),
            entry("01:00 - 01:40"),
            entry("02:00 - 02:20"),
        ]);
        Timeline::from_queue(&queue)
    }

    #[test]
    fn test_widths_are_proportional() {
        let timeline = ninety_second_timeline();
        let widths = timeline.segment_widths();
        assert_eq!(timeline.total_secs(), 90.0);
        assert!((widths[0] - 30.0 / 90.0).abs() < 1e-9);
        assert!((widths[1] - 40.0 / 90.0).abs() < 1e-9);
        assert!((widths[2] - 20.0 / 90.0).abs() < 1e-9);
        assert!((widths.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_segment_width_is_one() {
        let queue = PlaylistQueue::new(vec![entry("00:00 - 00:30")]);
        let timeline = Timeline::from_queue(&queue);
        assert_eq!(timeline.segment_widths(), vec![1.0]);
    }

    #[test]
    fn test_playhead_fraction_combines_completed_and_relative() {
        let timeline = ninety_second_timeline();
        // 10s into the second segment: (30 + 10) / 90
        let f = timeline.playhead_fraction(1, 10.0);
        assert!((f - 40.0 / 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_playhead_fraction_clamped() {
        let timeline = ninety_second_timeline();
        assert_eq!(timeline.playhead_fraction(2, 1000.0), 1.0);
        assert_eq!(timeline.playhead_fraction(0, -5.0), 0.0);
    }

    #[test]
    fn test_playhead_monotonic_while_playing() {
        let timeline = ninety_second_timeline();
        let mut last = 0.0;
        for tenths in 0..300 {
            let f = timeline.playhead_fraction(0, tenths as f64 / 10.0);
            assert!(f >= last);
            last = f;
        }
    }

    #[test]
    fn test_click_resolves_to_segment_and_offset() {
        let timeline = ninety_second_timeline();
        // 40/90 of the bar is 10s into the second segment
        let seek = timeline.seek_from_click(40.0 / 90.0).unwrap();
        assert_eq!(seek.index, 1);
        assert!((seek.relative_secs - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_click_seek_inverse_of_playhead() {
        let timeline = ninety_second_timeline();
        for (index, relative) in [(0usize, 12.5), (1, 0.0), (1, 39.9), (2, 7.0)] {
            let f = timeline.playhead_fraction(index, relative);
            let seek = timeline.seek_from_click(f).unwrap();
            let recomputed = timeline.playhead_fraction(seek.index, seek.relative_secs);
            assert!(
                (recomputed - f).abs() < 1e-6,
                "fraction {} round-tripped to {}",
                f,
                recomputed
            );
        }
    }

    #[test]
    fn test_click_at_one_lands_in_last_segment() {
        let timeline = ninety_second_timeline();
        let seek = timeline.seek_from_click(1.0).unwrap();
        assert_eq!(seek.index, 2);
        assert!((seek.relative_secs - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_timeline_has_no_click_target() {
        let timeline = Timeline::from_queue(&PlaylistQueue::default());
        assert!(timeline.seek_from_click(0.5).is_none());
        assert_eq!(timeline.playhead_fraction(0, 10.0), 0.0);
    }
}
