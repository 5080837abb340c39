//! Gap compaction for tracks whose recordings may run short.
//!
//! Pulls every segment of a room-session list back to the end of its
//! predecessor, lets pre-recorded segments with unplayed asset time grow into
//! the freed gap and hands any trailing residual to the last segment.

use chrono::{DateTime, FixedOffset, TimeDelta};
use tracing::debug;

use crate::model::{ScheduledSegment, sort_segments};

/// What one compaction pass changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionReport {
    /// Segments whose start moved
    pub moved: usize,
    /// Gap time absorbed by pre-recorded slack
    pub absorbed: TimeDelta,
    /// Residual added to the last segment
    pub trailing: TimeDelta,
}

impl Default for CompactionReport {
    fn default() -> Self {
        Self {
            moved: 0,
            absorbed: TimeDelta::zero(),
            trailing: TimeDelta::zero(),
        }
    }
}

impl CompactionReport {
    /// True when the pass left the segments untouched.
    pub fn is_noop(&self) -> bool {
        self.moved == 0 && self.absorbed.is_zero() && self.trailing.is_zero()
    }
}

/// Single-pass compactor over one room's segments of one session.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaylistCompactor {
    window_end: Option<DateTime<FixedOffset>>,
}

impl PlaylistCompactor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session end the last segment is stretched to.
    pub fn with_window_end(mut self, window_end: DateTime<FixedOffset>) -> Self {
        self.window_end = Some(window_end);
        self
    }

    /// Compacts `segments` in place.
    ///
    /// Segments are sorted by their stable key first. Re-running on
    /// compacted output changes nothing.
    pub fn compact(&self, segments: &mut [ScheduledSegment]) -> CompactionReport {
        let mut report = CompactionReport::default();
        sort_segments(segments);

        let Some((first, rest)) = segments.split_first_mut() else {
            return report;
        };
        let mut now = first.end();

        for segment in rest {
            let gap = segment.start - now;
            if segment.start != now {
                segment.start = now;
                report.moved += 1;
            }
            report.absorbed += segment.offer(gap);
            now = segment.end();
        }

        if let Some(window_end) = self.window_end
            && window_end > now
            && let Some(last) = segments.last_mut()
        {
            let residual = window_end - now;
            last.duration += residual;
            report.trailing = residual;
        }

        if !report.is_noop() {
            debug!(
                moved = report.moved,
                absorbed_ms = report.absorbed.num_milliseconds(),
                trailing_ms = report.trailing.num_milliseconds(),
                "Compacted {} segments",
                segments.len()
            );
        }
        report
    }
}
