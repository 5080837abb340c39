//! Global mirroring window.

use chrono::NaiveTime;

use crate::error::ConfigurationError;
use crate::model::Timeslot;

/// Time-of-day interval `[main_start, main_end)` of the main broadcast.
///
/// Slots starting before `main_start` or ending after `main_end` (in their
/// own local time) are rebroadcasts for other timezones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorWindow {
    main_start: NaiveTime,
    main_end: NaiveTime,
}

impl MirrorWindow {
    /// # Errors
    ///
    /// - `ConfigurationError::InvalidMirrorWindow` - Window is empty or inverted
    pub fn new(main_start: NaiveTime, main_end: NaiveTime) -> Result<Self, ConfigurationError> {
        if main_end <= main_start {
            return Err(ConfigurationError::InvalidMirrorWindow {
                reason: format!("main window {main_start}-{main_end} ends before it starts"),
            });
        }
        Ok(Self {
            main_start,
            main_end,
        })
    }

    pub fn main_start(&self) -> NaiveTime {
        self.main_start
    }

    pub fn main_end(&self) -> NaiveTime {
        self.main_end
    }

    /// True when the slot lies (partly) outside the main window.
    pub fn is_outside(&self, timeslot: &Timeslot) -> bool {
        let start = timeslot.start.time();
        let end = timeslot.end.time();
        // A slot crossing midnight ends "before" it starts in local time.
        start < self.main_start || end > self.main_end || end < start
    }

    /// Resolved mirror status: the explicit flag or a slot outside the window.
    pub fn is_mirror(window: Option<&Self>, timeslot: &Timeslot) -> bool {
        timeslot.mirror || window.is_some_and(|window| window.is_outside(timeslot))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};

    use super::*;

    fn slot(hour: u32, minutes: i64) -> Timeslot {
        let start: DateTime<FixedOffset> = FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2021, 10, 20, hour, 0, 0)
            .unwrap();
        Timeslot::new("ev", "slot", "Talk", start, start + TimeDelta::minutes(minutes))
    }

    fn window() -> MirrorWindow {
        MirrorWindow::new(
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_inside_window_is_main_broadcast() {
        assert!(!MirrorWindow::is_mirror(Some(&window()), &slot(9, 60)));
        assert!(!MirrorWindow::is_mirror(Some(&window()), &slot(19, 60)));
    }

    #[test]
    fn test_outside_window_is_mirror() {
        assert!(MirrorWindow::is_mirror(Some(&window()), &slot(7, 30)));
        assert!(MirrorWindow::is_mirror(Some(&window()), &slot(19, 90)));
        assert!(MirrorWindow::is_mirror(Some(&window()), &slot(23, 120)));
    }

    #[test]
    fn test_explicit_flag_without_window() {
        assert!(!MirrorWindow::is_mirror(None, &slot(3, 30)));
        assert!(MirrorWindow::is_mirror(None, &slot(3, 30).with_mirror(true)));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let result = MirrorWindow::new(
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidMirrorWindow { .. })
        ));
    }
}
