//! Half-open time windows.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WindowError;

/// A half-open interval `[start, end)` of absolute instants.
///
/// Two windows overlap iff `a.start < b.end && b.start < a.end`; windows
/// that merely touch at an endpoint do not conflict. Zero-duration and
/// inverted intervals cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if end < start {
            return Err(WindowError::EndBeforeStart);
        }
        if end == start {
            return Err(WindowError::ZeroDuration);
        }
        Ok(Self { start, end })
    }

    /// Builds a window from millisecond timestamps, as carried on the wire.
    pub fn from_millis(start: i64, end: i64) -> Result<Self, WindowError> {
        let start = DateTime::from_timestamp_millis(start).ok_or(WindowError::EndBeforeStart)?;
        let end = DateTime::from_timestamp_millis(end).ok_or(WindowError::EndBeforeStart)?;
        Self::new(start, end)
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }

    /// Half-open overlap test.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Shifts both endpoints by `delta`. Duration is preserved, so the
    /// result is always a valid window.
    #[must_use]
    pub fn shifted(&self, delta: TimeDelta) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, min, 0).unwrap()
    }

    #[test]
    fn rejects_inverted_and_empty() {
        assert_eq!(
            TimeWindow::new(at(10, 0), at(9, 0)),
            Err(WindowError::EndBeforeStart)
        );
        assert_eq!(
            TimeWindow::new(at(10, 0), at(10, 0)),
            Err(WindowError::ZeroDuration)
        );
    }

    #[test]
    fn overlap_is_half_open() {
        let a = TimeWindow::new(at(9, 0), at(10, 0)).unwrap();
        let b = TimeWindow::new(at(10, 0), at(11, 0)).unwrap();
        let c = TimeWindow::new(at(9, 30), at(10, 30)).unwrap();

        // Touching endpoints do not conflict
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));

        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
        assert!(a.overlaps(&a));
    }

    #[test]
    fn millis_round_trip() {
        let w = TimeWindow::new(at(9, 0), at(10, 30)).unwrap();
        let back = TimeWindow::from_millis(w.start_millis(), w.end_millis()).unwrap();
        assert_eq!(w, back);
    }

    #[test]
    fn shift_preserves_duration() {
        let w = TimeWindow::new(at(9, 0), at(10, 0)).unwrap();
        let moved = w.shifted(TimeDelta::days(7));
        assert_eq!(moved.end() - moved.start(), w.end() - w.start());
        assert_eq!(moved.start(), at(9, 0) + TimeDelta::days(7));
    }
}
