//! Shift session identity resolution.
//!
//! Maps a shift name and a wall-clock moment to the calendar date the
//! shift occurrence logically belongs to, and from that to a stable
//! session key. For midnight-crossing shifts the key stays constant for
//! the whole occurrence even though the wall-clock date flips partway
//! through.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike};

use shifthub_core::config::shifts::ShiftScheduleConfig;
use shifthub_core::types::{SessionKey, ShiftName};

/// Pure resolver from (shift, wall-clock time) to session identity.
///
/// Callers thread `now` explicitly; the clock holds no ambient state
/// beyond the configured schedule.
#[derive(Debug, Clone)]
pub struct ShiftClock {
    schedule: ShiftScheduleConfig,
}

impl ShiftClock {
    /// Create a clock over the given shift schedule.
    pub fn new(schedule: ShiftScheduleConfig) -> Self {
        Self { schedule }
    }

    /// Resolve the calendar date the shift occurrence at `now` belongs to.
    ///
    /// For a midnight-crossing shift, hours before the shift's end hour
    /// are the tail of the previous day's occurrence, and hours inside
    /// the configured early clock-in window before the start hour are
    /// attributed to the previous day as well. Unknown shifts fall back
    /// to the plain calendar date.
    pub fn session_date(&self, shift: &ShiftName, now: NaiveDateTime) -> NaiveDate {
        let Some(window) = self.schedule.window(shift) else {
            return now.date();
        };

        if window.crosses_midnight() {
            let hour = now.hour();
            let grace_start = window.start.saturating_sub(window.early_clock_in_hours);
            if hour < window.end || (hour >= grace_start && hour < window.start) {
                return now
                    .date()
                    .checked_sub_days(Days::new(1))
                    .unwrap_or_else(|| now.date());
            }
        }

        now.date()
    }

    /// Resolve the session key for the shift occurrence at `now`.
    pub fn session_key(&self, shift: &ShiftName, now: NaiveDateTime) -> SessionKey {
        SessionKey::for_shift(shift, self.session_date(shift, now))
    }

    /// Returns whether `now` falls inside the shift's working window.
    pub fn is_within_shift(&self, shift: &ShiftName, now: NaiveDateTime) -> bool {
        let Some(window) = self.schedule.window(shift) else {
            return false;
        };
        let hour = now.hour();
        if window.crosses_midnight() {
            hour >= window.start || hour < window.end
        } else {
            hour >= window.start && hour < window.end
        }
    }

    /// The schedule this clock resolves against.
    pub fn schedule(&self) -> &ShiftScheduleConfig {
        &self.schedule
    }
}
