//! Shift schedule configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::ShiftName;

/// Shift schedule configuration.
///
/// Maps shift names to their wall-clock windows. The default roster is the
/// three-shift front-desk pattern: Night (22–07), Morning (07–19), and
/// Evening (22–08, the alternative overnight pattern).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftScheduleConfig {
    /// Shift name → window. Keys are case-sensitive shift names.
    #[serde(default = "default_windows")]
    pub windows: HashMap<String, ShiftWindow>,
}

impl ShiftScheduleConfig {
    /// Look up the window for a shift, if configured.
    pub fn window(&self, shift: &ShiftName) -> Option<&ShiftWindow> {
        self.windows.get(shift.as_str())
    }

    /// Return the configured shift names.
    pub fn shift_names(&self) -> Vec<ShiftName> {
        self.windows.keys().map(|k| ShiftName::from(k.clone())).collect()
    }
}

impl Default for ShiftScheduleConfig {
    fn default() -> Self {
        Self {
            windows: default_windows(),
        }
    }
}

/// One shift's wall-clock window, in whole hours (0–23).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    /// Hour the shift starts.
    pub start: u32,
    /// Hour the shift ends. When `end <= start` the shift crosses midnight.
    pub end: u32,
    /// Width of the pre-shift early clock-in window, in whole hours.
    ///
    /// Staff arriving within this many hours before `start` of a
    /// midnight-crossing shift are attributed to the previous day's
    /// session (e.g. a 21:30 arrival for a 22:00 Night shift).
    #[serde(default = "default_early_clock_in")]
    pub early_clock_in_hours: u32,
}

impl ShiftWindow {
    /// Create a window with the default one-hour early clock-in grace.
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            early_clock_in_hours: default_early_clock_in(),
        }
    }

    /// Returns whether this shift spans midnight.
    pub fn crosses_midnight(&self) -> bool {
        self.end <= self.start
    }
}

fn default_early_clock_in() -> u32 {
    1
}

fn default_windows() -> HashMap<String, ShiftWindow> {
    let mut map = HashMap::new();
    map.insert("Night".to_string(), ShiftWindow::new(22, 7));
    map.insert("Morning".to_string(), ShiftWindow::new(7, 19));
    map.insert("Evening".to_string(), ShiftWindow::new(22, 8));
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crosses_midnight_derivation() {
        assert!(ShiftWindow::new(22, 7).crosses_midnight());
        assert!(ShiftWindow::new(22, 22).crosses_midnight());
        assert!(!ShiftWindow::new(7, 19).crosses_midnight());
    }

    #[test]
    fn test_default_roster() {
        let config = ShiftScheduleConfig::default();
        let night = config.window(&ShiftName::from("Night")).unwrap();
        assert_eq!(night.start, 22);
        assert_eq!(night.end, 7);
        assert_eq!(night.early_clock_in_hours, 1);
        assert!(config.window(&ShiftName::from("Weekend")).is_none());
    }
}
