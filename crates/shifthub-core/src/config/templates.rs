//! Static checklist template configuration.
//!
//! Checklist content is pure data supplied by the site. The defaults here
//! mirror a three-shift front-desk roster so a bare deployment produces a
//! working checklist out of the box.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::ShiftName;

/// Static checklist templates, keyed by shift name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Shift name → ordered task templates.
    #[serde(default = "default_tasks")]
    pub tasks: HashMap<String, Vec<TaskTemplateConfig>>,
    /// Shift name → ordered auxiliary checklist templates (fixed-time rounds).
    #[serde(default = "default_auxiliary")]
    pub auxiliary: HashMap<String, Vec<AuxiliaryTemplateConfig>>,
}

impl TemplateConfig {
    /// Task templates for a shift, empty when the shift is unknown.
    pub fn tasks_for(&self, shift: &ShiftName) -> &[TaskTemplateConfig] {
        self.tasks.get(shift.as_str()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Auxiliary templates for a shift, empty when the shift is unknown.
    pub fn auxiliary_for(&self, shift: &ShiftName) -> &[AuxiliaryTemplateConfig] {
        self.auxiliary
            .get(shift.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            tasks: default_tasks(),
            auxiliary: default_auxiliary(),
        }
    }
}

/// One static task template entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplateConfig {
    /// Task ID, unique within the shift's template.
    pub id: u32,
    /// Short task label.
    pub text: String,
    /// Longer procedural description.
    #[serde(default)]
    pub info: String,
}

/// One auxiliary checklist template entry (fixed-time label, no notes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryTemplateConfig {
    /// Item ID, unique within the shift's auxiliary list.
    pub id: u32,
    /// Fixed label, e.g. `"1st 01:00"`.
    pub text: String,
}

fn task(id: u32, text: &str, info: &str) -> TaskTemplateConfig {
    TaskTemplateConfig {
        id,
        text: text.to_string(),
        info: info.to_string(),
    }
}

fn aux(id: u32, text: &str) -> AuxiliaryTemplateConfig {
    AuxiliaryTemplateConfig {
        id,
        text: text.to_string(),
    }
}

fn default_tasks() -> HashMap<String, Vec<TaskTemplateConfig>> {
    let mut map = HashMap::new();
    map.insert(
        "Night".to_string(),
        vec![
            task(
                1,
                "Handover & Security Round",
                "Receive handover from the previous shift. Walk through all public areas, \
                 check doors/windows are locked, report any issues.",
            ),
            task(
                2,
                "Count Cash Float",
                "Count all cash in the register and record the total on the float sheet. \
                 Report any discrepancies.",
            ),
            task(
                3,
                "Print and Check Arrivals",
                "Print the arrivals list for the next day, check for special requests or VIPs.",
            ),
            task(
                4,
                "Prepare Breakfast List",
                "Print a list of all guests with breakfast included and hand it to the \
                 kitchen staff.",
            ),
            task(
                5,
                "Run Night Audit",
                "Follow the night audit procedure: balance transactions, generate reports, \
                 and back up system data.",
            ),
        ],
    );
    map.insert(
        "Morning".to_string(),
        vec![
            task(
                1,
                "Read Handover & Info Mails",
                "Review the latest mails and any notes from the night shift. Note events, \
                 VIPs, groups, and special arrivals.",
            ),
            task(
                2,
                "Count Cash Float & Update Availability",
                "Count the physical register against the system total, then update room \
                 availability on the booking channels.",
            ),
            task(
                3,
                "Check Event Overview",
                "Review today's events and group bookings against the printed overview sheet.",
            ),
            task(
                4,
                "Check Out-of-Order Rooms",
                "Review rooms marked out of order or out of service and extend dates when \
                 maintenance has not updated them.",
            ),
        ],
    );
    map.insert(
        "Evening".to_string(),
        vec![
            task(
                1,
                "Handover & Security Round",
                "Receive handover from the day shift and walk through all public areas.",
            ),
            task(
                2,
                "Count Cash Float",
                "Count all cash in the register and record the total on the float sheet.",
            ),
            task(
                3,
                "Prepare Next-Day Arrivals",
                "Print and review the arrivals list for tomorrow; flag special requests.",
            ),
        ],
    );
    map
}

fn default_auxiliary() -> HashMap<String, Vec<AuxiliaryTemplateConfig>> {
    let mut map = HashMap::new();
    map.insert(
        "Night".to_string(),
        vec![aux(1, "1st 01:00"), aux(2, "2nd 04:00"), aux(3, "3rd 07:00")],
    );
    map.insert(
        "Morning".to_string(),
        vec![aux(1, "1st 09:00"), aux(2, "2nd 12:00"), aux(3, "3rd 15:00")],
    );
    map.insert(
        "Evening".to_string(),
        vec![aux(1, "1st 18:00"), aux(2, "2nd 21:00"), aux(3, "3rd 23:00")],
    );
    map
}
