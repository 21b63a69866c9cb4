//! Audit trail configuration.

use serde::{Deserialize, Serialize};

/// Audit trail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Default page size for audit queries.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Maximum page size a caller may request.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Upper bound on the number of entries scanned for statistics.
    #[serde(default = "default_stats_scan_limit")]
    pub stats_scan_limit: u32,
    /// Default lookback window for statistics, in days.
    #[serde(default = "default_stats_days")]
    pub default_stats_days: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            stats_scan_limit: default_stats_scan_limit(),
            default_stats_days: default_stats_days(),
        }
    }
}

fn default_page_size() -> u32 {
    50
}

fn default_max_page_size() -> u32 {
    200
}

fn default_stats_scan_limit() -> u32 {
    1000
}

fn default_stats_days() -> u32 {
    30
}
