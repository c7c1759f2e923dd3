//! Dashboard summary statistics.

use serde::{Deserialize, Serialize};

/// Aggregate counters shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub tests_executed: u64,
    pub active_sessions: u32,
    /// Percentage.
    pub system_uptime: f64,
    /// Percentage.
    pub compliance_rate: f64,
}

impl DashboardSummary {
    /// Fixed values rendered when live statistics are unavailable.
    pub const fn fallback() -> Self {
        Self {
            tests_executed: 1234,
            active_sessions: 3,
            system_uptime: 99.8,
            compliance_rate: 98.5,
        }
    }
}

/// Body of `GET /api/dashboard/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: DashboardSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
