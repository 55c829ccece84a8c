//! Reporting thresholds
//!
//! Tunables for the dashboard and stock reports. Defaults match standard
//! field practice; deployments override them as needed.

use serde::{Deserialize, Serialize};

use crate::model::EXPIRING_SOON_DAYS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Occupancy percentage above which a center is flagged high-occupancy.
    pub high_occupancy_percent: u8,
    /// Occupancy percentage at which a center counts as near capacity.
    pub near_capacity_percent: u8,
    /// Days ahead covered by the expiring-stock reports.
    pub expiring_window_days: i64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            high_occupancy_percent: 80,
            near_capacity_percent: 90,
            expiring_window_days: EXPIRING_SOON_DAYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = ReportConfig::default();
        assert_eq!(config.high_occupancy_percent, 80);
        assert_eq!(config.near_capacity_percent, 90);
        assert_eq!(config.expiring_window_days, 7);
    }
}
