//! Query result views over an uploaded build.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Answer to "what does the build cost". `total_cost` is `None` until a
/// costing document has been decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub total_cost: Option<String>,
    pub lines_counted: usize,
}

impl CostSummary {
    pub fn unavailable() -> Self {
        Self {
            total_cost: None,
            lines_counted: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.total_cost.is_some()
    }
}

/// Whether outstanding shortages can arrive before the kit date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitDateAssessment {
    pub kit_date: NaiveDate,
    pub today: NaiveDate,
    /// Negative when the kit date has already passed
    pub days_until_kit: i64,
    pub max_lead_time_days: Option<u32>,
    /// Description of the shortage item with the longest lead time
    pub driving_item: Option<String>,
    pub earliest_available: Option<NaiveDate>,
    pub at_risk: bool,
}
