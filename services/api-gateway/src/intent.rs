//! Chat Intent
//!
//! Maps a free-text question onto one of the build queries by keyword and
//! phrases the answer.

use bomai_models::{CostSummary, KitDateAssessment, ShortageRecord};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Cost,
    Shortages,
    OrderPriority,
    KitRisk,
    Help,
}

impl Intent {
    /// First matching keyword wins: cost, shortage, order/lead, kit
    pub fn classify(message: &str) -> Self {
        let message = message.to_lowercase();

        if message.contains("cost") {
            Intent::Cost
        } else if message.contains("shortage") {
            Intent::Shortages
        } else if message.contains("order") || message.contains("lead") {
            Intent::OrderPriority
        } else if message.contains("kit") {
            Intent::KitRisk
        } else {
            Intent::Help
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Cost => "cost",
            Intent::Shortages => "shortages",
            Intent::OrderPriority => "order_priority",
            Intent::KitRisk => "kit_risk",
            Intent::Help => "help",
        }
    }
}

pub const HELP_REPLY: &str =
    "Upload a costing PDF and a shortage spreadsheet, then ask about cost, shortages, lead times or kit dates.";

pub const KIT_DATE_REQUIRED_REPLY: &str = "Give a kit date (YYYY-MM-DD) to check delivery risk against lead times.";

pub fn cost_reply(summary: &CostSummary) -> String {
    match &summary.total_cost {
        Some(total) => format!(
            "The total cost is {} across {} priced lines.",
            total, summary.lines_counted
        ),
        None => "No costing report has been analysed for this build yet.".to_string(),
    }
}

pub fn shortages_reply(short: &[ShortageRecord]) -> String {
    match short {
        [] => "No components are short.".to_string(),
        [only] => format!("1 component is short: {} ({} missing).", only.description, only.shortage),
        _ => {
            let names: Vec<&str> = short.iter().map(|r| r.description.as_str()).collect();
            format!("{} components are short: {}.", short.len(), names.join(", "))
        }
    }
}

pub fn order_priority_reply(ranked: &[ShortageRecord]) -> String {
    match ranked.first() {
        Some(first) => format!(
            "Order {} first: it has the longest lead time at {} days.",
            first.description, first.lead_time_days
        ),
        None => "Nothing needs ordering; no components are short.".to_string(),
    }
}

pub fn kit_risk_reply(assessment: &KitDateAssessment) -> String {
    match (&assessment.driving_item, assessment.max_lead_time_days) {
        (Some(item), Some(lead)) if assessment.at_risk => format!(
            "Kit date {} is at risk: {} has a {} day lead time, so the earliest it can arrive is {}.",
            assessment.kit_date,
            item,
            lead,
            assessment
                .earliest_available
                .map(|date| date.to_string())
                .unwrap_or_else(|| "beyond the calendar".to_string())
        ),
        (Some(item), Some(lead)) => format!(
            "Kit date {} is achievable: the longest lead time is {} days ({}).",
            assessment.kit_date, lead, item
        ),
        _ => format!("Kit date {} is not at risk; no components are short.", assessment.kit_date),
    }
}
