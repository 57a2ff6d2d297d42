//! Costing domain models.
//!
//! A costing document is decoded into [`PricedLine`]s and summarised as a
//! [`CostingExtractionResult`]. A result always carries at least one line
//! total; "nothing found" is an error, never a zero cost.

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How line totals are located in extracted costing text.
///
/// Both strategies are legitimate and the caller picks one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostingStrategy {
    /// Each physical line ending in a two-decimal amount contributes that amount.
    #[default]
    LineAnchored,
    /// After the `Line Total` header, every third two-decimal amount contributes.
    HeaderAnchored,
}

impl CostingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LineAnchored => "line_anchored",
            Self::HeaderAnchored => "header_anchored",
        }
    }
}

impl fmt::Display for CostingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "line_anchored" | "line" => Ok(Self::LineAnchored),
            "header_anchored" | "header" => Ok(Self::HeaderAnchored),
            other => Err(format!("Unknown costing strategy: {}", other)),
        }
    }
}

/// One priced row detected in a costing document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    /// Text preceding the line total (line-anchored extraction only)
    pub label: Option<String>,
    pub quantity: Option<BigDecimal>,
    pub unit_cost: Option<BigDecimal>,
    pub line_total: BigDecimal,
}

impl PricedLine {
    pub fn new(line_total: BigDecimal) -> Self {
        Self {
            label: None,
            quantity: None,
            unit_cost: None,
            line_total,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        let trimmed = label.trim();
        self.label = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn with_breakdown(mut self, quantity: BigDecimal, unit_cost: BigDecimal) -> Self {
        self.quantity = Some(quantity);
        self.unit_cost = Some(unit_cost);
        self
    }
}

/// Summed line totals of one costing document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "CostingPayload")]
pub struct CostingExtractionResult {
    total_cost: BigDecimal,
    line_count: usize,
    strategy: CostingStrategy,
}

impl CostingExtractionResult {
    /// Sum the given lines. Returns `None` when there is nothing to sum.
    pub fn from_lines(strategy: CostingStrategy, lines: &[PricedLine]) -> Option<Self> {
        if lines.is_empty() {
            return None;
        }

        let total_cost = lines
            .iter()
            .fold(BigDecimal::zero(), |acc, line| acc + &line.line_total);

        Some(Self {
            total_cost: round_money(&total_cost),
            line_count: lines.len(),
            strategy,
        })
    }

    pub fn total_cost(&self) -> &BigDecimal {
        &self.total_cost
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn strategy(&self) -> CostingStrategy {
        self.strategy
    }

    /// Total formatted with exactly two decimal places
    pub fn formatted_total(&self) -> String {
        format_money(&self.total_cost)
    }
}

/// Wire shape of a costing result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostingPayload {
    pub total_cost: String,
    pub lines_counted: usize,
    pub strategy: CostingStrategy,
}

impl From<CostingExtractionResult> for CostingPayload {
    fn from(result: CostingExtractionResult) -> Self {
        Self {
            total_cost: result.formatted_total(),
            lines_counted: result.line_count,
            strategy: result.strategy,
        }
    }
}

/// Round half-up to cents
pub fn round_money(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// Cents rendered as `units.cc`. `BigDecimal`'s `Display` drops the scale of zero.
pub fn format_money(value: &BigDecimal) -> String {
    let (cents, _) = round_money(value).with_scale(2).as_bigint_and_exponent();
    let cents = cents.to_string();
    let (sign, digits) = match cents.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", cents.as_str()),
    };

    let digits = format!("{:0>3}", digits);
    let (units, fraction) = digits.split_at(digits.len() - 2);
    format!("{}{}.{}", sign, units, fraction)
}
