//! Costing Decoder
//!
//! Turns text extracted from a costing PDF into priced lines and a total.
//!
//! Two strategies are supported and the caller picks one:
//!
//! - [`CostingStrategy::LineAnchored`] reads the trailing two-decimal amount
//!   of every physical line. Works when each table row lands on its own text
//!   line; breaks when several columns of a row collapse onto one line with
//!   other trailing numbers.
//! - [`CostingStrategy::HeaderAnchored`] skips to the `Line Total` header and
//!   reads every two-decimal amount after it as `(quantity, unit cost, line
//!   total)` triples. Survives column realignment; breaks as soon as a row has
//!   more or fewer than three amounts, or footnotes and page totals appear
//!   after the table.

use bigdecimal::BigDecimal;
use bomai_models::{CostingExtractionResult, CostingStrategy, PricedLine};
use regex::{Captures, Regex};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{debug, warn};

use super::filter::LineFilter;
use crate::error::ExtractionError;

/// Literal header that starts the priced table
pub const LINE_TOTAL_HEADER: &str = "Line Total";

/// Optional currency symbol, digits with optional thousands grouping, exactly two decimals
const AMOUNT_PATTERN: &str = r"(?:[£$€]\s?)?\b(\d{1,3}(?:,\d{3})+|\d+)\.(\d{2})\b";

fn amount_regex() -> &'static Regex {
    static AMOUNT: OnceLock<Regex> = OnceLock::new();
    AMOUNT.get_or_init(|| Regex::new(AMOUNT_PATTERN).expect("amount pattern is valid"))
}

fn trailing_amount_regex() -> &'static Regex {
    static TRAILING: OnceLock<Regex> = OnceLock::new();
    TRAILING.get_or_init(|| {
        Regex::new(&format!(r"{}\s*$", AMOUNT_PATTERN)).expect("trailing amount pattern is valid")
    })
}

/// Decode and sum the line totals of a costing document.
pub fn extract_costing(
    text: &str,
    strategy: CostingStrategy,
) -> Result<CostingExtractionResult, ExtractionError> {
    let lines = decode_lines(text, strategy)?;
    summarize(strategy, &lines)
}

/// Like [`extract_costing`], dropping lines the filter rejects before summing.
pub fn extract_costing_filtered(
    text: &str,
    strategy: CostingStrategy,
    filter: &LineFilter,
) -> Result<CostingExtractionResult, ExtractionError> {
    let lines = decode_lines(text, strategy)?;
    let detected = lines.len();

    let kept: Vec<PricedLine> = lines
        .into_iter()
        .filter(|line| filter.admits_line(line))
        .collect();

    debug!(detected, kept = kept.len(), "Filtered costing lines");
    summarize(strategy, &kept)
}

/// Priced lines found by the given strategy. Never empty on success.
pub fn decode_lines(
    text: &str,
    strategy: CostingStrategy,
) -> Result<Vec<PricedLine>, ExtractionError> {
    let lines = match strategy {
        CostingStrategy::LineAnchored => line_anchored(text),
        CostingStrategy::HeaderAnchored => header_anchored(text)?,
    };

    if lines.is_empty() {
        return Err(ExtractionError::NoTotalsDetected);
    }

    Ok(lines)
}

fn summarize(
    strategy: CostingStrategy,
    lines: &[PricedLine],
) -> Result<CostingExtractionResult, ExtractionError> {
    let result = CostingExtractionResult::from_lines(strategy, lines)
        .ok_or(ExtractionError::NoTotalsDetected)?;

    debug!(
        strategy = %strategy,
        lines = result.line_count(),
        total = %result.formatted_total(),
        "Decoded costing document"
    );

    Ok(result)
}

fn line_anchored(text: &str) -> Vec<PricedLine> {
    text.lines()
        .filter_map(|line| {
            let caps = trailing_amount_regex().captures(line)?;
            let amount = parse_amount(&caps)?;
            let start = caps.get(0)?.start();
            Some(PricedLine::new(amount).with_label(&line[..start]))
        })
        .collect()
}

fn header_anchored(text: &str) -> Result<Vec<PricedLine>, ExtractionError> {
    let header_at = text
        .find(LINE_TOTAL_HEADER)
        .ok_or(ExtractionError::HeaderNotFound)?;
    let table = &text[header_at + LINE_TOTAL_HEADER.len()..];

    let amounts: Vec<BigDecimal> = amount_regex()
        .captures_iter(table)
        .filter_map(|caps| parse_amount(&caps))
        .collect();

    if amounts.len() < 3 {
        return Err(ExtractionError::NoTotalsDetected);
    }

    let leftover = amounts.len() % 3;
    if leftover != 0 {
        warn!(
            amounts = amounts.len(),
            leftover, "Amount count is not a multiple of three, ignoring trailing amounts"
        );
    }

    Ok(amounts
        .chunks_exact(3)
        .map(|triple| {
            PricedLine::new(triple[2].clone()).with_breakdown(triple[0].clone(), triple[1].clone())
        })
        .collect())
}

fn parse_amount(caps: &Captures<'_>) -> Option<BigDecimal> {
    let units = caps.get(1)?.as_str().replace(',', "");
    let cents = caps.get(2)?.as_str();
    BigDecimal::from_str(&format!("{}.{}", units, cents)).ok()
}
