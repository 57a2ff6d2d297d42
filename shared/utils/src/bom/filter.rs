//! Line Filter
//!
//! Decides whether a priced line or spreadsheet row is a real purchasable
//! component. Sub-assembly rollups, placeholder lines and non-positive
//! amounts are excluded so that sums only count parts that get bought.

use bigdecimal::{BigDecimal, Zero};
use bomai_models::{PricedLine, RawRow};
use serde::{Deserialize, Serialize};

use super::normalizer::{CanonicalField, FieldAliases};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineFilter {
    /// Reference/description prefixes marking a sub-assembly rollup
    pub reserved_prefixes: Vec<String>,
    /// Whole-description markers of non-priced placeholder lines
    pub placeholder_markers: Vec<String>,
}

impl Default for LineFilter {
    fn default() -> Self {
        Self {
            reserved_prefixes: vec!["SA-".to_string(), "SUB-".to_string()],
            placeholder_markers: vec![
                "TBC".to_string(),
                "N/A".to_string(),
                "TEXT".to_string(),
                "COMMENT".to_string(),
            ],
        }
    }
}

impl LineFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Core predicate. `positive` is `None` when the line carries no amount.
    pub fn admits(
        &self,
        reference: Option<&str>,
        description: Option<&str>,
        positive: Option<bool>,
    ) -> bool {
        if positive == Some(false) {
            return false;
        }

        let reserved = [reference, description]
            .into_iter()
            .flatten()
            .any(|text| self.is_sub_assembly(text));
        if reserved {
            return false;
        }

        !description.is_some_and(|text| self.is_placeholder(text))
    }

    /// Priced lines use the first word of their label as the reference.
    pub fn admits_line(&self, line: &PricedLine) -> bool {
        let label = line.label.as_deref();
        let reference = label.and_then(|text| text.split_whitespace().next());
        let positive = line.line_total > BigDecimal::zero();

        self.admits(reference, label, Some(positive))
    }

    pub fn admits_row(&self, row: &RawRow, aliases: &FieldAliases) -> bool {
        let reference = aliases
            .resolve(row, CanonicalField::Reference)
            .and_then(|cell| cell.as_text());
        let description = aliases
            .resolve(row, CanonicalField::Description)
            .and_then(|cell| cell.as_text());
        let positive = aliases
            .resolve(row, CanonicalField::LineValue)
            .and_then(|cell| cell.as_number())
            .map(|value| value > 0.0);

        self.admits(reference.as_deref(), description.as_deref(), positive)
    }

    fn is_sub_assembly(&self, text: &str) -> bool {
        let text = text.trim().to_uppercase();
        self.reserved_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && text.starts_with(&prefix.to_uppercase()))
    }

    fn is_placeholder(&self, text: &str) -> bool {
        let text = text.trim();
        self.placeholder_markers
            .iter()
            .any(|marker| text.eq_ignore_ascii_case(marker.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn line(label: &str, total: &str) -> PricedLine {
        PricedLine::new(BigDecimal::from_str(total).unwrap()).with_label(label)
    }

    #[test]
    fn test_real_component_is_admitted() {
        let filter = LineFilter::new();
        assert!(filter.admits_line(&line("BOLT-M6 Bolt M6 10.00 0.25", "2.50")));
        assert!(filter.admits(None, None, None));
    }

    #[test]
    fn test_sub_assembly_prefix_is_excluded() {
        let filter = LineFilter::new();
        assert!(!filter.admits_line(&line("sa-100 Frame assembly", "40.00")));
        assert!(!filter.admits(Some("X1"), Some("SUB-Frame"), Some(true)));
    }

    #[test]
    fn test_placeholder_and_non_positive_are_excluded() {
        let filter = LineFilter::new();
        assert!(!filter.admits(Some("X1"), Some(" n/a "), Some(true)));
        assert!(!filter.admits_line(&line("BOLT-M6 Bolt", "0.00")));
    }

    #[test]
    fn test_row_filter_uses_aliases() {
        let filter = LineFilter::new();
        let aliases = FieldAliases::default();

        let rollup = RawRow::new()
            .with("Stock Code", "SA-200")
            .with("Description", "Wiring loom");
        let free_issue = RawRow::new()
            .with("Stock Code", "CBL-1")
            .with("Line Total", 0.0);
        let part = RawRow::new()
            .with("Stock Code", "CBL-1")
            .with("Description", "Cable")
            .with("Line Total", 12.5);

        assert!(!filter.admits_row(&rollup, &aliases));
        assert!(!filter.admits_row(&free_issue, &aliases));
        assert!(filter.admits_row(&part, &aliases));
    }
}
