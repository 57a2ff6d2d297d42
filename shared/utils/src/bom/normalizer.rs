//! Shortage Normalizer
//!
//! Maps heterogeneous shortage-report rows onto [`ShortageRecord`]s. Source
//! files name their columns differently ("Lead Time" vs "Lead Time (Days)"),
//! so every canonical field is resolved through an ordered alias list and the
//! first non-blank match wins.

use bomai_models::{CellValue, RawRow, ShortageRecord, UNKNOWN_PART};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ExtractionError;

/// Canonical fields a row can be resolved into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Description,
    Required,
    FreeStock,
    LeadTimeDays,
    Shortage,
    /// Stock code / reference, used by the line filter
    Reference,
    /// Monetary value of the row, used by the line filter
    LineValue,
}

impl CanonicalField {
    pub const SHORTAGE_FIELDS: [CanonicalField; 5] = [
        Self::Description,
        Self::Required,
        Self::FreeStock,
        Self::LeadTimeDays,
        Self::Shortage,
    ];
}

/// Where a record's shortage quantity comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortageMode {
    /// Always `max(required - free_stock, 0)`
    #[default]
    DeriveShortage,
    /// Use the source's shortage column; derive only when the row has none
    TrustSourceShortage,
}

/// Ordered column-name aliases per canonical field. Configuration data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAliases {
    pub description: Vec<String>,
    pub required: Vec<String>,
    pub free_stock: Vec<String>,
    pub lead_time_days: Vec<String>,
    pub shortage: Vec<String>,
    pub reference: Vec<String>,
    pub line_value: Vec<String>,
}

fn names(aliases: &[&str]) -> Vec<String> {
    aliases.iter().map(|alias| alias.to_string()).collect()
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            description: names(&["Description", "Part", "Stock Code"]),
            required: names(&["Qty Required", "Required", "Qty"]),
            free_stock: names(&["Free Stock", "Stock"]),
            lead_time_days: names(&["Lead Time", "Lead Time (Days)"]),
            shortage: names(&["Shortage", "Shortage Qty"]),
            reference: names(&["Stock Code", "Reference", "Part No"]),
            line_value: names(&["Line Total", "Total Cost", "Value"]),
        }
    }
}

impl FieldAliases {
    pub fn aliases_for(&self, field: CanonicalField) -> &[String] {
        match field {
            CanonicalField::Description => &self.description,
            CanonicalField::Required => &self.required,
            CanonicalField::FreeStock => &self.free_stock,
            CanonicalField::LeadTimeDays => &self.lead_time_days,
            CanonicalField::Shortage => &self.shortage,
            CanonicalField::Reference => &self.reference,
            CanonicalField::LineValue => &self.line_value,
        }
    }

    /// First non-blank cell among the field's aliases, in alias order
    pub fn resolve<'r>(&self, row: &'r RawRow, field: CanonicalField) -> Option<&'r CellValue> {
        self.aliases_for(field)
            .iter()
            .find_map(|alias| row.find(alias))
    }

    /// Whether any column of the row is a known shortage-field alias
    pub fn recognizes(&self, row: &RawRow) -> bool {
        row.columns().any(|column| {
            let column = column.trim();
            CanonicalField::SHORTAGE_FIELDS.iter().any(|field| {
                self.aliases_for(*field)
                    .iter()
                    .any(|alias| alias.trim().eq_ignore_ascii_case(column))
            })
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShortageNormalizer {
    aliases: FieldAliases,
    mode: ShortageMode,
}

impl ShortageNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ShortageMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_aliases(mut self, aliases: FieldAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn mode(&self) -> ShortageMode {
        self.mode
    }

    pub fn aliases(&self) -> &FieldAliases {
        &self.aliases
    }

    /// One record per row, in input order. Duplicates stay distinct.
    pub fn normalize(&self, rows: &[RawRow]) -> Vec<ShortageRecord> {
        let records: Vec<ShortageRecord> = rows.iter().map(|row| self.normalize_row(row)).collect();
        debug!(
            rows = rows.len(),
            short = records.iter().filter(|r| r.is_short()).count(),
            mode = ?self.mode,
            "Normalized shortage rows"
        );
        records
    }

    /// Like [`normalize`](Self::normalize), but rejects a row set in which no
    /// row carries a single known column.
    pub fn normalize_strict(&self, rows: &[RawRow]) -> Result<Vec<ShortageRecord>, ExtractionError> {
        if rows.is_empty() {
            return Err(ExtractionError::malformed("the sheet has no data rows"));
        }

        if !rows.iter().any(|row| self.aliases.recognizes(row)) {
            let columns: Vec<&str> = rows[0].columns().collect();
            warn!(?columns, "No known shortage columns in uploaded sheet");
            return Err(ExtractionError::malformed(format!(
                "none of the columns [{}] is a known description, quantity, stock or lead time column",
                columns.join(", ")
            )));
        }

        Ok(self.normalize(rows))
    }

    pub fn normalize_row(&self, row: &RawRow) -> ShortageRecord {
        let description = self
            .aliases
            .resolve(row, CanonicalField::Description)
            .and_then(CellValue::as_text)
            .unwrap_or_else(|| UNKNOWN_PART.to_string());
        let required = self.number(row, CanonicalField::Required).unwrap_or(0.0);
        let free_stock = self.number(row, CanonicalField::FreeStock).unwrap_or(0.0);
        let lead_time_days = self
            .number(row, CanonicalField::LeadTimeDays)
            .map(whole_days)
            .unwrap_or(0);

        let source_shortage = match self.mode {
            ShortageMode::TrustSourceShortage => self.number(row, CanonicalField::Shortage),
            ShortageMode::DeriveShortage => None,
        };

        match source_shortage {
            Some(shortage) => ShortageRecord::with_source_shortage(
                description,
                required,
                free_stock,
                shortage,
                lead_time_days,
            ),
            None => ShortageRecord::derived(description, required, free_stock, lead_time_days),
        }
    }

    fn number(&self, row: &RawRow, field: CanonicalField) -> Option<f64> {
        self.aliases.resolve(row, field).and_then(CellValue::as_number)
    }
}

/// Partial days round up; negatives clamp to zero
fn whole_days(days: f64) -> u32 {
    if days <= 0.0 {
        0
    } else {
        days.ceil().min(u32::MAX as f64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bolt_row() -> RawRow {
        RawRow::new()
            .with("Description", "Bolt")
            .with("Required", 10.0)
            .with("Free Stock", 4.0)
            .with("Lead Time", 7.0)
    }

    #[test]
    fn test_round_trip_single_row() {
        let records = ShortageNormalizer::new().normalize(&[bolt_row()]);

        assert_eq!(records, vec![ShortageRecord {
            description: "Bolt".to_string(),
            required: 10.0,
            free_stock: 4.0,
            shortage: 6.0,
            lead_time_days: 7,
        }]);
    }

    #[test]
    fn test_alias_precedence_first_non_blank_wins() {
        let row = RawRow::new()
            .with("Description", "  ")
            .with("Part", "Washer")
            .with("Stock Code", "WSH-8")
            .with("Qty Required", "")
            .with("Qty", "12")
            .with("Stock", "2")
            .with("Lead Time (Days)", "14 days");
        let record = ShortageNormalizer::new().normalize_row(&row);

        assert_eq!(record.description, "Washer");
        assert_eq!(record.required, 12.0);
        assert_eq!(record.free_stock, 2.0);
        assert_eq!(record.shortage, 10.0);
        assert_eq!(record.lead_time_days, 14);
    }

    #[test]
    fn test_defaults_when_nothing_matches() {
        let record = ShortageNormalizer::new().normalize_row(&RawRow::new().with("Colour", "Red"));

        assert_eq!(record.description, UNKNOWN_PART);
        assert_eq!(record.required, 0.0);
        assert_eq!(record.shortage, 0.0);
        assert_eq!(record.lead_time_days, 0);
    }

    #[test]
    fn test_trust_source_mode_uses_explicit_shortage() {
        let row = bolt_row().with("Shortage Qty", 2.0);

        let trusted = ShortageNormalizer::new()
            .with_mode(ShortageMode::TrustSourceShortage)
            .normalize_row(&row);
        let derived = ShortageNormalizer::new().normalize_row(&row);

        assert_eq!(trusted.shortage, 2.0);
        assert_eq!(derived.shortage, 6.0);
    }

    #[test]
    fn test_trust_source_mode_derives_when_column_missing() {
        let record = ShortageNormalizer::new()
            .with_mode(ShortageMode::TrustSourceShortage)
            .normalize_row(&bolt_row());

        assert_eq!(record.shortage, 6.0);
    }

    #[test]
    fn test_fractional_lead_time_rounds_up() {
        let row = bolt_row().with("Lead Time", 2.1);
        assert_eq!(ShortageNormalizer::new().normalize_row(&row).lead_time_days, 3);
    }

    #[test]
    fn test_order_preserved_and_duplicates_kept() {
        let rows = vec![
            bolt_row(),
            RawRow::new().with("Description", "Nut").with("Required", 3.0).with("Free Stock", 5.0),
            bolt_row(),
        ];
        let records = ShortageNormalizer::new().normalize(&rows);

        let names: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(names, vec!["Bolt", "Nut", "Bolt"]);
        assert_eq!(records[1].shortage, 0.0);
    }

    #[test]
    fn test_custom_alias_table() {
        let aliases = FieldAliases {
            lead_time_days: vec!["LT".to_string()],
            ..FieldAliases::default()
        };
        let row = RawRow::new().with("Description", "Gland").with("LT", 21.0).with("Lead Time", 7.0);
        let record = ShortageNormalizer::new().with_aliases(aliases).normalize_row(&row);

        assert_eq!(record.lead_time_days, 21);
    }

    #[test]
    fn test_strict_rejects_unknown_shape() {
        let rows = vec![RawRow::new().with("Colour", "Red").with("Size", "M")];
        let error = ShortageNormalizer::new().normalize_strict(&rows).unwrap_err();

        assert_eq!(error.error_code(), "MALFORMED_INPUT");
        assert!(error.to_string().contains("Colour"));
        assert!(ShortageNormalizer::new().normalize_strict(&[]).is_err());
    }

    #[test]
    fn test_strict_accepts_case_insensitive_headers() {
        let rows = vec![RawRow::new().with("QTY REQUIRED", 5.0).with("free stock", 1.0)];
        let records = ShortageNormalizer::new().normalize_strict(&rows).unwrap();

        assert_eq!(records[0].shortage, 4.0);
    }

    proptest! {
        #[test]
        fn prop_derived_shortage_matches_stock_deficit(
            required in 0u32..10_000,
            free_stock in 0u32..10_000,
        ) {
            let row = RawRow::new()
                .with("Qty Required", required as f64)
                .with("Free Stock", free_stock as f64);
            let record = ShortageNormalizer::new().normalize_row(&row);

            prop_assert_eq!(record.shortage, required.saturating_sub(free_stock) as f64);
        }
    }
}
