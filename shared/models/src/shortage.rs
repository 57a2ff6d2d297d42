//! Shortage report models.
//!
//! Spreadsheet rows arrive as loosely typed [`RawRow`]s and are normalized
//! into canonical [`ShortageRecord`]s.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use validator::Validate;

/// Description used when no description column resolves
pub const UNKNOWN_PART: &str = "Unknown part";

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Blank,
}

impl CellValue {
    /// Blank cells and whitespace-only text count as missing
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Blank => None,
            Self::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                Some(format!("{}", *value as i64))
            }
            Self::Number(value) => Some(value.to_string()),
        }
    }

    /// Numeric view of the cell. Text is read from its leading numeric portion,
    /// so `"1,200 pcs"` is `1200` and `"14 days"` is `14`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Blank => None,
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Number(_) => None,
            Self::Text(text) => parse_leading_number(text),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

fn parse_leading_number(text: &str) -> Option<f64> {
    let trimmed = text
        .trim()
        .trim_start_matches(|c: char| matches!(c, '£' | '$' | '€'))
        .trim_start();

    let mut numeric = String::new();
    for (idx, c) in trimmed.chars().enumerate() {
        match c {
            '0'..='9' | '.' => numeric.push(c),
            '-' | '+' if idx == 0 => numeric.push(c),
            ',' => {}
            _ => break,
        }
    }

    numeric.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// One spreadsheet line: column name to cell value, no fixed schema.
///
/// Cells keep the sheet's column order, and a repeated column name keeps
/// every cell under it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow(Vec<(String, CellValue)>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell after the existing ones
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.0.push((column.into(), value.into()));
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// First cell under exactly this column name
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Lookup comparing trimmed column names case-insensitively.
    /// Blank cells are skipped so a later duplicate column can still match.
    pub fn find(&self, column: &str) -> Option<&CellValue> {
        let wanted = column.trim().to_lowercase();
        self.0
            .iter()
            .filter(|(name, _)| name.trim().to_lowercase() == wanted)
            .map(|(_, value)| value)
            .find(|value| !value.is_blank())
    }

    /// Column names in sheet order, repeats included
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (column, value) in &self.0 {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RawRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawRowVisitor)
    }
}

struct RawRowVisitor;

impl<'de> Visitor<'de> for RawRowVisitor {
    type Value = RawRow;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of column names to cell values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawRow, A::Error> {
        let mut cells = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((column, value)) = access.next_entry::<String, CellValue>()? {
            cells.push((column, value));
        }
        Ok(RawRow(cells))
    }
}

/// Canonical shortage entry for one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortageRecord {
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Required quantity must not be negative"))]
    pub required: f64,
    #[validate(range(min = 0.0, message = "Free stock must not be negative"))]
    pub free_stock: f64,
    #[validate(range(min = 0.0, message = "Shortage must not be negative"))]
    pub shortage: f64,
    pub lead_time_days: u32,
}

impl ShortageRecord {
    /// Build a record whose shortage is `max(required - free_stock, 0)`
    pub fn derived(
        description: impl Into<String>,
        required: f64,
        free_stock: f64,
        lead_time_days: u32,
    ) -> Self {
        let required = non_negative(required);
        let free_stock = non_negative(free_stock);

        Self {
            description: description.into(),
            required,
            free_stock,
            shortage: non_negative(required - free_stock),
            lead_time_days,
        }
    }

    /// Build a record using a shortage quantity supplied by the source
    pub fn with_source_shortage(
        description: impl Into<String>,
        required: f64,
        free_stock: f64,
        shortage: f64,
        lead_time_days: u32,
    ) -> Self {
        Self {
            description: description.into(),
            required: non_negative(required),
            free_stock: non_negative(free_stock),
            shortage: non_negative(shortage),
            lead_time_days,
        }
    }

    pub fn is_short(&self) -> bool {
        self.shortage > 0.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
