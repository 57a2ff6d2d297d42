//! BOM (Bill of Materials) Build Analysis
//!
//! Costing decoder, shortage normalizer and the query layer over both, plus
//! the sheet reader that feeds the normalizer.

pub mod costing;
pub mod filter;
pub mod normalizer;
pub mod aggregator;
pub mod sheet;

pub use costing::{decode_lines, extract_costing, extract_costing_filtered, LINE_TOTAL_HEADER};
pub use filter::LineFilter;
pub use normalizer::{CanonicalField, FieldAliases, ShortageMode, ShortageNormalizer};
pub use aggregator::{BuildQueries, BuildSession};
pub use sheet::{ParsedSheet, SheetFormat, SheetReader};
