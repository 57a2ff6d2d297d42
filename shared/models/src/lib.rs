//! # BOM AI Core Domain Models
//!
//! Data shapes shared by the costing decoder, the shortage normalizer and the
//! query layer. All models serialize with serde; wire names are camelCase.
//!
//! ## Key Models
//!
//! - **CostingExtractionResult**: summed line totals of a costing document
//! - **PricedLine**: one priced row found in costing text
//! - **RawRow** / **CellValue**: a loosely typed spreadsheet line
//! - **ShortageRecord**: canonical shortage entry with computed shortage quantity
//! - **CostSummary** / **KitDateAssessment**: query views

pub mod costing;
pub mod shortage;
pub mod query;


pub use costing::*;
pub use shortage::*;
pub use query::*;
