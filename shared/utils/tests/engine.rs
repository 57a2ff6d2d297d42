//! End-to-end checks of the build analysis engine: sheet bytes and costing
//! text in, query answers out.

use bomai_models::{CostingStrategy, ShortageRecord};
use bomai_utils::{
    extract_costing, BuildSession, ExtractionError, ShortageMode, ShortageNormalizer, SheetReader,
};
use chrono::NaiveDate;

const COSTING_TEXT: &str = "\
CIM50 Costing Report                Page 1
Stock Code   Description        Qty    Cost Price   Line Total
BOLT-M6      Bolt M6 x 20       10.00  0.25         2.50
GLD-20       Cable gland M20    2.00   4.75         9.50
CBL-3C       3 core cable       25.00  1.10         27.50
";

const SHORTAGE_CSV: &[u8] = b"\
Stock Code,Description,Qty Required,Free Stock,Shortage Qty,Lead Time (Days)
BOLT-M6,Bolt M6 x 20,10,4,6,7
GLD-20,Cable gland M20,2,0,2,30
CBL-3C,3 core cable,25,40,0,14
CON-8,Terminal block,8,2,6,30
";

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn loaded_session() -> BuildSession {
    let sheet = SheetReader::new()
        .read_bytes("shortage.csv", None, SHORTAGE_CSV, None)
        .unwrap();
    let records = ShortageNormalizer::new().normalize_strict(&sheet.rows).unwrap();
    let costing = extract_costing(COSTING_TEXT, CostingStrategy::LineAnchored).unwrap();

    let mut session = BuildSession::new();
    session.replace_records(records);
    session.replace_costing(costing);
    session
}

#[test]
fn test_both_strategies_agree_on_a_clean_table() {
    let line = extract_costing(COSTING_TEXT, CostingStrategy::LineAnchored).unwrap();
    let header = extract_costing(COSTING_TEXT, CostingStrategy::HeaderAnchored).unwrap();

    assert_eq!(line.formatted_total(), "39.50");
    assert_eq!(header.formatted_total(), "39.50");
    assert_eq!(line.line_count(), 3);
    assert_eq!(header.line_count(), 3);
}

#[test]
fn test_header_strategy_breaks_on_extra_numeric_column() {
    let text = "Qty Cost Price Discount Line Total\n1.00 10.00 0.50 9.50\n2.00 5.00 0.00 10.00\n";
    let result = extract_costing(text, CostingStrategy::HeaderAnchored).unwrap();

    // Row width assumption broken: the sum is wrong but still produced
    assert_ne!(result.formatted_total(), "19.50");
}

#[test]
fn test_sheet_to_queries() {
    let session = loaded_session();
    let queries = session.queries();

    assert_eq!(queries.total_cost().total_cost.as_deref(), Some("39.50"));

    let short: Vec<String> = queries.shortages().into_iter().map(|r| r.description).collect();
    assert_eq!(short, vec!["Bolt M6 x 20", "Cable gland M20", "Terminal block"]);

    let ranked: Vec<String> = queries.order_priority().into_iter().map(|r| r.description).collect();
    assert_eq!(ranked, vec!["Cable gland M20", "Terminal block", "Bolt M6 x 20"]);

    let risk = queries.kit_date_risk(date("2026-10-27"), date("2026-10-17"));
    assert!(risk.at_risk);
    assert_eq!(risk.driving_item.as_deref(), Some("Cable gland M20"));

    let safe = queries.kit_date_risk(date("2026-11-26"), date("2026-10-17"));
    assert!(!safe.at_risk);
}

#[test]
fn test_queries_are_idempotent() {
    let session = loaded_session();
    let queries = session.queries();

    assert_eq!(queries.total_cost(), queries.total_cost());
    assert_eq!(queries.shortages(), queries.shortages());
    assert_eq!(queries.order_priority(), queries.order_priority());
    assert_eq!(
        queries.kit_date_risk(date("2026-12-01"), date("2026-10-17")),
        queries.kit_date_risk(date("2026-12-01"), date("2026-10-17"))
    );
}

#[test]
fn test_trusted_source_shortage_overrides_derivation() {
    let csv = b"Description,Qty Required,Free Stock,Shortage\nBolt,10,4,1\n";
    let sheet = SheetReader::new().read_bytes("s.csv", None, csv, None).unwrap();

    let trusted = ShortageNormalizer::new()
        .with_mode(ShortageMode::TrustSourceShortage)
        .normalize(&sheet.rows);
    let derived = ShortageNormalizer::new().normalize(&sheet.rows);

    assert_eq!(trusted[0].shortage, 1.0);
    assert_eq!(derived[0], ShortageRecord::derived("Bolt", 10.0, 4.0, 0));
}

#[test]
fn test_failed_upload_leaves_previous_state() {
    let mut session = loaded_session();

    if let Ok(costing) = extract_costing("no prices here", CostingStrategy::LineAnchored) {
        session.replace_costing(costing);
    }

    assert_eq!(session.queries().total_cost().total_cost.as_deref(), Some("39.50"));
}

#[test]
fn test_unrecognized_sheet_is_malformed() {
    let csv = b"Colour,Size\nRed,M\n";
    let sheet = SheetReader::new().read_bytes("s.csv", None, csv, None).unwrap();

    assert!(matches!(
        ShortageNormalizer::new().normalize_strict(&sheet.rows),
        Err(ExtractionError::MalformedInput { .. })
    ));
}

#[test]
fn test_zero_cost_build_reports_cents() {
    let mut session = BuildSession::new();
    session.replace_costing(extract_costing("Free issue gland 0.00\nFree issue label 0.00", CostingStrategy::LineAnchored).unwrap());

    assert_eq!(session.queries().total_cost().total_cost.as_deref(), Some("0.00"));
}

#[test]
fn test_repeated_header_keeps_first_filled_cell() {
    let csv = b"Description,Qty Required,Free Stock,Qty Required\nBolt,10,4,\n";
    let sheet = SheetReader::new().read_bytes("s.csv", None, csv, None).unwrap();
    let records = ShortageNormalizer::new().normalize_strict(&sheet.rows).unwrap();

    assert_eq!(records, vec![ShortageRecord::derived("Bolt", 10.0, 4.0, 0)]);
}
