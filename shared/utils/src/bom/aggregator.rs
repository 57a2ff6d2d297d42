//! Aggregator / Query Layer
//!
//! Pure queries over one costing result and one shortage record set. The
//! caller owns the [`BuildSession`] and hands it in per query; nothing here
//! keeps state between calls.

use bomai_models::{CostSummary, CostingExtractionResult, KitDateAssessment, ShortageRecord};
use chrono::{Days, Local, NaiveDate};

/// Most recent uploads of one user session.
///
/// Each upload replaces its half wholesale; records are never edited in place.
#[derive(Debug, Clone, Default)]
pub struct BuildSession {
    costing: Option<CostingExtractionResult>,
    records: Vec<ShortageRecord>,
}

impl BuildSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_costing(&mut self, costing: CostingExtractionResult) {
        self.costing = Some(costing);
    }

    pub fn replace_records(&mut self, records: Vec<ShortageRecord>) {
        self.records = records;
    }

    pub fn costing(&self) -> Option<&CostingExtractionResult> {
        self.costing.as_ref()
    }

    pub fn records(&self) -> &[ShortageRecord] {
        &self.records
    }

    pub fn queries(&self) -> BuildQueries<'_> {
        BuildQueries::new(self.costing.as_ref(), &self.records)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BuildQueries<'a> {
    costing: Option<&'a CostingExtractionResult>,
    records: &'a [ShortageRecord],
}

impl<'a> BuildQueries<'a> {
    pub fn new(costing: Option<&'a CostingExtractionResult>, records: &'a [ShortageRecord]) -> Self {
        Self { costing, records }
    }

    /// Stored total, or unavailable when no costing has been decoded
    pub fn total_cost(&self) -> CostSummary {
        match self.costing {
            Some(costing) => CostSummary {
                total_cost: Some(costing.formatted_total()),
                lines_counted: costing.line_count(),
            },
            None => CostSummary::unavailable(),
        }
    }

    /// Records with a positive shortage, in upload order
    pub fn shortages(&self) -> Vec<ShortageRecord> {
        self.short_records().cloned().collect()
    }

    /// Shortages ranked by lead time, longest first. Equal lead times keep
    /// upload order.
    pub fn order_priority(&self) -> Vec<ShortageRecord> {
        let mut ranked = self.shortages();
        ranked.sort_by(|a, b| b.lead_time_days.cmp(&a.lead_time_days));
        ranked
    }

    /// At risk when `today + longest shortage lead time` falls after `kit_date`.
    pub fn kit_date_risk(&self, kit_date: NaiveDate, today: NaiveDate) -> KitDateAssessment {
        let driver = self
            .short_records()
            .fold(None::<&ShortageRecord>, |longest, record| match longest {
                Some(current) if current.lead_time_days >= record.lead_time_days => Some(current),
                _ => Some(record),
            });

        let max_lead_time_days = driver.map(|record| record.lead_time_days);
        let earliest_available = max_lead_time_days
            .and_then(|days| today.checked_add_days(Days::new(u64::from(days))));
        // A date beyond the calendar range is certainly after the kit date
        let at_risk = match (max_lead_time_days, earliest_available) {
            (None, _) => false,
            (Some(_), Some(available)) => available > kit_date,
            (Some(_), None) => true,
        };

        KitDateAssessment {
            kit_date,
            today,
            days_until_kit: (kit_date - today).num_days(),
            max_lead_time_days,
            driving_item: driver.map(|record| record.description.clone()),
            earliest_available,
            at_risk,
        }
    }

    /// [`kit_date_risk`](Self::kit_date_risk) against the local calendar date
    pub fn kit_date_risk_today(&self, kit_date: NaiveDate) -> KitDateAssessment {
        self.kit_date_risk(kit_date, Local::now().date_naive())
    }

    fn short_records(&self) -> impl Iterator<Item = &'a ShortageRecord> {
        let records: &'a [ShortageRecord] = self.records;
        records.iter().filter(|record| record.is_short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use bomai_models::{CostingStrategy, PricedLine};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn record(description: &str, shortage: f64, lead: u32) -> ShortageRecord {
        ShortageRecord::with_source_shortage(description, shortage, 0.0, shortage, lead)
    }

    fn sample_records() -> Vec<ShortageRecord> {
        vec![
            record("Bolt", 6.0, 7),
            record("Nut", 0.0, 90),
            record("Gland", 2.0, 30),
            record("Washer", 1.0, 7),
            record("Cable", 4.0, 30),
        ]
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_total_cost_unavailable_without_costing() {
        let records = sample_records();
        let summary = BuildQueries::new(None, &records).total_cost();

        assert_eq!(summary, CostSummary::unavailable());
    }

    #[test]
    fn test_total_cost_reports_stored_result() {
        let lines = vec![PricedLine::new(BigDecimal::from_str("13.50").unwrap())];
        let costing = CostingExtractionResult::from_lines(CostingStrategy::LineAnchored, &lines).unwrap();
        let mut session = BuildSession::new();
        session.replace_costing(costing);

        let summary = session.queries().total_cost();
        assert_eq!(summary.total_cost.as_deref(), Some("13.50"));
        assert_eq!(summary.lines_counted, 1);
    }

    #[test]
    fn test_shortages_keep_upload_order() {
        let records = sample_records();
        let names: Vec<String> = BuildQueries::new(None, &records)
            .shortages()
            .into_iter()
            .map(|r| r.description)
            .collect();

        assert_eq!(names, vec!["Bolt", "Gland", "Washer", "Cable"]);
    }

    #[test]
    fn test_order_priority_is_stable_descending() {
        let records = sample_records();
        let names: Vec<String> = BuildQueries::new(None, &records)
            .order_priority()
            .into_iter()
            .map(|r| r.description)
            .collect();

        assert_eq!(names, vec!["Gland", "Cable", "Bolt", "Washer"]);
    }

    #[test]
    fn test_kit_date_risk_thresholds() {
        let records = vec![record("Gland", 2.0, 30), record("Nut", 0.0, 120)];
        let queries = BuildQueries::new(None, &records);
        let today = day(2026, 10, 17);

        let near = queries.kit_date_risk(day(2026, 10, 27), today);
        assert!(near.at_risk);
        assert_eq!(near.max_lead_time_days, Some(30));
        assert_eq!(near.driving_item.as_deref(), Some("Gland"));
        assert_eq!(near.earliest_available, Some(day(2026, 11, 16)));
        assert_eq!(near.days_until_kit, 10);

        let far = queries.kit_date_risk(day(2026, 11, 26), today);
        assert!(!far.at_risk);

        let exact = queries.kit_date_risk(day(2026, 11, 16), today);
        assert!(!exact.at_risk);
    }

    #[test]
    fn test_kit_date_risk_without_shortages() {
        let records = vec![record("Nut", 0.0, 120)];
        let assessment = BuildQueries::new(None, &records).kit_date_risk(day(2026, 1, 1), day(2026, 10, 17));

        assert!(!assessment.at_risk);
        assert_eq!(assessment.max_lead_time_days, None);
        assert_eq!(assessment.days_until_kit, -289);
    }

    #[test]
    fn test_first_longest_item_drives_kit_date() {
        let records = sample_records();
        let assessment = BuildQueries::new(None, &records).kit_date_risk(day(2027, 1, 1), day(2026, 10, 17));

        assert_eq!(assessment.driving_item.as_deref(), Some("Gland"));
    }

    #[test]
    fn test_replacing_records_is_wholesale() {
        let mut session = BuildSession::new();
        session.replace_records(sample_records());
        session.replace_records(vec![record("Spring", 1.0, 3)]);

        assert_eq!(session.records().len(), 1);
        assert!(session.costing().is_none());
    }

    proptest! {
        #[test]
        fn prop_order_priority_is_sorted_permutation_of_shortages(
            rows in prop::collection::vec((0u32..5, 0u32..60), 0..40)
        ) {
            let records: Vec<ShortageRecord> = rows
                .iter()
                .enumerate()
                .map(|(i, (short, lead))| record(&format!("P{i}"), *short as f64, *lead))
                .collect();
            let queries = BuildQueries::new(None, &records);

            let shortages = queries.shortages();
            let ranked = queries.order_priority();

            prop_assert!(shortages.iter().all(|r| r.shortage > 0.0));
            prop_assert_eq!(shortages.len(), ranked.len());
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].lead_time_days >= pair[1].lead_time_days);
                if pair[0].lead_time_days == pair[1].lead_time_days {
                    let first: usize = pair[0].description[1..].parse().unwrap();
                    let second: usize = pair[1].description[1..].parse().unwrap();
                    prop_assert!(first < second);
                }
            }

            prop_assert_eq!(queries.order_priority(), ranked);
            prop_assert_eq!(queries.shortages(), shortages);
        }
    }
}
