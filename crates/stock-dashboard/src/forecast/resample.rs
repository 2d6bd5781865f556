//! Calendar aggregation of daily comparison rows

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Actual and predicted close for one date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub date: NaiveDate,
    pub original_test_data: f64,
    pub predictions: f64,
}

/// Sunday closing the week that contains `date`
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - i64::from(date.weekday().num_days_from_monday());
    date + Duration::days(days_to_sunday)
}

/// Mean of both columns per calendar week, labelled by the week's Sunday
///
/// Weeks without rows do not appear in the output.
pub fn weekly_means(rows: &[ComparisonRow]) -> Vec<ComparisonRow> {
    let mut weeks: BTreeMap<NaiveDate, (f64, f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = weeks.entry(week_ending(row.date)).or_insert((0.0, 0.0, 0));
        entry.0 += row.original_test_data;
        entry.1 += row.predictions;
        entry.2 += 1;
    }

    weeks
        .into_iter()
        .map(|(date, (original, predicted, n))| ComparisonRow {
            date,
            original_test_data: original / n as f64,
            predictions: predicted / n as f64,
        })
        .collect()
}
