//! Two-period comparison series.

use serde::Serialize;
use std::collections::BTreeMap;

use super::bundle::{DailyPoint, Totals};

pub const COLOR_A: &str = "#2b7fff";
pub const COLOR_B: &str = "#ffa15a";

/// Days always covered by the zipped daily series.
pub const MIN_ZIPPED_DAYS: u32 = 31;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSeries {
    pub label_a: String,
    pub label_b: String,
    pub daily: Vec<DailyPair>,
    /// Exactly two entries, A then B
    pub monthly: Vec<ComparisonEntry>,
}

impl ComparisonSeries {
    pub fn new(
        label_a: String,
        label_b: String,
        daily_a: &[DailyPoint],
        daily_b: &[DailyPoint],
        totals_a: Totals,
        totals_b: Totals,
    ) -> Self {
        let monthly = vec![
            ComparisonEntry::new(&label_a, totals_a, COLOR_A),
            ComparisonEntry::new(&label_b, totals_b, COLOR_B),
        ];
        Self {
            daily: zip_daily(daily_a, daily_b),
            monthly,
            label_a,
            label_b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPair {
    pub day: u32,
    pub count_a: u64,
    pub value_a: f64,
    pub count_b: u64,
    pub value_b: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    pub name: String,
    pub count: u64,
    pub value: f64,
    pub color: String,
}

impl ComparisonEntry {
    fn new(name: &str, totals: Totals, color: &str) -> Self {
        Self {
            name: name.to_string(),
            count: totals.count,
            value: totals.value,
            color: color.to_string(),
        }
    }
}

/// Pairs two daily series by day of month.
///
/// Covers days `1..=max(31, largest day present)`; a day missing on one side
/// reads as zero count and zero value.
pub fn zip_daily(a: &[DailyPoint], b: &[DailyPoint]) -> Vec<DailyPair> {
    let index = |series: &[DailyPoint]| -> BTreeMap<u32, Totals> {
        series
            .iter()
            .map(|point| (point.day, Totals::new(point.count, point.value)))
            .collect()
    };
    let a = index(a);
    let b = index(b);

    let last = a
        .keys()
        .chain(b.keys())
        .copied()
        .max()
        .unwrap_or(0)
        .max(MIN_ZIPPED_DAYS);

    (1..=last)
        .map(|day| {
            let left = a.get(&day).copied().unwrap_or_default();
            let right = b.get(&day).copied().unwrap_or_default();
            DailyPair {
                day,
                count_a: left.count,
                value_a: left.value,
                count_b: right.count,
                value_b: right.value,
            }
        })
        .collect()
}
