//! Chart-facing series: the stored record set reshaped into index-aligned
//! arrays, plus quarter-over-quarter growth-rate formatting.

use indexmap::IndexMap;

use crate::models::{QuarterlyRecord, TOTAL_KEY};

/// Ordered series consumed by the charting layer.
///
/// `quarters`, every vector in `segments`, `totals`, and `growth_rates` are
/// all the same length and index-aligned by quarter.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueSeries {
    pub quarters: Vec<String>,
    pub segments: IndexMap<String, Vec<i64>>,
    pub totals: Vec<i64>,
    pub growth_rates: Vec<String>,
}

/// Reshape chronological records into per-segment series.
///
/// A segment missing from some record contributes 0 at that index so every
/// series keeps the same length.
pub fn build_series(records: &[QuarterlyRecord]) -> RevenueSeries {
    let quarters: Vec<String> = records.iter().map(|r| r.quarter_label.clone()).collect();

    let mut segments: IndexMap<String, Vec<i64>> = IndexMap::new();
    for record in records {
        for key in record.segments.keys() {
            if key != TOTAL_KEY {
                segments.entry(key.clone()).or_default();
            }
        }
    }
    for (key, values) in segments.iter_mut() {
        values.extend(records.iter().map(|r| r.segment(key).unwrap_or(0)));
    }

    let totals: Vec<i64> = records.iter().map(|r| r.total_revenue).collect();
    let growth_rates = growth_rates(&totals);

    RevenueSeries {
        quarters,
        segments,
        totals,
        growth_rates,
    }
}

/// Quarter-over-quarter growth as a signed percentage string, two decimal
/// places: `+87.80%`, `-3.10%`. A zero previous value reports `0.00%`.
pub fn growth_rate(current: i64, previous: i64) -> String {
    if previous == 0 {
        return "0.00%".to_string();
    }
    let rate = ((current - previous) as f64 / previous as f64) * 100.0;
    if rate > 0.0 {
        format!("+{rate:.2}%")
    } else {
        format!("{rate:.2}%")
    }
}

/// Growth rate per quarter, aligned with the input; the first entry has no
/// predecessor and reports `0.00%`.
pub fn growth_rates(totals: &[i64]) -> Vec<String> {
    totals
        .iter()
        .enumerate()
        .map(|(i, &total)| {
            if i == 0 {
                "0.00%".to_string()
            } else {
                growth_rate(total, totals[i - 1])
            }
        })
        .collect()
}
