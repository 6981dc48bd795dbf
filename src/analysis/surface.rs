//! Monthly accident counts per road surface state.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use crate::analysis::categories::SURFACE_STATES;
use crate::model::{AccidentRecord, Region};

/// One region's monthly series. `counts[i]` belongs to `months[i]`
/// (first day of the month) and is indexed by surface state.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSeries {
    pub region: Region,
    pub months: Vec<NaiveDate>,
    pub counts: Vec<[u64; SURFACE_STATES]>,
}

impl SurfaceSeries {
    /// Counts of one surface state over time.
    pub fn state_series(&self, state: usize) -> Vec<u64> {
        self.counts.iter().map(|c| c[state]).collect()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Builds the series for a region. Months between the first and last
/// accident that have no accidents are present with zero counts. Surface
/// codes outside 0..=9 are ignored.
pub fn surface_series(records: &[AccidentRecord], region: Region) -> SurfaceSeries {
    let mut by_month: BTreeMap<NaiveDate, [u64; SURFACE_STATES]> = BTreeMap::new();

    for r in records.iter().filter(|r| r.region == region) {
        let state = usize::from(r.surface_state);
        let row = by_month.entry(month_start(r.date)).or_default();
        if state < SURFACE_STATES {
            row[state] += 1;
        }
    }

    let mut series = SurfaceSeries {
        region,
        months: Vec::new(),
        counts: Vec::new(),
    };

    let (Some(&first), Some(&last)) = (by_month.keys().next(), by_month.keys().next_back()) else {
        return series;
    };

    let mut month = Some(first);
    while let Some(m) = month.filter(|m| *m <= last) {
        series.months.push(m);
        series.counts.push(by_month.get(&m).copied().unwrap_or_default());
        month = next_month(m);
    }
    series
}
