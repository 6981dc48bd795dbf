//! Consequences of accidents per region (deaths and injuries).

use std::collections::BTreeMap;

use crate::model::{AccidentRecord, Region};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionConsequences {
    pub region: Region,
    pub killed: u64,
    pub severely_injured: u64,
    pub lightly_injured: u64,
    pub accidents: u64,
}

/// Totals per region, sorted by accident count, highest first.
pub fn consequences_by_region(records: &[AccidentRecord]) -> Vec<RegionConsequences> {
    let mut totals: BTreeMap<Region, RegionConsequences> = BTreeMap::new();

    for r in records {
        let entry = totals.entry(r.region).or_insert_with(|| RegionConsequences {
            region: r.region,
            killed: 0,
            severely_injured: 0,
            lightly_injured: 0,
            accidents: 0,
        });
        entry.killed += u64::from(r.killed);
        entry.severely_injured += u64::from(r.severely_injured);
        entry.lightly_injured += u64::from(r.lightly_injured);
        entry.accidents += 1;
    }

    let mut rows: Vec<_> = totals.into_values().collect();
    rows.sort_by(|a, b| {
        b.accidents
            .cmp(&a.accidents)
            .then_with(|| a.region.code().cmp(b.region.code()))
    });
    rows
}
