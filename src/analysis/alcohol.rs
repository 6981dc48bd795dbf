//! Alcohol involvement by main cause.
//!
//! Records where the alcohol test was not performed or was refused
//! (p11 = 4 or 5) are left out; alcohol counts as present for p11 >= 7.

use crate::analysis::categories::CauseGroup;
use crate::model::{AccidentRecord, Region, LOCALITY_IN_TOWN};

#[derive(Debug, Clone, PartialEq)]
pub struct AlcoholCauseRow {
    pub cause: CauseGroup,
    /// Accidents of this cause with alcohol present.
    pub absolute: u64,
    /// Share of alcohol accidents among all accidents of this cause, in %.
    pub relative_pct: f64,
}

/// One row per cause group that occurs in the data, sorted ascending by
/// the relative share (the last row is the most alcohol-prone cause).
pub fn alcohol_cause_table(records: &[AccidentRecord]) -> Vec<AlcoholCauseRow> {
    let mut totals = [0u64; CauseGroup::ALL.len()];
    let mut with_alcohol = [0u64; CauseGroup::ALL.len()];

    for r in records.iter().filter(|r| r.alcohol_known()) {
        if let Some(cause) = CauseGroup::from_code(r.cause) {
            totals[cause.index()] += 1;
            if r.alcohol_present() {
                with_alcohol[cause.index()] += 1;
            }
        }
    }

    let mut rows: Vec<AlcoholCauseRow> = CauseGroup::ALL
        .into_iter()
        .filter(|c| totals[c.index()] > 0)
        .map(|c| AlcoholCauseRow {
            cause: c,
            absolute: with_alcohol[c.index()],
            relative_pct: 100.0 * with_alcohol[c.index()] as f64 / totals[c.index()] as f64,
        })
        .collect();
    rows.sort_by(|a, b| a.relative_pct.total_cmp(&b.relative_pct));
    rows
}

/// The cause with the most alcohol accidents in absolute numbers.
pub fn most_frequent_alcohol_cause(rows: &[AlcoholCauseRow]) -> Option<&AlcoholCauseRow> {
    rows.iter().max_by_key(|r| r.absolute)
}

/// Geolocated accidents of a region where alcohol was present.
pub fn alcohol_accidents(records: &[AccidentRecord], region: Region) -> Vec<&AccidentRecord> {
    records
        .iter()
        .filter(|r| r.region == region && r.has_coordinates())
        .filter(|r| r.alcohol_known() && r.alcohol_present())
        .collect()
}

/// Share (%) of a region's geolocated alcohol accidents that happened in
/// town. `None` when there are none.
pub fn locality_share(records: &[AccidentRecord], region: Region) -> Option<f64> {
    let drunk = alcohol_accidents(records, region);
    if drunk.is_empty() {
        return None;
    }
    let in_town = drunk.iter().filter(|r| r.locality == LOCALITY_IN_TOWN).count();
    Some(100.0 * in_town as f64 / drunk.len() as f64)
}
