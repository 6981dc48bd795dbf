//! Accident counts per year and region.

use std::collections::BTreeMap;

use crate::model::{AccidentRecord, Region};

pub type YearRegionCounts = BTreeMap<i32, BTreeMap<Region, usize>>;

/// Number of accidents per year, per region. Regions without accidents in
/// a year are absent from that year's map.
pub fn accidents_count(records: &[AccidentRecord]) -> YearRegionCounts {
    let mut count: YearRegionCounts = BTreeMap::new();
    for record in records {
        *count
            .entry(record.year())
            .or_default()
            .entry(record.region)
            .or_insert(0) += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::sample_record;
    use chrono::NaiveDate;

    #[test]
    fn test_counts_split_by_year_and_region() {
        let mut late = sample_record(Region::Pha);
        late.date = NaiveDate::from_ymd_opt(2017, 12, 31).unwrap();
        let records = vec![
            sample_record(Region::Pha),
            sample_record(Region::Pha),
            sample_record(Region::Stc),
            late,
        ];

        let count = accidents_count(&records);
        assert_eq!(count.keys().copied().collect::<Vec<_>>(), vec![2016, 2017]);
        assert_eq!(count[&2016][&Region::Pha], 2);
        assert_eq!(count[&2016][&Region::Stc], 1);
        assert_eq!(count[&2017][&Region::Pha], 1);
        assert!(!count[&2017].contains_key(&Region::Stc));
    }

    #[test]
    fn test_empty_input() {
        assert!(accidents_count(&[]).is_empty());
    }
}
