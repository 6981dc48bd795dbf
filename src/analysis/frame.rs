//! The combined accident dataset used by every analysis.

use std::collections::BTreeSet;
use std::mem::size_of;
use std::path::Path;

use crate::ingest::cache::{read_records_sized, write_records};
use crate::logging::{self, Stage};
use crate::model::{AccidentRecord, Region, Result};

const MIB: f64 = 1_048_576.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccidentFrame {
    pub records: Vec<AccidentRecord>,
}

impl AccidentFrame {
    pub fn new(records: Vec<AccidentRecord>) -> Self {
        Self { records }
    }

    /// Loads a dataset file written by `save`. With `verbose`, logs the
    /// size of the serialised text against the typed in-memory footprint.
    pub fn load(path: &Path, verbose: bool) -> Result<Self> {
        let (records, raw_bytes) = read_records_sized(path)?;
        let frame = Self::new(records);

        if verbose {
            logging::info(Stage::Analysis, None, &format!("orig_size={:.1} MB", raw_bytes as f64 / MIB));
            logging::info(
                Stage::Analysis,
                None,
                &format!("new_size={:.1} MB", frame.memory_usage_bytes() as f64 / MIB),
            );
        }
        Ok(frame)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_records(path, &self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Approximate heap + inline size of the records.
    pub fn memory_usage_bytes(&self) -> usize {
        let inline = self.records.capacity() * size_of::<AccidentRecord>();
        let heap: usize = self
            .records
            .iter()
            .map(|r| r.id.capacity() + r.road_number.capacity())
            .sum();
        inline + heap
    }

    pub fn filter_regions(&self, regions: &[Region]) -> AccidentFrame {
        Self::new(
            self.records
                .iter()
                .filter(|r| regions.contains(&r.region))
                .cloned()
                .collect(),
        )
    }

    pub fn years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(AccidentRecord::year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn regions(&self) -> Vec<Region> {
        self.records
            .iter()
            .map(|r| r.region)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::sample_record;
    use chrono::NaiveDate;

    fn frame() -> AccidentFrame {
        let mut b = sample_record(Region::Jhm);
        b.date = NaiveDate::from_ymd_opt(2019, 6, 1).unwrap();
        let mut c = sample_record(Region::Pha);
        c.date = NaiveDate::from_ymd_opt(2017, 3, 4).unwrap();
        AccidentFrame::new(vec![sample_record(Region::Jhm), b, c])
    }

    #[test]
    fn test_years_and_regions_are_sorted_and_distinct() {
        let f = frame();
        assert_eq!(f.years(), vec![2016, 2017, 2019]);
        assert_eq!(f.regions(), vec![Region::Pha, Region::Jhm]);
    }

    #[test]
    fn test_filter_regions() {
        let f = frame().filter_regions(&[Region::Jhm]);
        assert_eq!(f.len(), 2);
        assert!(f.records.iter().all(|r| r.region == Region::Jhm));
        assert!(frame().filter_regions(&[Region::Kvk]).is_empty());
    }

    #[test]
    fn test_save_then_load_verbose() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accidents.json.gz");
        let f = frame();
        f.save(&path).unwrap();

        let loaded = AccidentFrame::load(&path, true).unwrap();
        assert_eq!(loaded, f);
        assert!(loaded.memory_usage_bytes() >= 3 * size_of::<AccidentRecord>());
    }
}
