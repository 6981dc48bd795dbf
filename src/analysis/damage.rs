//! Vehicle damage against main cause, per region.

use crate::analysis::categories::{CauseGroup, DamageBin};
use crate::model::{AccidentRecord, Region};

/// Accident counts indexed `[damage bin][cause group]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageTable {
    pub region: Region,
    pub counts: [[u64; CauseGroup::ALL.len()]; DamageBin::ALL.len()],
}

impl DamageTable {
    pub fn get(&self, bin: DamageBin, cause: CauseGroup) -> u64 {
        self.counts[bin.index()][cause.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Crosstab of one region's accidents. Records whose cause code falls
/// outside the published groups are not counted.
pub fn damage_table(records: &[AccidentRecord], region: Region) -> DamageTable {
    let mut table = DamageTable {
        region,
        counts: Default::default(),
    };

    for r in records.iter().filter(|r| r.region == region) {
        if let Some(cause) = CauseGroup::from_code(r.cause) {
            let bin = DamageBin::from_hundreds(r.vehicle_damage);
            table.counts[bin.index()][cause.index()] += 1;
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::sample_record;

    fn record(region: Region, cause: u16, damage: u32) -> AccidentRecord {
        let mut r = sample_record(region);
        r.cause = cause;
        r.vehicle_damage = damage;
        r
    }

    #[test]
    fn test_crosstab_counts_only_the_region_and_known_causes() {
        let records = vec![
            record(Region::Jhm, 201, 100),
            record(Region::Jhm, 205, 400),
            record(Region::Jhm, 601, 12000),
            record(Region::Jhm, 999, 100),
            record(Region::Pha, 201, 100),
        ];

        let t = damage_table(&records, Region::Jhm);
        assert_eq!(t.region, Region::Jhm);
        assert_eq!(t.get(DamageBin::Below50, CauseGroup::Speeding), 2);
        assert_eq!(t.get(DamageBin::Above1000, CauseGroup::TechnicalDefect), 1);
        assert_eq!(t.total(), 3);
        assert_eq!(t.max_count(), 2);
    }

    #[test]
    fn test_empty_region_gives_zero_table() {
        let t = damage_table(&[], Region::Plk);
        assert_eq!(t.total(), 0);
        assert_eq!(t.max_count(), 0);
    }
}
