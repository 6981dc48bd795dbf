/// Region registry for the accident statistics pipeline.
///
/// Defines the canonical list of regions published by the police open data
/// portal, along with the CSV member each region occupies inside the
/// `datagis` archives. This is the single source of truth for archive file
/// names; all other modules should reference regions from here rather
/// than hardcoding `"06.csv"`.

use crate::model::Region;

// ---------------------------------------------------------------------------
// Region metadata
// ---------------------------------------------------------------------------

/// Metadata for a single region.
pub struct RegionInfo {
    pub region: Region,
    /// Official name of the region.
    pub name: &'static str,
    /// Member name of the region's CSV inside every data archive.
    pub csv_name: &'static str,
}

/// All regions in the order the portal numbers their CSV files.
pub static REGION_REGISTRY: &[RegionInfo] = &[
    RegionInfo { region: Region::Pha, name: "Hlavní město Praha", csv_name: "00.csv" },
    RegionInfo { region: Region::Stc, name: "Středočeský kraj", csv_name: "01.csv" },
    RegionInfo { region: Region::Jhc, name: "Jihočeský kraj", csv_name: "02.csv" },
    RegionInfo { region: Region::Plk, name: "Plzeňský kraj", csv_name: "03.csv" },
    RegionInfo { region: Region::Ulk, name: "Ústecký kraj", csv_name: "04.csv" },
    RegionInfo { region: Region::Hkk, name: "Královéhradecký kraj", csv_name: "05.csv" },
    RegionInfo { region: Region::Jhm, name: "Jihomoravský kraj", csv_name: "06.csv" },
    RegionInfo { region: Region::Msk, name: "Moravskoslezský kraj", csv_name: "07.csv" },
    RegionInfo { region: Region::Olk, name: "Olomoucký kraj", csv_name: "14.csv" },
    RegionInfo { region: Region::Zlk, name: "Zlínský kraj", csv_name: "15.csv" },
    RegionInfo { region: Region::Vys, name: "Kraj Vysočina", csv_name: "16.csv" },
    RegionInfo { region: Region::Pak, name: "Pardubický kraj", csv_name: "17.csv" },
    RegionInfo { region: Region::Lbk, name: "Liberecký kraj", csv_name: "18.csv" },
    RegionInfo { region: Region::Kvk, name: "Karlovarský kraj", csv_name: "19.csv" },
];

/// Regions compared side by side in the damage and surface charts.
pub const CHART_REGIONS: [Region; 4] = [Region::Hkk, Region::Jhm, Region::Pha, Region::Plk];

/// Returns the codes of all registered regions.
pub fn all_region_codes() -> Vec<&'static str> {
    REGION_REGISTRY.iter().map(|r| r.region.code()).collect()
}

/// Looks up a region by its three-letter code. Returns `None` if not found.
pub fn find_region(code: &str) -> Option<&'static RegionInfo> {
    REGION_REGISTRY
        .iter()
        .find(|r| r.region.code().eq_ignore_ascii_case(code.trim()))
}

/// Registry entry for a region. The registry is ordered like `Region::ALL`.
pub fn region_info(region: Region) -> &'static RegionInfo {
    &REGION_REGISTRY[region as usize]
}

/// Parses a list of region codes, e.g. from the command line.
/// An empty list means all regions.
pub fn parse_region_list(codes: &[String]) -> crate::model::Result<Vec<Region>> {
    if codes.is_empty() {
        return Ok(Region::ALL.to_vec());
    }
    codes
        .iter()
        .flat_map(|c| c.split(','))
        .filter(|c| !c.trim().is_empty())
        .map(str::parse)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
