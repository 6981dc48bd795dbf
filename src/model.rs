/// Core data types for the road accident statistics pipeline.
///
/// This module defines the shared domain model imported by all other modules:
/// the region identifiers, the typed accident record parsed from the police
/// CSV exports, and the crate-wide error type. It contains no I/O.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Column layout of the police CSV export
// ---------------------------------------------------------------------------

/// Number of data columns in every CSV row (the region is appended by us).
pub const CSV_COLUMNS: usize = 64;

/// Official column names, in file order. `weekday(p2a)` is the derived
/// day-of-week column; `a`..`t` are the geo/address block.
pub const CSV_HEADER: [&str; CSV_COLUMNS] = [
    "p1", "p36", "p37", "p2a", "weekday(p2a)", "p2b", "p6", "p7", "p8", "p9",
    "p10", "p11", "p12", "p13a", "p13b", "p13c", "p14", "p15", "p16", "p17",
    "p18", "p19", "p20", "p21", "p22", "p23", "p24", "p27", "p28", "p34",
    "p35", "p39", "p44", "p45a", "p47", "p48a", "p49", "p50a", "p50b", "p51",
    "p52", "p53", "p55a", "p57", "p58", "a", "b", "d", "e", "f",
    "g", "h", "i", "j", "k", "l", "n", "o", "p", "q",
    "r", "s", "t", "p5a",
];

/// Returns the file position of a named column.
pub fn column_index(name: &str) -> Option<usize> {
    CSV_HEADER.iter().position(|c| *c == name)
}

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// The fourteen administrative regions of the Czech Republic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    Pha,
    Stc,
    Jhc,
    Plk,
    Ulk,
    Hkk,
    Jhm,
    Msk,
    Olk,
    Zlk,
    Vys,
    Pak,
    Lbk,
    Kvk,
}

impl Region {
    pub const ALL: [Region; 14] = [
        Region::Pha,
        Region::Stc,
        Region::Jhc,
        Region::Plk,
        Region::Ulk,
        Region::Hkk,
        Region::Jhm,
        Region::Msk,
        Region::Olk,
        Region::Zlk,
        Region::Vys,
        Region::Pak,
        Region::Lbk,
        Region::Kvk,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Region::Pha => "PHA",
            Region::Stc => "STC",
            Region::Jhc => "JHC",
            Region::Plk => "PLK",
            Region::Ulk => "ULK",
            Region::Hkk => "HKK",
            Region::Jhm => "JHM",
            Region::Msk => "MSK",
            Region::Olk => "OLK",
            Region::Zlk => "ZLK",
            Region::Vys => "VYS",
            Region::Pak => "PAK",
            Region::Lbk => "LBK",
            Region::Kvk => "KVK",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = AccidentError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Region::ALL
            .into_iter()
            .find(|r| r.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AccidentError::UnknownRegion(wanted.to_string()))
    }
}

impl Serialize for Region {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Accident record
// ---------------------------------------------------------------------------

/// Locality code (p5a) for accidents inside a municipality.
pub const LOCALITY_IN_TOWN: u8 = 1;
/// Locality code (p5a) for accidents outside a municipality.
pub const LOCALITY_OUTSIDE: u8 = 2;

/// One accident, i.e. one row of a regional CSV file.
///
/// Only the columns used by the analyses are kept, typed. Damage values
/// are in hundreds of CZK as published. Coordinates are S-JTSK
/// (EPSG:5514) and are `None` when the source cell was empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentRecord {
    pub id: String,
    pub road_kind: u8,          // p36
    pub road_number: String,    // p37
    pub date: NaiveDate,        // p2a
    pub weekday: u8,
    pub time: u16,              // p2b, hhmm; 25xx = unknown hour
    pub kind: u8,               // p6
    pub collision: u8,          // p7
    pub obstacle: u8,           // p8
    pub character: u8,          // p9
    pub fault: u8,              // p10
    pub alcohol: u8,            // p11
    pub cause: u16,             // p12
    pub killed: u16,            // p13a
    pub severely_injured: u16,  // p13b
    pub lightly_injured: u16,   // p13c
    pub total_damage: u32,      // p14
    pub surface_kind: u8,       // p15
    pub surface_state: u8,      // p16
    pub weather: u8,            // p18
    pub visibility: u8,         // p19
    pub vehicles: u8,           // p34
    pub vehicle_kind: u8,       // p44
    pub vehicle_make: u8,       // p45a
    pub vehicle_damage: u32,    // p53
    pub x: Option<f64>,         // d
    pub y: Option<f64>,         // e
    pub locality: u8,           // p5a
    pub region: Region,
}

impl AccidentRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Both coordinates present and finite.
    pub fn has_coordinates(&self) -> bool {
        matches!((self.x, self.y), (Some(x), Some(y)) if x.is_finite() && y.is_finite())
    }

    /// Alcohol codes 4 and 5 mean the test was not performed or refused.
    pub fn alcohol_known(&self) -> bool {
        self.alcohol != 4 && self.alcohol != 5
    }

    /// Codes 7 and above mean alcohol was detected on the at-fault driver.
    pub fn alcohol_present(&self) -> bool {
        self.alcohol >= 7
    }

    pub fn is_fatal(&self) -> bool {
        self.killed > 0
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise while fetching, parsing or analysing accident data.
#[derive(Debug, Error)]
pub enum AccidentError {
    /// Non-2xx HTTP response from the data portal.
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unknown region: {0}")]
    UnknownRegion(String),
    /// The archive exists but has no member for the region.
    #[error("No data for region {region} in {archive}")]
    MissingRegionFile { region: Region, archive: String },
    #[error("No data archives found in {0}")]
    NoArchives(String),
    #[error("Dataset is empty")]
    EmptyDataset,
    #[error("Unsupported transform from {from} to {to}")]
    UnsupportedTransform { from: String, to: String },
    #[error("Plot error: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, AccidentError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
