//! Czech police road-accident statistics: download the yearly open data
//! archives, parse them into typed records, run the analyses and render
//! the charts.

pub mod analysis;
pub mod config;
pub mod geo;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod plot;
pub mod regions;
pub mod verify;

pub use model::{AccidentError, AccidentRecord, Region, Result};
