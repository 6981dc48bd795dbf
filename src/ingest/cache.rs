//! Gzip-compressed JSON record files.
//!
//! Used both for the per-region caches kept next to the downloaded
//! archives and for the combined dataset consumed by the analyses.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::model::{AccidentRecord, Result};

pub fn write_records(path: &Path, records: &[AccidentRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    serde_json::to_writer(&mut encoder, records)?;
    encoder.finish()?.flush()?;
    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<AccidentRecord>> {
    read_records_sized(path).map(|(records, _)| records)
}

/// Like `read_records`, also returning the uncompressed JSON size in bytes.
pub fn read_records_sized(path: &Path) -> Result<(Vec<AccidentRecord>, usize)> {
    let file = File::open(path)?;
    let mut text = String::new();
    GzDecoder::new(BufReader::new(file)).read_to_string(&mut text)?;
    let records = serde_json::from_str(&text)?;
    Ok((records, text.len()))
}
