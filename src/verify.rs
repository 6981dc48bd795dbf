//! Data Source Verification Module
//!
//! Checks the data portal before a long download: is the index page
//! reachable, which yearly archives does it list, and does each archive
//! carry a readable CSV for every region.

use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use crate::config::Settings;
use crate::ingest::archive::parse_region_csv;
use crate::ingest::downloader::find_local_archives;
use crate::ingest::index::{extract_links, latest_archives, ArchiveName, Period};
use crate::model::{Region, Result};
use crate::regions::REGION_REGISTRY;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub source: String,
    pub index_reachable: bool,
    pub archives: Vec<ArchiveVerification>,
    pub summary: VerificationSummary,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub archives_total: usize,
    pub archives_working: usize,
    pub archives_failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveVerification {
    pub file_name: String,
    pub year: i32,
    pub period: String,
    pub status: VerificationStatus,
    pub regions_present: Vec<Region>,
    pub regions_missing: Vec<Region>,
    /// Accident rows parsed across all present regions.
    pub sample_data_count: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl VerificationReport {
    fn new(source: String) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            source,
            index_reachable: false,
            archives: Vec::new(),
            summary: VerificationSummary::default(),
            error_message: None,
        }
    }

    fn push(&mut self, result: ArchiveVerification) {
        self.summary.archives_total += 1;
        match result.status {
            VerificationStatus::Success | VerificationStatus::PartialSuccess => {
                self.summary.archives_working += 1
            }
            VerificationStatus::Failed => self.summary.archives_failed += 1,
        }
        self.archives.push(result);
    }
}

// ============================================================================
// Archive Verification
// ============================================================================

fn period_label(period: Period) -> String {
    match period {
        Period::FullYear => "full year".to_string(),
        Period::Month(m) => format!("until month {:02}", m),
    }
}

/// Inspects one archive's contents.
pub fn verify_archive_bytes(name: &ArchiveName, bytes: &[u8]) -> ArchiveVerification {
    let mut result = ArchiveVerification {
        file_name: name.file_name.clone(),
        year: name.year,
        period: period_label(name.period),
        status: VerificationStatus::Failed,
        regions_present: Vec::new(),
        regions_missing: Vec::new(),
        sample_data_count: 0,
        error_message: None,
    };

    let mut archive = match zip::ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive,
        Err(e) => {
            result.error_message = Some(format!("Not a readable zip archive: {}", e));
            return result;
        }
    };

    for info in REGION_REGISTRY {
        let mut csv = Vec::new();
        match archive.by_name(info.csv_name) {
            Ok(mut member) => {
                if let Err(e) = member.read_to_end(&mut csv) {
                    result.error_message = Some(format!("{}: {}", info.csv_name, e));
                    result.regions_missing.push(info.region);
                    continue;
                }
            }
            Err(_) => {
                result.regions_missing.push(info.region);
                continue;
            }
        }
        result.sample_data_count += parse_region_csv(&csv, info.region).records.len();
        result.regions_present.push(info.region);
    }

    result.status = if result.regions_present.is_empty() || result.sample_data_count == 0 {
        VerificationStatus::Failed
    } else if result.regions_missing.is_empty() {
        VerificationStatus::Success
    } else {
        VerificationStatus::PartialSuccess
    };
    if result.status == VerificationStatus::Failed && result.error_message.is_none() {
        result.error_message = Some("No region data in archive".to_string());
    }
    result
}

fn failed_archive(name: &ArchiveName, message: String) -> ArchiveVerification {
    ArchiveVerification {
        file_name: name.file_name.clone(),
        year: name.year,
        period: period_label(name.period),
        status: VerificationStatus::Failed,
        regions_present: Vec::new(),
        regions_missing: Vec::new(),
        sample_data_count: 0,
        error_message: Some(message),
    }
}

// ============================================================================
// Full Verification
// ============================================================================

fn fetch_bytes(client: &Client, settings: &Settings, url: &str) -> std::result::Result<Vec<u8>, String> {
    let response = client
        .get(url)
        .header(USER_AGENT, &settings.user_agent)
        .send()
        .map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }
    response.bytes().map(|b| b.to_vec()).map_err(|e| e.to_string())
}

/// Verifies the live portal: fetches the index and every archive it lists.
pub fn verify_source(client: &Client, settings: &Settings) -> VerificationReport {
    let base = settings.base_url();
    let mut report = VerificationReport::new(base.clone());

    println!("🔍 Verifying data portal {} ...", base);
    let html = match fetch_bytes(client, settings, &base) {
        Ok(body) => String::from_utf8_lossy(&body).into_owned(),
        Err(e) => {
            println!("  ✗ FAILED: {}", e);
            report.error_message = Some(e);
            return report;
        }
    };
    report.index_reachable = true;

    let links = extract_links(&html);
    let archives = latest_archives(links.iter().map(String::as_str));
    if archives.is_empty() {
        report.error_message = Some("Index lists no data archives".to_string());
    }

    for name in &archives {
        print!("  {} ... ", name.file_name);
        let url = format!("{}{}", base, name.link.trim_start_matches('/'));
        let result = match fetch_bytes(client, settings, &url) {
            Ok(bytes) => verify_archive_bytes(name, &bytes),
            Err(e) => failed_archive(name, e),
        };
        print_archive_line(&result);
        report.push(result);
    }
    report
}

/// Verifies the archives already in the data folder, without network access.
pub fn verify_local(settings: &Settings) -> Result<VerificationReport> {
    let dir = &settings.data_dir;
    let mut report = VerificationReport::new(dir.display().to_string());
    if !dir.exists() {
        report.error_message = Some(format!("{} does not exist", dir.display()));
        return Ok(report);
    }
    report.index_reachable = true;

    let archives = find_local_archives(dir)?;

    println!("🔍 Verifying local archives in {} ...", dir.display());
    for (name, path) in &archives {
        print!("  {} ... ", name.file_name);
        let result = verify_local_archive(name, path);
        print_archive_line(&result);
        report.push(result);
    }
    Ok(report)
}

fn verify_local_archive(name: &ArchiveName, path: &Path) -> ArchiveVerification {
    match fs::read(path) {
        Ok(bytes) => verify_archive_bytes(name, &bytes),
        Err(e) => failed_archive(name, e.to_string()),
    }
}

fn print_archive_line(result: &ArchiveVerification) {
    match result.status {
        VerificationStatus::Success => println!("✓ OK ({} accidents)", result.sample_data_count),
        VerificationStatus::PartialSuccess => {
            let missing: Vec<_> = result.regions_missing.iter().map(|r| r.code()).collect();
            println!("⚠ Partial (missing: {})", missing.join(", "));
        }
        VerificationStatus::Failed => {
            println!("✗ FAILED: {}", result.error_message.as_deref().unwrap_or("Unknown"))
        }
    }
}

pub fn print_summary(report: &VerificationReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 VERIFICATION SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Source:      {}", report.source);
    println!("Reachable:   {}", if report.index_reachable { "yes" } else { "no" });
    println!(
        "Archives:    {}/{} working  ({} failed)",
        report.summary.archives_working, report.summary.archives_total, report.summary.archives_failed
    );
    if let Some(error) = &report.error_message {
        println!("Error:       {}", error);
    }
    println!("═══════════════════════════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::archive::tests::{csv_line, write_archive};

    fn name(file: &str) -> ArchiveName {
        ArchiveName::parse(file).unwrap()
    }

    fn row() -> String {
        csv_line(&[])
    }

    #[test]
    fn test_complete_archive_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datagis2016.zip");
        let members: Vec<(&str, String)> = REGION_REGISTRY.iter().map(|r| (r.csv_name, row())).collect();
        write_archive(&path, &members);

        let result = verify_archive_bytes(&name("datagis2016.zip"), &fs::read(&path).unwrap());
        assert_eq!(result.status, VerificationStatus::Success);
        assert_eq!(result.regions_present.len(), 14);
        assert_eq!(result.sample_data_count, 14);
        assert_eq!(result.period, "full year");
    }

    #[test]
    fn test_missing_regions_are_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datagis-09-2020.zip");
        write_archive(&path, &[("00.csv", row()), ("06.csv", row())]);

        let result = verify_archive_bytes(&name("datagis-09-2020.zip"), &fs::read(&path).unwrap());
        assert_eq!(result.status, VerificationStatus::PartialSuccess);
        assert_eq!(result.regions_present, vec![Region::Pha, Region::Jhm]);
        assert_eq!(result.regions_missing.len(), 12);
        assert_eq!(result.period, "until month 09");
    }

    #[test]
    fn test_garbage_is_failed() {
        let result = verify_archive_bytes(&name("datagis2017.zip"), b"<html>not found</html>");
        assert_eq!(result.status, VerificationStatus::Failed);
        assert!(result.error_message.is_some());
    }

    #[test]
    fn test_verify_local_counts_archives() {
        let dir = tempfile::tempdir().unwrap();
        write_archive(&dir.path().join("datagis2016.zip"), &[("00.csv", row())]);
        fs::write(dir.path().join("datagis2017.zip"), b"broken").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let settings = Settings {
            data_dir: dir.path().to_path_buf(),
            ..Settings::default()
        };
        let report = verify_local(&settings).unwrap();
        assert!(report.index_reachable);
        assert_eq!(report.summary.archives_total, 2);
        assert_eq!(report.summary.archives_working, 1);
        assert_eq!(report.summary.archives_failed, 1);
        assert_eq!(report.archives[0].year, 2016);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"regions_present\":[\"PHA\"]"));
    }
}
