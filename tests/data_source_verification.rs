//! Data Source Verification Integration Tests
//!
//! These tests hit the live police open data portal to check that the index
//! page is reachable and that the listed archives carry the regional CSV
//! files. They download every archive, so they are ignored by default.
//!
//! Run with: cargo test --test data_source_verification -- --ignored --nocapture

use accident_stats::config::Settings;
use accident_stats::ingest::DataDownloader;
use accident_stats::verify::*;

#[test]
#[ignore]
fn test_portal_lists_archives() {
    let downloader = DataDownloader::new(Settings::default()).unwrap();
    let archives = downloader.list_remote_archives().unwrap();

    println!("\n🔍 Archives on the portal:");
    for archive in &archives {
        println!("  {} ({}, {:?})", archive.file_name, archive.year, archive.period);
    }

    assert!(!archives.is_empty(), "Portal lists no data archives!");
    // one archive per year
    let mut years: Vec<_> = archives.iter().map(|a| a.year).collect();
    years.dedup();
    assert_eq!(years.len(), archives.len());
}

#[test]
#[ignore]
fn test_portal_verification() {
    let downloader = DataDownloader::new(Settings::default()).unwrap();
    let report = verify_source(downloader.client(), downloader.settings());
    print_summary(&report);

    assert!(report.index_reachable, "Portal index is not reachable!");
    assert!(report.summary.archives_working > 0, "No archives are readable!");

    for archive in &report.archives {
        if archive.status == VerificationStatus::PartialSuccess {
            println!("  {} is missing {:?}", archive.file_name, archive.regions_missing);
        }
    }
}
