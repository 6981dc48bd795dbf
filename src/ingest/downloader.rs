/// Data portal client: downloads the yearly archives and turns them into
/// per-region record lists, with an in-memory and an on-disk cache.

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Settings;
use crate::ingest::archive::parse_archive;
use crate::ingest::cache::{read_records, write_records};
use crate::ingest::index::{extract_links, latest_archives, ArchiveName};
use crate::logging::{self, Stage};
use crate::model::{AccidentError, AccidentRecord, Region, Result};

/// Recognised archives in `dir`, sorted by year and period. A missing
/// directory holds no archives.
pub fn find_local_archives(dir: &Path) -> Result<Vec<(ArchiveName, PathBuf)>> {
    let mut found = Vec::new();
    if !dir.exists() {
        return Ok(found);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        if let Some(archive) = name.as_deref().and_then(ArchiveName::parse) {
            found.push((archive, path));
        }
    }
    found.sort_by(|a, b| (a.0.year, a.0.period).cmp(&(b.0.year, b.0.period)));
    Ok(found)
}

pub struct DataDownloader {
    client: Client,
    settings: Settings,
    mem_data: HashMap<Region, Vec<AccidentRecord>>,
}

impl DataDownloader {
    pub fn new(settings: Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, settings))
    }

    pub fn with_client(client: Client, settings: Settings) -> Self {
        Self {
            client,
            settings,
            mem_data: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Archives already present in the data folder, sorted by year.
    pub fn local_archives(&self) -> Result<Vec<(ArchiveName, PathBuf)>> {
        find_local_archives(&self.settings.data_dir)
    }

    fn fetch(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.settings.user_agent)
            .send()?;
        if !response.status().is_success() {
            return Err(AccidentError::Http(response.status().as_u16()));
        }
        Ok(response)
    }

    /// Lists the archives the portal currently offers, one per year.
    pub fn list_remote_archives(&self) -> Result<Vec<ArchiveName>> {
        let html = self.fetch(&self.settings.base_url())?.text()?;
        let links = extract_links(&html);
        Ok(latest_archives(links.iter().map(String::as_str)))
    }

    /// Downloads the most complete archive of every year into the data folder.
    pub fn download_data(&self) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.settings.data_dir)?;

        let archives = self.list_remote_archives()?;
        if archives.is_empty() {
            return Err(AccidentError::NoArchives(self.settings.base_url()));
        }

        let base = self.settings.base_url();
        let mut saved = Vec::new();
        let mut failed = 0;
        for archive in &archives {
            let url = format!("{}{}", base, archive.link.trim_start_matches('/'));
            let target = self.settings.data_dir.join(&archive.file_name);

            match self.fetch(&url).and_then(|r| Ok(r.bytes()?)) {
                Ok(body) => {
                    fs::write(&target, &body)?;
                    logging::info(
                        Stage::Download,
                        Some(&archive.file_name),
                        &format!("saved {} bytes", body.len()),
                    );
                    saved.push(target);
                }
                Err(e) => {
                    failed += 1;
                    logging::log_failure(Stage::Download, &archive.file_name, "download", &e);
                }
            }
        }

        logging::log_batch_summary(Stage::Download, archives.len(), saved.len(), failed);
        if saved.is_empty() {
            return Err(AccidentError::NoArchives(base));
        }
        Ok(saved)
    }

    /// Parses a region from every archive in the data folder, downloading
    /// the archives first when the folder has none.
    pub fn parse_region_data(&self, region: Region) -> Result<Vec<AccidentRecord>> {
        let mut archives = self.local_archives()?;
        if archives.is_empty() {
            self.download_data()?;
            archives = self.local_archives()?;
        }
        if archives.is_empty() {
            return Err(AccidentError::NoArchives(
                self.settings.data_dir.display().to_string(),
            ));
        }

        // Monthly snapshots are cumulative; keep only the newest of each year.
        let selected = latest_archives(archives.iter().map(|(a, _)| a.file_name.as_str()));
        archives.retain(|(a, _)| selected.iter().any(|s| s.file_name == a.file_name));

        let mut records = Vec::new();
        for (archive, path) in &archives {
            match parse_archive(path, region) {
                Ok(parsed) => {
                    if parsed.skipped_rows > 0 {
                        logging::warn(
                            Stage::Parse,
                            Some(region.code()),
                            &format!("{}: skipped {} malformed rows", archive.file_name, parsed.skipped_rows),
                        );
                    }
                    records.extend(parsed.records);
                }
                Err(e @ AccidentError::MissingRegionFile { .. }) => {
                    logging::log_failure(Stage::Parse, region.code(), "parse", &e);
                }
                Err(e) => return Err(e),
            }
        }

        logging::debug(
            Stage::Parse,
            Some(region.code()),
            &format!("{} records from {} archives", records.len(), archives.len()),
        );
        Ok(records)
    }

    /// Records of one region: memory first, then the cache file, then the
    /// archives (after which the cache file is written).
    pub fn get_region_data(&mut self, region: Region) -> Result<&[AccidentRecord]> {
        if !self.mem_data.contains_key(&region) {
            let records = self.load_region(region)?;
            self.mem_data.insert(region, records);
        }
        Ok(self.mem_data.get(&region).map(Vec::as_slice).unwrap_or_default())
    }

    fn load_region(&self, region: Region) -> Result<Vec<AccidentRecord>> {
        let cache_path = self.settings.cache_path(region);
        if cache_path.exists() {
            match read_records(&cache_path) {
                Ok(records) => {
                    logging::debug(Stage::Cache, Some(region.code()), "cache hit");
                    return Ok(records);
                }
                Err(e) => logging::log_failure(Stage::Cache, region.code(), "cache read", &e),
            }
        }

        let records = self.parse_region_data(region)?;
        if let Err(e) = write_records(&cache_path, &records) {
            logging::log_failure(Stage::Cache, region.code(), "cache write", &e);
        }
        Ok(records)
    }

    /// Concatenated records of the given regions; all regions when empty.
    pub fn get_list(&mut self, regions: &[Region]) -> Result<Vec<AccidentRecord>> {
        let regions: Vec<Region> = if regions.is_empty() {
            Region::ALL.to_vec()
        } else {
            regions.to_vec()
        };

        let mut all = Vec::new();
        for region in regions {
            all.extend_from_slice(self.get_region_data(region)?);
        }
        Ok(all)
    }
}
