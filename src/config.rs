//! Runtime configuration.
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! an optional TOML file (`accidents.toml`, or the path in
//! `ACCIDENTS_CONFIG`), and `ACCIDENTS_*` environment variables, which may
//! themselves be supplied through a `.env` file.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::logging::LogLevel;
use crate::model::{AccidentError, Region, Result};
use crate::regions::parse_region_list;

pub const DEFAULT_BASE_URL: &str = "https://ehw.fit.vutbr.cz/izv/";
pub const DEFAULT_CONFIG_FILE: &str = "accidents.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub data_dir: PathBuf,
    /// File name template of per-region caches; `{}` becomes the region code.
    pub cache_template: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub default_regions: Vec<Region>,
    pub log_level: LogLevel,
    pub log_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from("data"),
            cache_template: "data_{}.json.gz".to_string(),
            user_agent: "Chrome/70.0.3538.77".to_string(),
            timeout_secs: 60,
            default_regions: Region::ALL.to_vec(),
            log_level: LogLevel::Info,
            log_file: None,
        }
    }
}

/// On-disk shape of the config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    base_url: Option<String>,
    data_dir: Option<PathBuf>,
    cache_template: Option<String>,
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
    regions: Option<Vec<String>>,
    log_level: Option<String>,
    log_file: Option<String>,
}

impl Settings {
    /// Loads `.env`, the config file and environment overrides.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let path = env::var("ACCIDENTS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut settings = match fs::read_to_string(&path) {
            Ok(text) => Self::from_toml_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(AccidentError::Config(format!("{}: {}", path, e))),
        };
        settings.apply_env(|key| env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: SettingsFile =
            toml::from_str(text).map_err(|e| AccidentError::Config(e.to_string()))?;

        let mut settings = Self::default();
        if let Some(url) = file.base_url {
            settings.base_url = url;
        }
        if let Some(dir) = file.data_dir {
            settings.data_dir = dir;
        }
        if let Some(template) = file.cache_template {
            settings.cache_template = template;
        }
        if let Some(agent) = file.user_agent {
            settings.user_agent = agent;
        }
        if let Some(secs) = file.timeout_secs {
            settings.timeout_secs = secs;
        }
        if let Some(codes) = file.regions {
            settings.default_regions = parse_region_list(&codes)?;
        }
        if let Some(level) = file.log_level {
            settings.log_level = level.parse().map_err(AccidentError::Config)?;
        }
        settings.log_file = file.log_file;
        settings.validate()?;
        Ok(settings)
    }

    /// Applies `ACCIDENTS_*` overrides. `lookup` is `env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ACCIDENTS_BASE_URL") {
            self.base_url = url;
        }
        if let Some(dir) = lookup("ACCIDENTS_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup("ACCIDENTS_LOG_LEVEL") {
            self.log_level = level.parse().map_err(AccidentError::Config)?;
        }
        if let Some(file) = lookup("ACCIDENTS_LOG_FILE") {
            self.log_file = Some(file);
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if !self.cache_template.contains("{}") {
            return Err(AccidentError::Config(format!(
                "cache_template '{}' must contain '{{}}'",
                self.cache_template
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AccidentError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Base URL guaranteed to end with a slash, so archive links can be appended.
    pub fn base_url(&self) -> String {
        if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        }
    }

    pub fn cache_path(&self, region: Region) -> PathBuf {
        self.data_dir.join(self.cache_template.replace("{}", region.code()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.default_regions.len(), 14);
        assert_eq!(s.cache_path(Region::Jhm), PathBuf::from("data/data_JHM.json.gz"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let s = Settings::from_toml_str(
            r#"
            data_dir = "/tmp/accidents"
            regions = ["PHA", "STC", "HKK"]
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(s.data_dir, PathBuf::from("/tmp/accidents"));
        assert_eq!(s.default_regions, vec![Region::Pha, Region::Stc, Region::Hkk]);
        assert_eq!(s.log_level, LogLevel::Debug);
        assert_eq!(s.timeout_secs, 60);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Settings::from_toml_str("data_dir = [").unwrap_err();
        assert!(matches!(err, AccidentError::Config(_)));

        let err = Settings::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(matches!(err, AccidentError::Config(_)));
    }

    #[test]
    fn test_template_without_placeholder_is_rejected() {
        let err = Settings::from_toml_str("cache_template = \"cache.gz\"").unwrap_err();
        assert!(err.to_string().contains("cache_template"));
    }

    #[test]
    fn test_unknown_region_in_file_is_rejected() {
        let err = Settings::from_toml_str("regions = [\"HHK\"]").unwrap_err();
        assert!(matches!(err, AccidentError::UnknownRegion(_)));
    }

    #[test]
    fn test_env_overrides_win() {
        let vars: HashMap<&str, &str> = [
            ("ACCIDENTS_BASE_URL", "http://localhost:8080/izv"),
            ("ACCIDENTS_LOG_LEVEL", "error"),
        ]
        .into_iter()
        .collect();

        let mut s = Settings::default();
        s.apply_env(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(s.base_url(), "http://localhost:8080/izv/");
        assert_eq!(s.log_level, LogLevel::Error);
        assert_eq!(s.data_dir, PathBuf::from("data"));
    }
}
