//! Runtime settings read from the environment (and `.env`, loaded in `main`).

use std::path::PathBuf;

use crate::dataset::DatasetKind;
use crate::fetch::DRIVE_DOWNLOAD_URL;
use crate::loader::DatasetRef;

pub const DEFAULT_DAY_FILE_ID: &str = "1QE1baqT-k2dt4mzrLi6WHou6YuYigQB9";
pub const DEFAULT_HOUR_FILE_ID: &str = "1BQWbPKqHUY12IA-o7R-hTSkknFpohWlM";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/bikeshare_eda.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub day_file_id: String,
    pub hour_file_id: String,
    pub cache_dir: PathBuf,
    pub download_url: String,
    pub log_file_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup; unset or empty keys
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            day_file_id: get("BIKESHARE_DAY_FILE_ID", DEFAULT_DAY_FILE_ID),
            hour_file_id: get("BIKESHARE_HOUR_FILE_ID", DEFAULT_HOUR_FILE_ID),
            cache_dir: PathBuf::from(get("BIKESHARE_CACHE_DIR", ".")),
            download_url: get("BIKESHARE_DOWNLOAD_URL", DRIVE_DOWNLOAD_URL),
            log_file_path: PathBuf::from(get("LOG_FILE_PATH", DEFAULT_LOG_FILE_PATH)),
        }
    }

    pub fn dataset(&self, kind: DatasetKind) -> DatasetRef {
        let id = match kind {
            DatasetKind::Daily => &self.day_file_id,
            DatasetKind::Hourly => &self.hour_file_id,
        };
        DatasetRef::new(id.clone(), self.cache_dir.join(kind.file_name()))
    }
}
