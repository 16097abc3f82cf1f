//! Remote-first dataset loading with local cache fallback.
//!
//! Each load ends in exactly one of three ways:
//!
//! * the remote file is downloaded, parsed, and becomes the new cache;
//! * the remote attempt fails, an [`Advisory`] is raised, and the existing
//!   cache is parsed instead;
//! * both fail and a [`LoadError`] is returned.
//!
//! A download is streamed to `<cache>.part` and only renamed over the cache
//! after it parses, so a broken transfer never replaces a good cache.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::dataset::{DatasetError, Record, Table, read_table};
use crate::fetch::{DRIVE_DOWNLOAD_URL, HttpClient, download_file};

/// A remote file id paired with the local path where its copy lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    pub id: String,
    pub cache_path: PathBuf,
}

impl DatasetRef {
    pub fn new(id: impl Into<String>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            cache_path: cache_path.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Remote,
    Cache,
}

/// Non-fatal notice that the remote copy could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub id: String,
    pub reason: String,
}

#[derive(Debug)]
pub struct Loaded<R> {
    pub table: Table<R>,
    pub source: Source,
    pub advisory: Option<Advisory>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data available for dataset {id}: {source}")]
    CacheUnavailable {
        id: String,
        /// Why the remote attempt was abandoned, if one was made.
        remote: Option<String>,
        #[source]
        source: DatasetError,
    },
}

pub struct Loader<C> {
    client: C,
    base_url: String,
    offline: bool,
}

impl<C: HttpClient> Loader<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            base_url: DRIVE_DOWNLOAD_URL.to_string(),
            offline: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Skips the remote attempt and reads the cache directly.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    #[tracing::instrument(
        skip(self, dataset),
        fields(id = %dataset.id, cache = %dataset.cache_path.display(), kind = %R::KIND)
    )]
    pub fn load<R: Record>(&self, dataset: &DatasetRef) -> Result<Loaded<R>, LoadError> {
        if self.offline {
            return read_cache(dataset, None).map(|table| Loaded {
                table,
                source: Source::Cache,
                advisory: None,
            });
        }

        match self.fetch_remote::<R>(dataset) {
            Ok(table) => {
                info!(rows = table.len(), "Loaded from remote");
                Ok(Loaded {
                    table,
                    source: Source::Remote,
                    advisory: None,
                })
            }
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(error = %reason, "Remote fetch failed, falling back to local cache");

                let table = read_cache(dataset, Some(reason.clone()))?;
                info!(rows = table.len(), "Loaded from local cache");
                Ok(Loaded {
                    table,
                    source: Source::Cache,
                    advisory: Some(Advisory {
                        id: dataset.id.clone(),
                        reason,
                    }),
                })
            }
        }
    }

    fn fetch_remote<R: Record>(&self, dataset: &DatasetRef) -> anyhow::Result<Table<R>> {
        let part = partial_path(&dataset.cache_path);

        let result = download_file(&self.client, &self.base_url, &dataset.id, &part)
            .and_then(|_| Ok(read_table::<R>(&part)?))
            .and_then(|table| {
                fs::rename(&part, &dataset.cache_path).with_context(|| {
                    format!("failed to move download into {}", dataset.cache_path.display())
                })?;
                Ok(table)
            });

        if result.is_err() {
            let _ = fs::remove_file(&part);
        }
        result
    }
}

fn read_cache<R: Record>(
    dataset: &DatasetRef,
    remote: Option<String>,
) -> Result<Table<R>, LoadError> {
    read_table::<R>(&dataset.cache_path).map_err(|source| {
        error!(error = %source, "Local cache unavailable, no data to work with");
        LoadError::CacheUnavailable {
            id: dataset.id.clone(),
            remote,
            source,
        }
    })
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DayRecord, HourRecord};
    use crate::fetch::testing::ScriptedClient;
    use std::env;

    const DAY_CSV: &[u8] = b"\
instant,dteday,season,yr,mnth,holiday,weekday,workingday,weathersit,temp,atemp,hum,windspeed,casual,registered,cnt
1,2011-01-01,1,0,1,0,6,0,2,0.344167,0.363625,0.805833,0.160446,331,654,985
2,2011-01-02,1,0,1,0,0,0,2,0.363478,0.353739,0.696087,0.248539,131,670,801
3,2011-01-03,1,0,1,0,1,1,1,0.196364,0.189405,0.437273,0.248309,120,1229,1349
";

    const OLD_DAY_CSV: &[u8] = b"\
instant,dteday,season,yr,mnth,holiday,weekday,workingday,weathersit,temp,atemp,hum,windspeed,casual,registered,cnt
1,2011-01-01,1,0,1,0,6,0,2,0.344167,0.363625,0.805833,0.160446,331,654,985
";

    fn cache_path(name: &str) -> PathBuf {
        let path = env::temp_dir().join(name);
        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(partial_path(&path));
        path
    }

    #[test]
    fn test_remote_success_matches_direct_parse() {
        let path = cache_path("bikeshare_eda_test_loader_remote.csv");
        let loader = Loader::new(ScriptedClient::new().respond(vec![], DAY_CSV));

        let loaded = loader
            .load::<DayRecord>(&DatasetRef::new("day", &path))
            .unwrap();

        assert_eq!(loaded.source, Source::Remote);
        assert!(loaded.advisory.is_none());

        let direct = read_table::<DayRecord>(&path).unwrap();
        assert_eq!(loaded.table.len(), direct.len());
        assert_eq!(loaded.table.columns(), direct.columns());
        assert_eq!(loaded.table, direct);
        assert!(!partial_path(&path).exists());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_remote_failure_uses_cache_with_one_advisory() {
        let path = cache_path("bikeshare_eda_test_loader_fallback.csv");
        fs::write(&path, DAY_CSV).unwrap();

        let loader = Loader::new(ScriptedClient::new());
        let loaded = loader
            .load::<DayRecord>(&DatasetRef::new("day", &path))
            .unwrap();

        assert_eq!(loaded.source, Source::Cache);
        let advisory = loaded.advisory.expect("advisory");
        assert_eq!(advisory.id, "day");
        assert!(advisory.reason.contains("connection refused"));
        assert_eq!(loaded.table, read_table::<DayRecord>(&path).unwrap());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_remote_failure_without_cache_is_fatal() {
        let path = cache_path("bikeshare_eda_test_loader_fatal.csv");

        let loader = Loader::new(ScriptedClient::new());
        let err = loader
            .load::<DayRecord>(&DatasetRef::new("day", &path))
            .unwrap_err();

        let LoadError::CacheUnavailable {
            id, remote, source, ..
        } = err;
        assert_eq!(id, "day");
        assert!(remote.is_some());
        assert!(matches!(source, DatasetError::Io { .. }));
    }

    #[test]
    fn test_corrupt_download_keeps_existing_cache() {
        let path = cache_path("bikeshare_eda_test_loader_corrupt.csv");
        fs::write(&path, OLD_DAY_CSV).unwrap();

        let loader = Loader::new(
            ScriptedClient::new().respond(vec![], b"<html>quota exceeded</html>"),
        );
        let loaded = loader
            .load::<DayRecord>(&DatasetRef::new("day", &path))
            .unwrap();

        assert_eq!(loaded.source, Source::Cache);
        assert!(loaded.advisory.is_some());
        assert_eq!(loaded.table.len(), 1);
        assert_eq!(fs::read(&path).unwrap(), OLD_DAY_CSV);
        assert!(!partial_path(&path).exists());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_wrong_kind_in_cache_is_fatal() {
        let path = cache_path("bikeshare_eda_test_loader_wrong_kind.csv");
        fs::write(&path, DAY_CSV).unwrap();

        let loader = Loader::new(ScriptedClient::new());
        let err = loader
            .load::<HourRecord>(&DatasetRef::new("hour", &path))
            .unwrap_err();

        let LoadError::CacheUnavailable { source, .. } = err;
        assert!(matches!(source, DatasetError::Schema { .. }));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_repeated_fallback_is_idempotent() {
        let path = cache_path("bikeshare_eda_test_loader_idempotent.csv");
        fs::write(&path, DAY_CSV).unwrap();

        let loader = Loader::new(ScriptedClient::new());
        let dataset = DatasetRef::new("day", &path);
        let first = loader.load::<DayRecord>(&dataset).unwrap();
        let second = loader.load::<DayRecord>(&dataset).unwrap();

        assert_eq!(first.table, second.table);
        assert!(first.advisory.is_some() && second.advisory.is_some());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_offline_skips_remote() {
        let path = cache_path("bikeshare_eda_test_loader_offline.csv");
        fs::write(&path, DAY_CSV).unwrap();

        let client = ScriptedClient::new().respond(vec![], OLD_DAY_CSV);
        let loader = Loader::new(client).offline(true);
        let loaded = loader
            .load::<DayRecord>(&DatasetRef::new("day", &path))
            .unwrap();

        assert_eq!(loaded.source, Source::Cache);
        assert!(loaded.advisory.is_none());
        assert_eq!(loaded.table.len(), 3);
        assert!(loader.client.requests().is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("data/day.csv")),
            PathBuf::from("data/day.csv.part")
        );
    }
}
