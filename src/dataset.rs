//! Typed bike-sharing tables and their CSV parser.
//!
//! Both tables share the UCI bike-sharing layout; the hourly table adds an
//! `hr` column. A file is only accepted when its header carries exactly the
//! columns of the requested kind.

use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const DAY_COLUMNS: &[&str] = &[
    "instant",
    "dteday",
    "season",
    "yr",
    "mnth",
    "holiday",
    "weekday",
    "workingday",
    "weathersit",
    "temp",
    "atemp",
    "hum",
    "windspeed",
    "casual",
    "registered",
    "cnt",
];

const HOUR_COLUMNS: &[&str] = &[
    "instant",
    "dteday",
    "season",
    "yr",
    "mnth",
    "hr",
    "holiday",
    "weekday",
    "workingday",
    "weathersit",
    "temp",
    "atemp",
    "hum",
    "windspeed",
    "casual",
    "registered",
    "cnt",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Daily,
    Hourly,
}

impl DatasetKind {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            DatasetKind::Daily => DAY_COLUMNS,
            DatasetKind::Hourly => HOUR_COLUMNS,
        }
    }

    /// Cache file name used when none is configured.
    pub fn file_name(self) -> &'static str {
        match self {
            DatasetKind::Daily => "day.csv",
            DatasetKind::Hourly => "hour.csv",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::Daily => f.write_str("daily"),
            DatasetKind::Hourly => f.write_str("hourly"),
        }
    }
}

/// A row type that can be read from a bike-sharing CSV.
pub trait Record: DeserializeOwned {
    const KIND: DatasetKind;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub instant: u32,
    pub dteday: NaiveDate,
    pub season: u8,
    pub yr: u8,
    pub mnth: u8,
    pub holiday: u8,
    pub weekday: u8,
    pub workingday: u8,
    pub weathersit: u8,
    pub temp: f64,
    pub atemp: f64,
    pub hum: f64,
    pub windspeed: f64,
    pub casual: u32,
    pub registered: u32,
    pub cnt: u32,
}

impl Record for DayRecord {
    const KIND: DatasetKind = DatasetKind::Daily;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourRecord {
    pub instant: u32,
    pub dteday: NaiveDate,
    pub season: u8,
    pub yr: u8,
    pub mnth: u8,
    pub hr: u8,
    pub holiday: u8,
    pub weekday: u8,
    pub workingday: u8,
    pub weathersit: u8,
    pub temp: f64,
    pub atemp: f64,
    pub hum: f64,
    pub windspeed: f64,
    pub casual: u32,
    pub registered: u32,
    pub cnt: u32,
}

impl Record for HourRecord {
    const KIND: DatasetKind = DatasetKind::Hourly;
}

/// An immutable, fully parsed table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    columns: Vec<String>,
    rows: Vec<R>,
}

impl<R> Table<R> {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn head(&self, n: usize) -> &[R] {
        &self.rows[..n.min(self.rows.len())]
    }
}

pub type DayTable = Table<DayRecord>;
pub type HourTable = Table<HourRecord>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(
        "{} does not hold the {kind} table (missing: {missing:?}, unexpected: {unexpected:?})",
        .path.display()
    )]
    Schema {
        path: PathBuf,
        kind: DatasetKind,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

/// Checks that `header` names exactly the columns of `kind`, in any order.
pub fn validate_columns(
    kind: DatasetKind,
    header: &[String],
    path: &Path,
) -> Result<(), DatasetError> {
    let expected: BTreeSet<&str> = kind.columns().iter().copied().collect();
    let found: BTreeSet<&str> = header.iter().map(String::as_str).collect();

    let missing: Vec<String> = expected.difference(&found).map(|c| c.to_string()).collect();
    let unexpected: Vec<String> = found.difference(&expected).map(|c| c.to_string()).collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(DatasetError::Schema {
            path: path.to_path_buf(),
            kind,
            missing,
            unexpected,
        })
    }
}

/// Parses the CSV at `path` into a table of `R`.
///
/// All-or-nothing: any unreadable row fails the whole read.
pub fn read_table<R: Record>(path: &Path) -> Result<Table<R>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let csv_err = |source| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let columns: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    validate_columns(R::KIND, &columns, path)?;

    let rows = rdr
        .deserialize::<R>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)?;

    debug!(path = %path.display(), kind = %R::KIND, rows = rows.len(), "Table parsed");
    Ok(Table { columns, rows })
}

/// Display name for a season code.
pub fn season_label(code: u8) -> String {
    match code {
        1 => "Winter".into(),
        2 => "Spring".into(),
        3 => "Summer".into(),
        4 => "Fall".into(),
        other => format!("Unknown({other})"),
    }
}

/// Display name for a weather-situation code.
pub fn weather_label(code: u8) -> String {
    match code {
        1 => "Clear".into(),
        2 => "Cloudy".into(),
        3 => "Rain".into(),
        4 => "Snow".into(),
        other => format!("Unknown({other})"),
    }
}

/// Display name for a day-of-week code, 0 being Monday.
pub fn weekday_label(code: u8) -> String {
    match code {
        0 => "Monday".into(),
        1 => "Tuesday".into(),
        2 => "Wednesday".into(),
        3 => "Thursday".into(),
        4 => "Friday".into(),
        5 => "Saturday".into(),
        6 => "Sunday".into(),
        other => format!("Unknown({other})"),
    }
}
