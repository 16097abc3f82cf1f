//! Output formatting and persistence for the analysis report.
//!
//! Supports pretty-printing, JSON logging, JSON files, and table previews.

use std::fmt::Debug;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::dataset::Table;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value as pretty-printed JSON, creating parent directories.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!(path = %path.display(), "Report written");
    Ok(())
}

/// Logs the column names and the first `n` rows of a table.
pub fn print_head<R: Serialize>(name: &str, table: &Table<R>, n: usize) -> Result<()> {
    info!(table = name, rows = table.len(), columns = %table.columns().join(","), "Preview");
    for row in table.head(n) {
        info!(table = name, "{}", serde_json::to_string(row)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::env;

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&vec![1, 2, 3]);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&json!({ "cnt": 985 })).unwrap();
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = env::temp_dir().join("bikeshare_eda_test_output");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested/report.json");

        write_json(&path, &json!({ "mean": 4504.35, "missing": f64::NAN })).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["mean"], 4504.35);
        assert!(parsed["missing"].is_null());

        fs::remove_dir_all(&dir).unwrap();
    }
}
