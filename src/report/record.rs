use super::types::ReportRequest;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A record file holds either one student or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Many(Vec<ReportRequest>),
    One(ReportRequest),
}

impl From<RecordFile> for Vec<ReportRequest> {
    fn from(file: RecordFile) -> Self {
        match file {
            RecordFile::Many(records) => records,
            RecordFile::One(record) => vec![record],
        }
    }
}

/// Load student records from a JSON or YAML file.
///
/// Files ending in `.json` are read as JSON; anything else is read as YAML.
pub fn load_records(path: &Path) -> Result<Vec<ReportRequest>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read record file at {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let file: RecordFile = if is_json {
        serde_json::from_str(&content).with_context(|| {
            format!("Failed to parse records: invalid JSON in {}", path.display())
        })?
    } else {
        serde_saphyr::from_str(&content).with_context(|| {
            format!("Failed to parse records: invalid YAML in {}", path.display())
        })?
    };

    Ok(file.into())
}

/// Expand glob patterns into a sorted, de-duplicated list of files.
///
/// A pattern that matches nothing is an error so typos don't go unnoticed.
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let mut matched = false;
        let entries =
            glob::glob(pattern).with_context(|| format!("Invalid pattern '{}'", pattern))?;
        for entry in entries {
            let path =
                entry.with_context(|| format!("Failed to read a match for '{}'", pattern))?;
            if path.is_file() {
                paths.push(path);
                matched = true;
            }
        }
        if !matched {
            anyhow::bail!("No record files match '{}'", pattern);
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}
