// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Segment naming for rotating logs.
//!
//! Segments live in one directory and are named `{period}_{index}.evlog`,
//! e.g. `20230316_17_1.evlog` for the first hourly segment of 17:00 UTC.
//! Ordering by (period, index) is write order.

use crate::config::Rotation;
use crate::error::{PersistenceError, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub const SEGMENT_EXT: &str = "evlog";

impl Rotation {
    /// Period a timestamp falls into, or `None` for a single-file log.
    pub fn period_key(&self, now: DateTime<Utc>) -> Option<String> {
        match self {
            Rotation::Never => None,
            Rotation::Hourly => Some(now.format("%Y%m%d_%H").to_string()),
            Rotation::Daily => Some(now.format("%Y%m%d").to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SegmentName {
    pub period: String,
    pub index: u32,
}

impl SegmentName {
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(SEGMENT_EXT)?.strip_suffix('.')?;
        let (period, index) = stem.rsplit_once('_')?;
        if period.is_empty() || !period.bytes().all(|b| b.is_ascii_digit() || b == b'_') {
            return None;
        }
        Some(Self {
            period: period.to_string(),
            index: index.parse().ok()?,
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}_{}.{}", self.period, self.index, SEGMENT_EXT)
    }
}

/// First unused segment path for `period`, counting from index 1.
pub fn next_segment_path(dir: &Path, period: &str) -> PathBuf {
    let mut index = 1;
    loop {
        let path = dir.join(SegmentName { period: period.to_string(), index }.file_name());
        if !path.exists() {
            return path;
        }
        index += 1;
    }
}

/// Segment files in `dir`, oldest first. Other files are ignored.
pub fn list_segments(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| PersistenceError::Open {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut segments = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        if let Some(name) = file_name.to_str().and_then(SegmentName::parse) {
            segments.push((name, entry.path()));
        }
    }
    segments.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(segments.into_iter().map(|(_, path)| path).collect())
}
