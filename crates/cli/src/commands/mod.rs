// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod append;
pub mod demo;
pub mod dump;
pub mod inspect;
pub mod verify;

use std::path::{Path, PathBuf};
use tradelog_persistence::segment::list_segments;

/// Segment files behind a log path: the file itself, or every segment of a
/// rotating log directory.
pub(crate) fn segments_of(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_dir() {
        Ok(list_segments(path)?)
    } else if path.exists() {
        Ok(vec![path.to_path_buf()])
    } else {
        anyhow::bail!("{} does not exist", path.display())
    }
}
