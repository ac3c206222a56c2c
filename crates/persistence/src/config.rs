// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Log configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_PATH: &str = "TRADELOG_PATH";
pub const ENV_ROTATION: &str = "TRADELOG_ROTATION";
pub const ENV_SYNC: &str = "TRADELOG_SYNC";

/// When appended frames reach stable storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    /// Write and fsync before every append returns.
    Always,
    /// Buffer up to `max_records` frames in memory, then write and fsync them together.
    Batched { max_records: usize },
}

impl Default for SyncMode {
    fn default() -> Self {
        SyncMode::Always
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Always => f.write_str("always"),
            SyncMode::Batched { max_records } => write!(f, "batched:{}", max_records),
        }
    }
}

/// `always`, or `batched:<n>` with n ≥ 1.
impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "always" {
            return Ok(SyncMode::Always);
        }
        match s.strip_prefix("batched:").map(str::parse::<usize>) {
            Some(Ok(n)) if n > 0 => Ok(SyncMode::Batched { max_records: n }),
            _ => Err(format!("invalid sync mode {:?}, expected `always` or `batched:<n>`", s)),
        }
    }
}

/// How the destination is split into segment files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    /// The destination path is a single log file.
    Never,
    /// The destination path is a directory with one or more segments per UTC hour.
    Hourly,
    /// The destination path is a directory with one or more segments per UTC day.
    Daily,
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::Never
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rotation::Never => "never",
            Rotation::Hourly => "hourly",
            Rotation::Daily => "daily",
        })
    }
}

impl FromStr for Rotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" | "none" => Ok(Rotation::Never),
            "hourly" => Ok(Rotation::Hourly),
            "daily" => Ok(Rotation::Daily),
            other => Err(format!("invalid rotation {:?}, expected never, hourly or daily", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    /// Log file (`Rotation::Never`) or segment directory.
    pub path: PathBuf,
    pub rotation: Rotation,
    pub sync: SyncMode,
    /// Create missing parent directories on open.
    pub create_dirs: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("events.evlog"),
            rotation: Rotation::Never,
            sync: SyncMode::Always,
            create_dirs: true,
        }
    }
}

impl LogConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_sync(mut self, sync: SyncMode) -> Self {
        self.sync = sync;
        self
    }

    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }

    /// Reads `TRADELOG_PATH`, `TRADELOG_ROTATION` and `TRADELOG_SYNC`.
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(path) = lookup(ENV_PATH).filter(|p| !p.is_empty()) {
            cfg.path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_ROTATION) {
            match raw.parse() {
                Ok(rotation) => cfg.rotation = rotation,
                Err(e) => tracing::warn!(%e, "ignoring {}", ENV_ROTATION),
            }
        }
        if let Some(raw) = lookup(ENV_SYNC) {
            match raw.parse() {
                Ok(sync) => cfg.sync = sync,
                Err(e) => tracing::warn!(%e, "ignoring {}", ENV_SYNC),
            }
        }
        cfg
    }
}
