// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Sample logs for tests and demos.

use crate::config::{LogConfig, Rotation};
use crate::error::Result;
use crate::writer::{Clock, LogWriter};
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tradelog::{Event, EventType};

/// One event of each type, cycling, with distinct ids and amounts.
pub fn sample_events(n: u64) -> Vec<Event> {
    (0..n)
        .map(|i| {
            let event_type = EventType::ALL[(i % 3) as usize];
            Event::new(
                event_type,
                100 + i,
                i % 4,
                if i % 2 == 0 { "USDT" } else { "BTC" },
                format!("{}.{:02}", i * 10, i % 100),
                format!("{}_{}", event_type.trace_id_kind(), i),
            )
        })
        .collect()
}

fn write_events(config: LogConfig, clock: Clock, events: &[Event]) -> Result<()> {
    let mut writer = LogWriter::open_with_clock(config, clock)?;
    for event in events {
        writer.append_event(event)?;
    }
    writer.close()
}

/// A single-file log holding `n` sample events.
pub fn generate_clean_log(dir: &Path, n: u64) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join("events.evlog");
    write_events(LogConfig::new(&path), Arc::new(Utc::now), &sample_events(n))?;
    Ok(path)
}

/// A single-file log of `n` events whose last frame lost its final `cut` bytes.
pub fn generate_torn_log(dir: &Path, n: u64, cut: u64) -> Result<PathBuf> {
    let path = generate_clean_log(dir, n)?;
    let len = fs::metadata(&path)?.len();
    OpenOptions::new()
        .write(true)
        .open(&path)?
        .set_len(len.saturating_sub(cut))?;
    Ok(path)
}

/// An hourly-rotating log whose events are spread over `hours` consecutive
/// hours starting at `start`, `per_hour` events each.
pub fn generate_rotating_log(dir: &Path, start: DateTime<Utc>, hours: u32, per_hour: u64) -> Result<PathBuf> {
    let now = Arc::new(Mutex::new(start));
    let clock_now = now.clone();
    let clock: Clock = Arc::new(move || *clock_now.lock());

    let mut writer = LogWriter::open_with_clock(LogConfig::new(dir).with_rotation(Rotation::Hourly), clock)?;
    let events = sample_events(hours as u64 * per_hour);
    for (hour, chunk) in events.chunks(per_hour.max(1) as usize).enumerate() {
        *now.lock() = start + chrono::Duration::hours(hour as i64);
        for event in chunk {
            writer.append_event(event)?;
        }
    }
    writer.close()?;
    Ok(dir.to_path_buf())
}

/// Start time used by the default rotating fixture.
pub fn fixture_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 3, 16, 17, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}
