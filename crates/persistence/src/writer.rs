// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Append-Only Log Writer
//!
//! Owns exactly one destination: a single file, or a directory of rotating
//! segments of which at most one is open at a time.
//!
//! # Durability
//! - `SyncMode::Always`: every append is written and fsync'd before `Ack`
//! - `SyncMode::Batched`: frames wait in memory until the batch is full,
//!   `flush()` is called, the segment rotates, or the writer closes
//! - A failed flush truncates the file back to its last durable length and
//!   drops the unflushed frames; nothing partial stays readable
//! - Failures are returned, never retried here

use crate::config::{LogConfig, Rotation, SyncMode};
use crate::error::{PersistenceError, Result};
use crate::frame::encode_frame;
use crate::scan::{repair_tail, scan_segment};
use crate::segment::{list_segments, next_segment_path};
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tradelog::Event;

/// Source of "now" for segment rotation.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Confirmation of one appended record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub seq: u64,
    /// False while the record only sits in the in-memory batch.
    pub durable: bool,
}

struct ActiveSegment {
    file: File,
    path: PathBuf,
    period: Option<String>,
    durable_len: u64,
}

pub struct LogWriter {
    config: LogConfig,
    clock: Clock,
    segment: Option<ActiveSegment>,
    pending: Vec<u8>,
    pending_records: usize,
    pending_first_seq: u64,
    next_seq: u64,
    records_written: u64,
    closed: bool,
}

impl LogWriter {
    /// Open or create the destination described by `config`.
    ///
    /// An existing log is scanned first; a torn tail is cut and sequence
    /// numbers continue after the last intact frame.
    pub fn open(config: LogConfig) -> Result<Self> {
        Self::open_with_clock(config, Arc::new(Utc::now))
    }

    pub fn open_with_clock(config: LogConfig, clock: Clock) -> Result<Self> {
        let mut writer = Self {
            config,
            clock,
            segment: None,
            pending: Vec::new(),
            pending_records: 0,
            pending_first_seq: 1,
            next_seq: 1,
            records_written: 0,
            closed: false,
        };

        match writer.config.rotation {
            Rotation::Never => {
                let path = writer.config.path.clone();
                if writer.config.create_dirs {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent).map_err(open_error(parent))?;
                    }
                }
                if path.exists() {
                    let scan = repair_tail(&path)?;
                    writer.next_seq = scan.last_seq.map_or(1, |s| s + 1);
                }
                writer.segment = Some(writer.open_segment(path, None)?);
            }
            Rotation::Hourly | Rotation::Daily => {
                let dir = writer.config.path.clone();
                if writer.config.create_dirs {
                    std::fs::create_dir_all(&dir).map_err(open_error(&dir))?;
                }
                if !dir.is_dir() {
                    return Err(PersistenceError::Open {
                        path: dir,
                        source: std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "segment directory does not exist",
                        ),
                    });
                }
                let mut segments = list_segments(&dir)?;
                if let Some(last) = segments.pop() {
                    let mut last_seq = repair_tail(&last)?.last_seq;
                    // A crash right after creating a segment leaves it empty.
                    while last_seq.is_none() {
                        let Some(prev) = segments.pop() else { break };
                        last_seq = scan_segment(&prev)?.last_seq;
                    }
                    writer.next_seq = last_seq.map_or(1, |s| s + 1);
                }
                // The first segment is created by the first append.
            }
        }

        writer.pending_first_seq = writer.next_seq;
        info!(
            path = %writer.config.path.display(),
            rotation = %writer.config.rotation,
            sync = %writer.config.sync,
            next_seq = writer.next_seq,
            "Opened event log"
        );
        Ok(writer)
    }

    fn open_segment(&self, path: PathBuf, period: Option<String>) -> Result<ActiveSegment> {
        let existed = path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_error(&path))?;
        let durable_len = file.metadata()?.len();

        if !existed {
            file.sync_all()?;
            sync_parent_dir(&path)?;
        }
        metrics::counter!("tradelog_segments_opened_total", 1);
        debug!(path = %path.display(), durable_len, "Opened segment");

        Ok(ActiveSegment {
            file,
            path,
            period,
            durable_len,
        })
    }

    /// Switch to a new segment when the rotation period has changed.
    fn rotate_if_needed(&mut self) -> Result<()> {
        let Some(period) = self.config.rotation.period_key((self.clock)()) else {
            return Ok(());
        };
        if let Some(active) = &self.segment {
            if active.period.as_deref() == Some(period.as_str()) {
                return Ok(());
            }
        }

        // Frames buffered so far belong to the outgoing segment.
        self.flush()?;
        if let Some(old) = self.segment.take() {
            old.file.sync_all().map_err(PersistenceError::Write)?;
            info!(path = %old.path.display(), "Rotated out segment");
        }

        let path = next_segment_path(&self.config.path, &period);
        info!(path = %path.display(), "Opening new segment");
        self.segment = Some(self.open_segment(path, Some(period))?);
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(PersistenceError::Closed);
        }
        Ok(())
    }

    /// Append one encoded record.
    pub fn append(&mut self, record: &[u8]) -> Result<Ack> {
        self.ensure_open()?;
        self.rotate_if_needed()?;

        let seq = self.push_frame(record);
        let durable = match self.config.sync {
            SyncMode::Always => {
                self.flush()?;
                true
            }
            SyncMode::Batched { max_records } => {
                if self.pending_records >= max_records {
                    self.flush()?;
                    true
                } else {
                    false
                }
            }
        };
        Ok(Ack { seq, durable })
    }

    pub fn append_event(&mut self, event: &Event) -> Result<Ack> {
        let record = tradelog::encode(event)?;
        self.append(&record)
    }

    /// Append several encoded records with a single write and sync.
    /// Either all of them become durable or none do.
    pub fn append_batch(&mut self, records: &[Vec<u8>]) -> Result<Vec<Ack>> {
        self.ensure_open()?;
        self.rotate_if_needed()?;

        let seqs: Vec<u64> = records.iter().map(|r| self.push_frame(r)).collect();
        self.flush()?;
        Ok(seqs.into_iter().map(|seq| Ack { seq, durable: true }).collect())
    }

    fn push_frame(&mut self, record: &[u8]) -> u64 {
        if self.pending_records == 0 {
            self.pending_first_seq = self.next_seq;
        }
        let seq = self.next_seq;
        encode_frame(seq, record, &mut self.pending);
        self.next_seq += 1;
        self.pending_records += 1;
        seq
    }

    /// Write and fsync everything buffered.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let Some(segment) = self.segment.as_mut() else {
            return Err(PersistenceError::Closed);
        };

        let started = Instant::now();
        let result = segment
            .file
            .write_all(&self.pending)
            .and_then(|_| segment.file.sync_data());

        match result {
            Ok(()) => {
                segment.durable_len += self.pending.len() as u64;
                self.records_written += self.pending_records as u64;
                metrics::counter!("tradelog_records_appended_total", self.pending_records as u64);
                metrics::histogram!("tradelog_flush_duration_seconds", started.elapsed().as_secs_f64());
                debug!(records = self.pending_records, bytes = self.pending.len(), "Flushed frames");
                self.pending.clear();
                self.pending_records = 0;
                Ok(())
            }
            Err(e) => {
                metrics::counter!("tradelog_flush_failures_total", 1);
                warn!(
                    ?e,
                    path = %segment.path.display(),
                    dropped = self.pending_records,
                    "Flush failed, rolling back to last durable length"
                );
                if let Err(te) = segment.file.set_len(segment.durable_len) {
                    error!(?te, path = %segment.path.display(), "Rollback truncate failed");
                }
                self.pending.clear();
                self.pending_records = 0;
                self.next_seq = self.pending_first_seq;
                Err(PersistenceError::Write(e))
            }
        }
    }

    /// Flush, sync and release the destination.
    ///
    /// The handle is released even if the final flush fails. A second call
    /// returns `AlreadyClosed` without touching the file.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(PersistenceError::AlreadyClosed);
        }
        let flushed = self.flush();
        self.closed = true;

        let segment = self.segment.take();
        if let Err(e) = flushed {
            let source = match e {
                PersistenceError::Write(io) => io,
                other => std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
            };
            return Err(PersistenceError::Close(source));
        }
        if let Some(segment) = segment {
            segment.file.sync_all().map_err(PersistenceError::Close)?;
            info!(
                path = %segment.path.display(),
                records = self.records_written,
                "Closed event log"
            );
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Records made durable by this writer.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn pending_records(&self) -> usize {
        self.pending_records
    }

    /// Sequence number the next append will receive.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Segment currently being appended to.
    pub fn current_path(&self) -> Option<&Path> {
        self.segment.as_ref().map(|s| s.path.as_path())
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                warn!(?e, "Failed to close event log on drop");
            }
        }
    }
}

fn open_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistenceError {
    let path = path.to_path_buf();
    move |source| PersistenceError::Open { path, source }
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        File::open(parent)?.sync_all()?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_all;
    use chrono::TimeZone;
    use parking_lot::Mutex;
    use tempfile::tempdir;
    use tradelog::EventType;

    fn event(i: u64) -> Event {
        Event::new(EventType::Trade, 12, 1, "USDT", format!("{}", 100 + i), format!("trace_id_{}", i))
    }

    #[test]
    fn test_open_creates_file_and_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/events.evlog");

        let writer = LogWriter::open(LogConfig::new(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(writer.next_seq(), 1);
        assert_eq!(writer.current_path(), Some(path.as_path()));
    }

    #[test]
    fn test_open_without_create_dirs_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing/events.evlog");

        let result = LogWriter::open(LogConfig::new(&path).with_create_dirs(false));
        assert!(matches!(result, Err(PersistenceError::Open { .. })));
    }

    #[test]
    fn test_append_and_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.evlog");

        let mut writer = LogWriter::open(LogConfig::new(&path)).unwrap();
        let ack = writer.append_event(&event(0)).unwrap();
        assert_eq!(ack, Ack { seq: 1, durable: true });
        writer.close().unwrap();

        let records = read_all(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, event(0));
    }

    #[test]
    fn test_double_close_and_append_after_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.evlog");

        let mut writer = LogWriter::open(LogConfig::new(&path)).unwrap();
        writer.append_event(&event(0)).unwrap();
        writer.close().unwrap();
        let len = std::fs::metadata(&path).unwrap().len();

        assert!(matches!(writer.close(), Err(PersistenceError::AlreadyClosed)));
        assert!(matches!(writer.append_event(&event(1)), Err(PersistenceError::Closed)));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), len);
    }

    #[test]
    fn test_batched_mode_defers_until_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.evlog");
        let cfg = LogConfig::new(&path).with_sync(SyncMode::Batched { max_records: 3 });

        let mut writer = LogWriter::open(cfg).unwrap();
        assert!(!writer.append_event(&event(0)).unwrap().durable);
        assert!(!writer.append_event(&event(1)).unwrap().durable);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
        assert_eq!(writer.pending_records(), 2);

        assert!(writer.append_event(&event(2)).unwrap().durable);
        assert_eq!(writer.pending_records(), 0);
        assert_eq!(read_all(&path).unwrap().len(), 3);

        writer.append_event(&event(3)).unwrap();
        writer.close().unwrap();
        assert_eq!(read_all(&path).unwrap().len(), 4, "close must flush the partial batch");
    }

    #[test]
    fn test_reopen_continues_sequence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.evlog");

        {
            let mut writer = LogWriter::open(LogConfig::new(&path)).unwrap();
            for i in 0..5 {
                writer.append_event(&event(i)).unwrap();
            }
        }

        let mut writer = LogWriter::open(LogConfig::new(&path)).unwrap();
        assert_eq!(writer.next_seq(), 6);
        assert_eq!(writer.append_event(&event(5)).unwrap().seq, 6);
        writer.close().unwrap();

        let seqs: Vec<u64> = read_all(&path).unwrap().iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_append_batch_is_one_unit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.evlog");

        let mut writer = LogWriter::open(LogConfig::new(&path)).unwrap();
        let batch: Vec<Vec<u8>> = (0..4).map(|i| tradelog::encode(&event(i)).unwrap()).collect();
        let acks = writer.append_batch(&batch).unwrap();
        assert_eq!(acks.iter().map(|a| a.seq).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert!(acks.iter().all(|a| a.durable));
        assert_eq!(writer.records_written(), 4);
    }

    #[test]
    fn test_hourly_rotation() {
        let dir = tempdir().unwrap();
        let now = Arc::new(Mutex::new(Utc.with_ymd_and_hms(2023, 3, 16, 17, 59, 0).unwrap()));
        let clock_now = now.clone();
        let clock: Clock = Arc::new(move || *clock_now.lock());

        let cfg = LogConfig::new(dir.path()).with_rotation(Rotation::Hourly);
        let mut writer = LogWriter::open_with_clock(cfg, clock).unwrap();
        assert_eq!(writer.current_path(), None, "segments are created lazily");

        writer.append_event(&event(0)).unwrap();
        writer.append_event(&event(1)).unwrap();
        *now.lock() = Utc.with_ymd_and_hms(2023, 3, 16, 18, 0, 1).unwrap();
        writer.append_event(&event(2)).unwrap();
        writer.close().unwrap();

        let segments = list_segments(dir.path()).unwrap();
        let names: Vec<String> = segments
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["20230316_17_1.evlog", "20230316_18_1.evlog"]);

        assert_eq!(read_all(&segments[0]).unwrap().len(), 2);
        let second = read_all(&segments[1]).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].seq, 3);

        let all: Vec<u64> = read_all(dir.path()).unwrap().iter().map(|r| r.seq).collect();
        assert_eq!(all, vec![1, 2, 3]);
    }

    #[test]
    fn test_reopen_rotating_log_starts_new_segment() {
        let dir = tempdir().unwrap();
        let fixed: Clock = Arc::new(|| Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap());
        let cfg = LogConfig::new(dir.path()).with_rotation(Rotation::Daily);

        {
            let mut writer = LogWriter::open_with_clock(cfg.clone(), fixed.clone()).unwrap();
            writer.append_event(&event(0)).unwrap();
        }
        let mut writer = LogWriter::open_with_clock(cfg, fixed).unwrap();
        assert_eq!(writer.append_event(&event(1)).unwrap().seq, 2);
        writer.close().unwrap();

        let segments = list_segments(dir.path()).unwrap();
        assert_eq!(segments.len(), 2);
        assert!(segments[1].ends_with("20240102_2.evlog"));
    }

    #[test]
    fn test_reopen_skips_empty_last_segment() {
        let dir = tempdir().unwrap();
        let fixed: Clock = Arc::new(|| Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap());
        let cfg = LogConfig::new(dir.path()).with_rotation(Rotation::Daily);

        {
            let mut writer = LogWriter::open_with_clock(cfg.clone(), fixed.clone()).unwrap();
            writer.append_event(&event(0)).unwrap();
            writer.append_event(&event(1)).unwrap();
        }
        std::fs::write(dir.path().join("20240102_2.evlog"), b"").unwrap();

        let writer = LogWriter::open_with_clock(cfg, fixed).unwrap();
        assert_eq!(writer.next_seq(), 3);
    }

    // Writes to /dev/full fail with ENOSPC, which exercises the rollback path.
    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_flush_rolls_back_sequence() {
        let cfg = LogConfig::new("/dev/full").with_create_dirs(false);
        let mut writer = LogWriter::open(cfg).unwrap();

        let result = writer.append_event(&event(0));
        assert!(matches!(result, Err(PersistenceError::Write(_))));
        assert_eq!(writer.next_seq(), 1, "the failed seq is reused");
        assert_eq!(writer.pending_records(), 0);
        assert_eq!(writer.records_written(), 0);

        let result = writer.append_batch(&[tradelog::encode(&event(1)).unwrap(), tradelog::encode(&event(2)).unwrap()]);
        assert!(matches!(result, Err(PersistenceError::Write(_))));
        assert_eq!(writer.next_seq(), 1);
        assert_eq!(writer.pending_records(), 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_batched_flush_drops_unsynced_records() {
        let cfg = LogConfig::new("/dev/full")
            .with_create_dirs(false)
            .with_sync(SyncMode::Batched { max_records: 2 });
        let mut writer = LogWriter::open(cfg).unwrap();

        let first = writer.append_event(&event(0)).unwrap();
        assert_eq!(first, Ack { seq: 1, durable: false });
        assert_eq!(writer.pending_records(), 1);

        // The second append reaches the threshold and its flush fails.
        let result = writer.append_event(&event(1));
        assert!(matches!(result, Err(PersistenceError::Write(_))));
        assert_eq!(writer.pending_records(), 0, "acknowledged but unsynced records are dropped");
        assert_eq!(writer.next_seq(), 1);
        assert_eq!(writer.records_written(), 0);

        let again = writer.append_event(&event(2)).unwrap();
        assert_eq!(again, Ack { seq: 1, durable: false });
        assert!(writer.flush().is_err());
    }

    #[test]
    fn test_idle_rotating_writer_leaves_no_files() {
        let dir = tempdir().unwrap();
        let mut writer = LogWriter::open(LogConfig::new(dir.path()).with_rotation(Rotation::Hourly)).unwrap();
        writer.close().unwrap();
        assert!(list_segments(dir.path()).unwrap().is_empty());
    }
}
