// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Segment scanning and tail repair.
//!
//! A crash can leave at most one damaged frame, at the very end of the file:
//! a header or payload that was only partly written, or a final frame whose
//! bytes never fully reached the disk. That tail is safe to cut. Damage with
//! intact frames after it is real corruption and is reported, never cut.
//! A header is only trusted once its own check passes, so a damaged length
//! cannot make the rest of the file look like a torn tail.

use crate::error::{PersistenceError, Result};
use crate::frame::{FrameHeader, MAX_PAYLOAD_LEN};
use memmap2::Mmap;
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    Clean,
    /// Bytes from `offset` to the end do not form a complete, valid frame.
    Torn { offset: u64, dangling: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentScan {
    pub records: u64,
    pub first_seq: Option<u64>,
    pub last_seq: Option<u64>,
    /// Length of the prefix made of complete, verified frames.
    pub valid_len: u64,
    pub file_len: u64,
    pub tail: TailState,
}

impl SegmentScan {
    fn empty() -> Self {
        Self {
            records: 0,
            first_seq: None,
            last_seq: None,
            valid_len: 0,
            file_len: 0,
            tail: TailState::Clean,
        }
    }
}

/// Walks the frames of an in-memory segment image. `path` is only used in errors.
pub fn scan_bytes(path: &Path, data: &[u8]) -> Result<SegmentScan> {
    let len = data.len() as u64;
    let mut scan = SegmentScan {
        file_len: len,
        ..SegmentScan::empty()
    };
    let corrupted = |reason: String| PersistenceError::Corrupted {
        path: path.to_path_buf(),
        reason,
    };

    let mut offset = 0u64;
    while offset < len {
        let remaining = len - offset;
        if remaining < FrameHeader::SIZE as u64 {
            scan.tail = TailState::Torn { offset, dangling: remaining };
            break;
        }

        let start = offset as usize;
        let mut header_bytes = [0u8; FrameHeader::SIZE];
        header_bytes.copy_from_slice(&data[start..start + FrameHeader::SIZE]);
        let header = FrameHeader::from_bytes(&header_bytes);

        if !header.header_ok() {
            // Zero-filled space left by a crash after the file grew.
            if data[start..].iter().all(|b| *b == 0) {
                scan.tail = TailState::Torn { offset, dangling: remaining };
                break;
            }
            return Err(corrupted(format!("frame header at offset {} fails its check", offset)));
        }
        if header.payload_len as usize > MAX_PAYLOAD_LEN {
            return Err(corrupted(format!(
                "frame at offset {} claims {} payload bytes",
                offset, header.payload_len
            )));
        }
        if header.frame_len() > remaining {
            scan.tail = TailState::Torn { offset, dangling: remaining };
            break;
        }

        let payload_start = start + FrameHeader::SIZE;
        let payload = &data[payload_start..payload_start + header.payload_len as usize];
        if !header.verify(payload) {
            if offset + header.frame_len() == len {
                scan.tail = TailState::Torn { offset, dangling: remaining };
                break;
            }
            return Err(PersistenceError::ChecksumMismatch {
                offset,
                expected: header.checksum,
                found: crate::frame::checksum(header.seq, payload),
            });
        }

        if let Some(prev) = scan.last_seq {
            if header.seq != prev + 1 {
                return Err(corrupted(format!(
                    "sequence jumps from {} to {} at offset {}",
                    prev, header.seq, offset
                )));
            }
        }

        scan.first_seq.get_or_insert(header.seq);
        scan.last_seq = Some(header.seq);
        scan.records += 1;
        offset += header.frame_len();
        scan.valid_len = offset;
    }

    Ok(scan)
}

pub fn scan_segment(path: impl AsRef<Path>) -> Result<SegmentScan> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PersistenceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if file.metadata()?.len() == 0 {
        return Ok(SegmentScan::empty());
    }
    // SAFETY: segments are only appended by the single LogWriter that owns
    // them, and scanning happens before that writer opens the file.
    let map = unsafe { Mmap::map(&file)? };
    scan_bytes(path, &map)
}

/// Scans `path` and cuts a torn tail. Returns the scan of the repaired file.
pub fn repair_tail(path: impl AsRef<Path>) -> Result<SegmentScan> {
    let path = path.as_ref();
    let mut scan = scan_segment(path)?;
    if let TailState::Torn { offset, dangling } = scan.tail {
        warn!(
            path = %path.display(),
            offset,
            dangling,
            "Truncating torn tail left by an interrupted write"
        );
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(scan.valid_len)?;
        file.sync_all()?;
        scan.file_len = scan.valid_len;
        scan.tail = TailState::Clean;
    }
    Ok(scan)
}
