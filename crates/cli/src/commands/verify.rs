// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::{Path, PathBuf};
use tradelog_persistence::scan::{scan_segment, TailState};
use tradelog_persistence::{LogReader, PersistenceError};

use super::segments_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub segments: usize,
    pub records: u64,
    pub first_seq: Option<u64>,
    pub last_seq: Option<u64>,
}

fn corrupted(path: &Path, reason: String) -> PersistenceError {
    PersistenceError::Corrupted {
        path: PathBuf::from(path),
        reason,
    }
}

/// Checks every frame checksum, sequence continuity within and across
/// segments, and that every payload decodes. A torn tail fails verification
/// even though the writer would repair it on the next open.
pub fn check(path: &Path) -> anyhow::Result<VerifyReport> {
    let segments = segments_of(path)?;
    let mut report = VerifyReport {
        segments: segments.len(),
        records: 0,
        first_seq: None,
        last_seq: None,
    };

    for segment in &segments {
        let scan = scan_segment(segment)?;
        if let TailState::Torn { offset, dangling } = scan.tail {
            return Err(corrupted(
                segment,
                format!("torn tail: {} bytes at offset {} (cut on next open)", dangling, offset),
            )
            .into());
        }
        if let (Some(prev), Some(first)) = (report.last_seq, scan.first_seq) {
            if first != prev + 1 {
                return Err(corrupted(segment, format!("segment starts at seq {} after seq {}", first, prev)).into());
            }
        }

        for record in LogReader::open(segment)? {
            record?;
        }

        report.records += scan.records;
        report.first_seq = report.first_seq.or(scan.first_seq);
        report.last_seq = scan.last_seq.or(report.last_seq);
    }
    Ok(report)
}

pub fn run(path: &Path) -> anyhow::Result<()> {
    match check(path) {
        Ok(report) => {
            println!("\n✅ VERIFIED\n");
            println!("Segments: {}", report.segments);
            println!("Records:  {}", report.records);
            if let (Some(first), Some(last)) = (report.first_seq, report.last_seq) {
                println!("Seq:      {}..={}", first, last);
            }
            println!("Checksum: CRC64 per frame\n");
            Ok(())
        }
        Err(e) => {
            println!("\n❌ CORRUPTED\n");
            println!("{}", e);
            Err(e)
        }
    }
}
