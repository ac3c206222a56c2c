// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use chrono::{DateTime, Utc};
use std::path::Path;
use tradelog_persistence::scan::{scan_segment, TailState};

use super::segments_of;

/// Per-segment status table. Read-only: a torn tail is reported, not cut.
pub fn run(path: &Path) -> anyhow::Result<()> {
    let segments = segments_of(path)?;

    println!("\nEvent Log Status: {}", path.display());
    println!("--------------------");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Segment", "Status", "Records", "Seq", "Bytes", "Modified"]);

    for segment in &segments {
        let name = segment
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| segment.display().to_string());
        let modified = std::fs::metadata(segment)
            .and_then(|m| m.modified())
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339())
            .unwrap_or_default();

        match scan_segment(segment) {
            Ok(scan) => {
                let status = match scan.tail {
                    TailState::Clean => "OK".to_string(),
                    TailState::Torn { offset, dangling } => {
                        format!("TORN TAIL ({} bytes at {})", dangling, offset)
                    }
                };
                let seqs = match (scan.first_seq, scan.last_seq) {
                    (Some(first), Some(last)) => format!("{}..={}", first, last),
                    _ => "-".to_string(),
                };
                table.add_row(vec![
                    name,
                    status,
                    scan.records.to_string(),
                    seqs,
                    scan.file_len.to_string(),
                    modified,
                ]);
            }
            Err(e) => {
                table.add_row(vec![name, "CORRUPT".to_string(), "-".into(), "-".into(), e.to_string(), modified]);
            }
        }
    }

    if segments.is_empty() {
        println!("(no segments)");
    } else {
        println!("{table}\n");
    }
    Ok(())
}
