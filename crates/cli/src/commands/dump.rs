// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;
use std::path::Path;
use tradelog::Event;
use tradelog_persistence::{read_all, LogRecord};

use super::segments_of;

#[derive(Serialize)]
struct DumpLine<'a> {
    seq: u64,
    #[serde(flatten)]
    event: &'a Event,
}

/// Every record in write order, across segments.
pub fn collect(path: &Path) -> anyhow::Result<Vec<LogRecord>> {
    segments_of(path)?;
    Ok(read_all(path)?)
}

/// Print records as a table, or as JSON lines with `json`.
pub fn run(path: &Path, json: bool) -> anyhow::Result<()> {
    let records = collect(path)?;

    if json {
        for record in &records {
            let line = DumpLine {
                seq: record.seq,
                event: &record.event,
            };
            println!("{}", serde_json::to_string(&line)?);
        }
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Seq", "Type", "Account", "Strategy", "Coin", "Amount", "Trace"]);
    for record in &records {
        let e = &record.event;
        table.add_row(vec![
            record.seq.to_string(),
            e.event_type.to_string(),
            e.account_id.to_string(),
            e.strategy_id.to_string(),
            e.coin.clone(),
            e.amount.clone(),
            format!("{}={}", e.event_type.trace_id_kind(), e.trace_id),
        ]);
    }
    println!("{table}");
    println!("{} record(s)", records.len());
    Ok(())
}
