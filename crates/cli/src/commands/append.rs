// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tradelog::{Event, EventType};
use tradelog_persistence::LogConfig;
use tradelog_writer::WriterError;

/// Builds an event from command-line fields. `event_type` is a name
/// (`TRADE`, `balance-change`, ...) or its wire number.
pub fn event_from_args(
    event_type: &str,
    account_id: u64,
    strategy_id: u64,
    coin: &str,
    amount: &str,
    trace_id: &str,
) -> Result<Event, WriterError> {
    let event_type: EventType = event_type.parse()?;
    let event = Event::new(event_type, account_id, strategy_id, coin, amount, trace_id);
    event.validate()?;
    Ok(event)
}

/// One JSON event per non-empty line, in the shape `dump --json` prints.
pub fn read_json_events(path: &Path) -> anyhow::Result<Vec<Event>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut events = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: not an event", path.display(), i + 1))?;
        events.push(event);
    }
    Ok(events)
}

/// Appends `events` in order. Stops at the first failure; events before it
/// stay written.
pub fn run(config: LogConfig, events: &[Event]) -> anyhow::Result<()> {
    let path = config.path.clone();
    let mut writer = tradelog_writer::init(config)?;

    let mut last = None;
    for event in events {
        let ack = writer.write(event)?;
        last = Some(ack.seq);
    }
    tradelog_writer::close(&mut writer)?;

    match last {
        Some(seq) => println!("appended {} event(s) to {}, last seq {}", events.len(), path.display(), seq),
        None => println!("nothing to append"),
    }
    Ok(())
}
