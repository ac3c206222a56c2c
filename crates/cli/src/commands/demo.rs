// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use tradelog::{Event, EventType};
use tradelog_persistence::LogConfig;

/// The reference cycle: one trade written through init, write and close.
pub fn demo_event() -> Event {
    Event::new(EventType::Trade, 12, 1, "USDT", "123", "trace_id_0")
}

pub fn run(config: LogConfig) -> anyhow::Result<()> {
    let path = config.path.clone();
    let event = demo_event();

    let mut writer = tradelog_writer::init(config)?;
    let ack = tradelog_writer::write(&mut writer, &event)?;
    tradelog_writer::close(&mut writer)?;

    println!(
        "wrote {} event (account {}, {} {}, {} {}) as seq {} to {}",
        event.event_type,
        event.account_id,
        event.amount,
        event.coin,
        event.event_type.trace_id_kind(),
        event.trace_id,
        ack.seq,
        path.display()
    );
    Ok(())
}
