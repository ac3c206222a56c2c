// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Caller-facing surface of tradelog: `init`, `write`, `close`.
//!
//! ```no_run
//! use tradelog::{Event, EventType};
//! use tradelog_persistence::LogConfig;
//!
//! let mut writer = tradelog_writer::init(LogConfig::new("events.evlog"))?;
//! let event = Event::new(EventType::Trade, 12, 1, "USDT", "123", "trace_id_0");
//! tradelog_writer::write(&mut writer, &event)?;
//! tradelog_writer::close(&mut writer)?;
//! # Ok::<(), tradelog_writer::WriterError>(())
//! ```

pub mod errors;
pub mod session;
pub mod shared;
pub mod telemetry;

pub use errors::{Result, WriterError, STATUS_OK};
pub use session::{SessionState, Writer};
pub use shared::SharedWriter;

use tradelog::Event;
use tradelog_persistence::{Ack, LogConfig};

/// Open (or create) the log described by `config`.
pub fn init(config: LogConfig) -> Result<Writer> {
    let mut writer = Writer::new();
    writer.init(config)?;
    Ok(writer)
}

pub fn write(writer: &mut Writer, event: &Event) -> Result<Ack> {
    writer.write(event)
}

pub fn close(writer: &mut Writer) -> Result<()> {
    writer.close()
}
