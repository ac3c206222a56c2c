// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Single-owner writer session.
//!
//! ```text
//! Uninitialized --init--> Open --close--> Closed
//! ```
//! `Closed` is terminal; a closed session cannot be re-initialized.

use crate::errors::{Result, WriterError};
use std::fmt;
use tracing::{debug, info};
use tradelog::Event;
use tradelog_persistence::writer::Clock;
use tradelog_persistence::{Ack, LogConfig, LogWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Open,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Open => "open",
            SessionState::Closed => "closed",
        })
    }
}

enum Slot {
    Uninitialized,
    Open(LogWriter),
    Closed,
}

/// Owns at most one open event log.
pub struct Writer {
    slot: Slot,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    pub fn new() -> Self {
        Self { slot: Slot::Uninitialized }
    }

    pub fn state(&self) -> SessionState {
        match self.slot {
            Slot::Uninitialized => SessionState::Uninitialized,
            Slot::Open(_) => SessionState::Open,
            Slot::Closed => SessionState::Closed,
        }
    }

    pub fn init(&mut self, config: LogConfig) -> Result<()> {
        self.check_can_init()?;
        let log = LogWriter::open(config).map_err(WriterError::Open)?;
        self.slot = Slot::Open(log);
        info!("Writer session opened");
        Ok(())
    }

    /// `init` with a custom rotation clock.
    pub fn init_with_clock(&mut self, config: LogConfig, clock: Clock) -> Result<()> {
        self.check_can_init()?;
        let log = LogWriter::open_with_clock(config, clock).map_err(WriterError::Open)?;
        self.slot = Slot::Open(log);
        Ok(())
    }

    fn check_can_init(&self) -> Result<()> {
        match self.slot {
            Slot::Uninitialized => Ok(()),
            Slot::Open(_) => Err(WriterError::AlreadyOpen),
            Slot::Closed => Err(WriterError::AlreadyClosed),
        }
    }

    /// Encode and append one event.
    pub fn write(&mut self, event: &Event) -> Result<Ack> {
        let Slot::Open(log) = &mut self.slot else {
            return Err(WriterError::NotOpen);
        };
        let ack = log.append_event(event).map_err(WriterError::from_write)?;
        metrics::counter!("tradelog_events_written_total", 1, "event_type" => event.event_type.as_str());
        debug!(seq = ack.seq, event_type = %event.event_type, account_id = event.account_id, "Event written");
        Ok(ack)
    }

    pub fn flush(&mut self) -> Result<()> {
        match &mut self.slot {
            Slot::Open(log) => log.flush().map_err(WriterError::Write),
            _ => Err(WriterError::NotOpen),
        }
    }

    /// Flush and release the log. The session is `Closed` afterwards even if
    /// the final flush fails.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.slot, Slot::Closed) {
            Slot::Open(mut log) => {
                log.close().map_err(WriterError::from_close)?;
                info!(records = log.records_written(), "Writer session closed");
                Ok(())
            }
            Slot::Uninitialized => {
                self.slot = Slot::Uninitialized;
                Err(WriterError::NotOpen)
            }
            Slot::Closed => Err(WriterError::AlreadyClosed),
        }
    }

    /// Records made durable by this session, while it is open.
    pub fn records_written(&self) -> Option<u64> {
        match &self.slot {
            Slot::Open(log) => Some(log.records_written()),
            _ => None,
        }
    }

    pub fn log(&self) -> Option<&LogWriter> {
        match &self.slot {
            Slot::Open(log) => Some(log),
            _ => None,
        }
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer").field("state", &self.state()).finish()
    }
}
