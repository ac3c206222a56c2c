// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Multi-threaded writer handle.

use crate::errors::{Result, WriterError};
use std::sync::Arc;
use tradelog::Event;
use tradelog_persistence::{Ack, GroupCommitter, LogConfig, LogWriter};

/// Cloneable handle; every clone appends to the same log through one group
/// committer, so concurrent writes share fsyncs.
#[derive(Clone)]
pub struct SharedWriter {
    inner: Arc<GroupCommitter>,
}

impl SharedWriter {
    pub fn open(config: LogConfig) -> Result<Self> {
        let log = LogWriter::open(config).map_err(WriterError::Open)?;
        Ok(Self {
            inner: Arc::new(GroupCommitter::new(log)),
        })
    }

    /// Returns once the event is durable. Calls from one thread land in call order.
    pub fn write(&self, event: &Event) -> Result<Ack> {
        let ack = self.inner.commit_event(event).map_err(WriterError::from_write)?;
        metrics::counter!("tradelog_events_written_total", 1, "event_type" => event.event_type.as_str());
        Ok(ack)
    }

    pub fn flush(&self) -> Result<()> {
        self.inner.flush().map_err(WriterError::from_write)
    }

    /// Closes the log for every clone. Later writes fail with `NotOpen`.
    pub fn close(&self) -> Result<()> {
        self.inner.close().map_err(WriterError::from_close)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn records_written(&self) -> u64 {
        self.inner.records_written()
    }
}
