// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Group Commit
//!
//! Lets many threads share one `LogWriter` while paying for one fsync per
//! batch instead of one per record.
//!
//! # Protocol
//! ```text
//! commit(record)
//! ↓
//! 1. Enqueue under the state lock, take a ticket
//! ↓
//! 2. Result already published? → return it
//!    Leader active?            → wait on the condvar, go to 2
//! ↓
//! 3. Become leader, take the whole queue, release the state lock
//! ↓
//! 4. append_batch (one write + one fsync) under the writer lock
//! ↓
//! 5. Publish one result per ticket, step down, wake everyone
//! ```
//! Queue order is file order. A failed batch fails every record in it.

use crate::error::{PersistenceError, Result};
use crate::writer::{Ack, LogWriter};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::io;
use tracing::debug;
use tradelog::Event;

#[derive(Debug, Clone)]
enum Outcome {
    Acked(Ack),
    Closed,
    Failed { kind: io::ErrorKind, message: String },
}

impl Outcome {
    fn from_error(e: &PersistenceError) -> Self {
        match e {
            PersistenceError::Closed | PersistenceError::AlreadyClosed => Outcome::Closed,
            PersistenceError::Write(io) | PersistenceError::IoError(io) => Outcome::Failed {
                kind: io.kind(),
                message: io.to_string(),
            },
            other => Outcome::Failed {
                kind: io::ErrorKind::Other,
                message: other.to_string(),
            },
        }
    }

    fn into_result(self) -> Result<Ack> {
        match self {
            Outcome::Acked(ack) => Ok(ack),
            Outcome::Closed => Err(PersistenceError::Closed),
            Outcome::Failed { kind, message } => Err(PersistenceError::Write(io::Error::new(kind, message))),
        }
    }
}

#[derive(Default)]
struct GroupState {
    queue: Vec<(u64, Vec<u8>)>,
    leader_active: bool,
    next_ticket: u64,
    finished: HashMap<u64, Outcome>,
}

pub struct GroupCommitter {
    state: Mutex<GroupState>,
    cond: Condvar,
    writer: Mutex<LogWriter>,
}

impl GroupCommitter {
    pub fn new(writer: LogWriter) -> Self {
        Self {
            state: Mutex::new(GroupState::default()),
            cond: Condvar::new(),
            writer: Mutex::new(writer),
        }
    }

    /// Append one encoded record; returns once it is durable.
    pub fn commit(&self, record: Vec<u8>) -> Result<Ack> {
        let mut state = self.state.lock();
        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.queue.push((ticket, record));

        loop {
            if let Some(outcome) = state.finished.remove(&ticket) {
                return outcome.into_result();
            }
            if !state.leader_active {
                break;
            }
            self.cond.wait(&mut state);
        }

        state.leader_active = true;
        let batch = std::mem::take(&mut state.queue);
        drop(state);

        let (tickets, records): (Vec<u64>, Vec<Vec<u8>>) = batch.into_iter().unzip();
        let result = self.writer.lock().append_batch(&records);
        debug!(records = records.len(), ok = result.is_ok(), "Group commit");

        let mut state = self.state.lock();
        let mut own = None;
        match result {
            Ok(acks) => {
                for (t, ack) in tickets.into_iter().zip(acks) {
                    if t == ticket {
                        own = Some(Ok(ack));
                    } else {
                        state.finished.insert(t, Outcome::Acked(ack));
                    }
                }
            }
            Err(e) => {
                let shared = Outcome::from_error(&e);
                for t in tickets {
                    if t != ticket {
                        state.finished.insert(t, shared.clone());
                    }
                }
                own = Some(Err(e));
            }
        }
        state.leader_active = false;
        self.cond.notify_all();
        drop(state);

        own.unwrap_or(Err(PersistenceError::Closed))
    }

    pub fn commit_event(&self, event: &Event) -> Result<Ack> {
        self.commit(tradelog::encode(event)?)
    }

    pub fn flush(&self) -> Result<()> {
        self.writer.lock().flush()
    }

    /// Close the underlying writer. Commits that arrive afterwards fail with `Closed`.
    pub fn close(&self) -> Result<()> {
        self.writer.lock().close()
    }

    pub fn is_closed(&self) -> bool {
        self.writer.lock().is_closed()
    }

    pub fn records_written(&self) -> u64 {
        self.writer.lock().records_written()
    }
}
