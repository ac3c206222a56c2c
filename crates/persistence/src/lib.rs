// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Durable write path for tradelog.
//!
//! # Guarantees
//! - Every record is framed with a sequence number and a CRC64
//! - An append either lands whole or reports failure; a failed flush is
//!   rolled back to the last durable length
//! - A torn tail left by a crash is detected and cut on reopen
//! - Records are never reordered

pub mod error;
pub mod config;
pub mod frame;
pub mod segment;
pub mod scan;
pub mod writer;
pub mod reader;
pub mod group;
pub mod fixtures;

pub use config::{LogConfig, Rotation, SyncMode};
pub use error::{PersistenceError, Result};
pub use group::GroupCommitter;
pub use reader::{read_all, LogReader, LogRecord};
pub use writer::{Ack, LogWriter};
