// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod commands;

use tradelog::CodecError;
use tradelog_persistence::PersistenceError;
use tradelog_writer::WriterError;

/// Exit status for failures that are not writer-session errors, e.g. a
/// corrupt segment found while reading. Kept clear of the writer codes 1..=9.
pub const EXIT_READ_FAILED: u8 = 10;

/// Process exit status for a command failure: the writer status code when
/// there is one.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(e) = err.downcast_ref::<WriterError>() {
        return e.code() as u8;
    }
    if let Some(e) = err.downcast_ref::<CodecError>() {
        return WriterError::from(e.clone()).code() as u8;
    }
    match err.downcast_ref::<PersistenceError>() {
        Some(PersistenceError::Open { .. }) => 1,
        Some(PersistenceError::Codec(e)) => WriterError::from(e.clone()).code() as u8,
        _ => EXIT_READ_FAILED,
    }
}
