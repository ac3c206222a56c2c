// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use thiserror::Error;
use tradelog::CodecError;
use tradelog_persistence::PersistenceError;

/// Everything a writer session can report.
///
/// Each variant maps to a stable status code, used as the C return value and
/// the CLI exit status.
#[derive(Error, Debug)]
pub enum WriterError {
    #[error("failed to open event log: {0}")]
    Open(#[source] PersistenceError),
    #[error("invalid event type {0} (expected 0, 1 or 2)")]
    InvalidEventType(u8),
    #[error("failed to encode event: {0}")]
    Encode(#[source] CodecError),
    #[error("failed to write event: {0}")]
    Write(#[source] PersistenceError),
    #[error("writer is not open")]
    NotOpen,
    #[error("writer is already open")]
    AlreadyOpen,
    #[error("writer is already closed")]
    AlreadyClosed,
    #[error("failed to close event log: {0}")]
    Close(#[source] PersistenceError),
}

pub const STATUS_OK: i32 = 0;

impl WriterError {
    pub fn code(&self) -> i32 {
        match self {
            WriterError::Open(_) => 1,
            WriterError::InvalidEventType(_) => 2,
            WriterError::Encode(_) => 3,
            WriterError::Write(_) => 4,
            WriterError::NotOpen => 5,
            WriterError::AlreadyOpen => 6,
            WriterError::AlreadyClosed => 7,
            WriterError::Close(_) => 8,
        }
    }

    /// Classify a failure from the append path.
    pub(crate) fn from_write(e: PersistenceError) -> Self {
        match e {
            PersistenceError::Codec(c) => c.into(),
            PersistenceError::Closed => WriterError::NotOpen,
            other => WriterError::Write(other),
        }
    }

    /// Classify a failure from `LogWriter::close`.
    pub(crate) fn from_close(e: PersistenceError) -> Self {
        match e {
            PersistenceError::AlreadyClosed => WriterError::AlreadyClosed,
            other => WriterError::Close(other),
        }
    }
}

impl From<CodecError> for WriterError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::InvalidEventType(b) => WriterError::InvalidEventType(b),
            other => WriterError::Encode(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, WriterError>;
