// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tradelog::CodecError;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("append failed: {0}")]
    Write(#[source] io::Error),
    #[error("flush on close failed: {0}")]
    Close(#[source] io::Error),
    #[error("log writer is closed")]
    Closed,
    #[error("log writer was already closed")]
    AlreadyClosed,
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("checksum mismatch at offset {offset}: expected {expected:016x}, found {found:016x}")]
    ChecksumMismatch {
        offset: u64,
        expected: u64,
        found: u64,
    },
    #[error("truncated frame at offset {offset}")]
    TruncatedFrame { offset: u64 },
    #[error("corrupt segment {}: {reason}", path.display())]
    Corrupted { path: PathBuf, reason: String },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
