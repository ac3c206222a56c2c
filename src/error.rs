// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use crate::types::text::TextField;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid event type byte {0}")]
    InvalidEventType(u8),

    #[error("unknown event type {0:?}")]
    UnknownEventType(String),

    #[error("{field} contains a NUL byte at offset {offset}")]
    EmbeddedNul { field: TextField, offset: usize },

    #[error("{field} is {len} bytes, limit is {max}")]
    FieldTooLong {
        field: TextField,
        len: usize,
        max: usize,
    },

    #[error("amount {0:?} is not a decimal number")]
    InvalidAmount(String),

    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: TextField },

    #[error("{field}: declared length {declared} exceeds buffer of {available} bytes")]
    LengthOutOfBounds {
        field: TextField,
        declared: usize,
        available: usize,
    },

    #[error("record truncated: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),
}

pub type CodecResult<T> = core::result::Result<T, CodecError>;
