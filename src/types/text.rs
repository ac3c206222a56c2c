// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Text field rules.
//!
//! Text is always carried with an explicit length. Whatever follows the
//! declared extent in a caller's buffer (typically a C terminator) is not
//! part of the value.

use crate::config::MAX_TEXT_LEN;
use crate::error::{CodecError, CodecResult};
use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextField {
    Coin,
    Amount,
    TraceId,
}

impl TextField {
    pub fn name(self) -> &'static str {
        match self {
            TextField::Coin => "coin",
            TextField::Amount => "amount",
            TextField::TraceId => "trace_id",
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the first `declared_len` bytes of `buf` as the field's value.
pub fn text_from_buffer(field: TextField, buf: &[u8], declared_len: usize) -> CodecResult<&str> {
    if declared_len > buf.len() {
        return Err(CodecError::LengthOutOfBounds {
            field,
            declared: declared_len,
            available: buf.len(),
        });
    }
    let bytes = &buf[..declared_len];
    check_text(field, bytes)?;
    core::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 { field })
}

/// Length limit and NUL check shared by the encoder, the decoder and buffer intake.
pub(crate) fn check_text(field: TextField, bytes: &[u8]) -> CodecResult<()> {
    if bytes.len() > MAX_TEXT_LEN {
        return Err(CodecError::FieldTooLong {
            field,
            len: bytes.len(),
            max: MAX_TEXT_LEN,
        });
    }
    if let Some(offset) = bytes.iter().position(|b| *b == 0) {
        return Err(CodecError::EmbeddedNul { field, offset });
    }
    Ok(())
}
