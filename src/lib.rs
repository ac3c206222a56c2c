// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! tradelog: typed trade events and the binary record codec of the append-only event log.
//!
//! The persistence layer (`tradelog-persistence`) frames and appends the bytes
//! produced here; this crate has no I/O.

pub mod config;
pub mod error;
pub mod types;
pub mod event;
pub mod codec;

#[cfg(test)]
pub mod tests;

pub use codec::{decode, decode_prefix, encode, encode_into, encoded_len};
pub use error::{CodecError, CodecResult};
pub use event::Event;
pub use types::enums::EventType;
pub use types::text::{text_from_buffer, TextField};
