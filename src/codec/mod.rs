// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Record codec.
//!
//! # Layout (little-endian)
//! ```text
//! [event_type: u8][account_id: u64][strategy_id: u64]
//! [coin_len: u32][coin][amount_len: u32][amount][trace_id_len: u32][trace_id]
//! ```
//! Text is never terminated; the length prefix is the only extent.

pub mod encode;
pub mod decode;

pub use decode::{decode, decode_prefix};
pub use encode::{encode, encode_into, encoded_len};
