// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Record layout constants.

/// Maximum size in bytes of one text field (coin, amount, trace_id).
pub const MAX_TEXT_LEN: usize = 65536;

/// Width of the length prefix in front of every text field.
pub const TEXT_LEN_PREFIX: usize = 4;

/// event_type (1) + account_id (8) + strategy_id (8).
pub const FIXED_PREFIX_LEN: usize = 1 + 8 + 8;

/// Largest record the codec can produce.
pub const MAX_RECORD_LEN: usize = FIXED_PREFIX_LEN + 3 * (TEXT_LEN_PREFIX + MAX_TEXT_LEN);
