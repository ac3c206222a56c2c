// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Event kinds.

use crate::error::CodecError;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
#[repr(u8)]
pub enum EventType {
    Trade = 0,
    BalanceChange = 1,
    SettleFee = 2,
}

impl EventType {
    pub const ALL: [EventType; 3] = [EventType::Trade, EventType::BalanceChange, EventType::SettleFee];

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(EventType::Trade),
            1 => Some(EventType::BalanceChange),
            2 => Some(EventType::SettleFee),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Trade => "TRADE",
            EventType::BalanceChange => "BALANCE-CHANGE",
            EventType::SettleFee => "SETTLE-FEE",
        }
    }

    /// What the `trace_id` of an event of this type refers to.
    pub fn trace_id_kind(self) -> &'static str {
        match self {
            EventType::Trade => "tradeId",
            EventType::BalanceChange | EventType::SettleFee => "eventId",
        }
    }
}

impl Default for EventType {
    fn default() -> Self {
        EventType::Trade
    }
}

impl TryFrom<u8> for EventType {
    type Error = CodecError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        EventType::from_u8(v).ok_or(CodecError::InvalidEventType(v))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the wire number (`"0"`) or the name in any case, with `-` or `_`
/// separators (`"trade"`, `"BALANCE_CHANGE"`, `"settle-fee"`).
impl FromStr for EventType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<u8>() {
            return EventType::try_from(n);
        }
        let normalized = trimmed.to_ascii_uppercase().replace('_', "-");
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| CodecError::UnknownEventType(s.to_string()))
    }
}
