// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! The event record.
//!
//! One `Event` is one line of the trading ledger: a fill, a balance change or
//! a settlement fee, attributed to an account and a strategy. Amounts are kept
//! as the caller's decimal string so no precision is lost between the caller
//! and the log.

use crate::error::{CodecError, CodecResult};
use crate::types::enums::EventType;
use crate::types::text::{check_text, text_from_buffer, TextField};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub account_id: u64,
    pub strategy_id: u64,
    pub coin: String,
    pub amount: String,
    /// tradeId for trades, eventId for balance changes and settle fees.
    pub trace_id: String,
}

/// A zero-amount trade with empty text fields. Passes `validate`.
impl Default for Event {
    fn default() -> Self {
        Self::new(EventType::default(), 0, 0, "", "0", "")
    }
}

impl Event {
    pub fn new(
        event_type: EventType,
        account_id: u64,
        strategy_id: u64,
        coin: impl Into<String>,
        amount: impl Into<String>,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            account_id,
            strategy_id,
            coin: coin.into(),
            amount: amount.into(),
            trace_id: trace_id.into(),
        }
    }

    /// Builds an event from raw caller buffers, each paired with its declared
    /// length. Only the declared extent of each buffer is used.
    pub fn from_buffers(
        event_type: u8,
        account_id: u64,
        strategy_id: u64,
        coin: (&[u8], usize),
        amount: (&[u8], usize),
        trace_id: (&[u8], usize),
    ) -> CodecResult<Self> {
        let event_type = EventType::try_from(event_type)?;
        let event = Self {
            event_type,
            account_id,
            strategy_id,
            coin: text_from_buffer(TextField::Coin, coin.0, coin.1)?.to_owned(),
            amount: text_from_buffer(TextField::Amount, amount.0, amount.1)?.to_owned(),
            trace_id: text_from_buffer(TextField::TraceId, trace_id.0, trace_id.1)?.to_owned(),
        };
        event.validate()?;
        Ok(event)
    }

    /// Checks every rule the encoder enforces.
    pub fn validate(&self) -> CodecResult<()> {
        check_text(TextField::Coin, self.coin.as_bytes())?;
        check_text(TextField::Amount, self.amount.as_bytes())?;
        check_text(TextField::TraceId, self.trace_id.as_bytes())?;
        self.amount_decimal()?;
        Ok(())
    }

    /// Parses the amount without rounding.
    pub fn amount_decimal(&self) -> CodecResult<Decimal> {
        Decimal::from_str_exact(&self.amount).map_err(|_| CodecError::InvalidAmount(self.amount.clone()))
    }
}
