// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Record decoding.

use crate::config::MAX_TEXT_LEN;
use crate::error::{CodecError, CodecResult};
use crate::event::Event;
use crate::types::enums::EventType;
use crate::types::text::{check_text, TextField};
use byteorder::{ByteOrder, LittleEndian};

fn take<'a>(buf: &'a [u8], offset: &mut usize, needed: usize) -> CodecResult<&'a [u8]> {
    let available = buf.len().saturating_sub(*offset);
    if needed > available {
        return Err(CodecError::Truncated {
            offset: *offset,
            needed,
            available,
        });
    }
    let bytes = &buf[*offset..*offset + needed];
    *offset += needed;
    Ok(bytes)
}

fn read_u8(buf: &[u8], offset: &mut usize) -> CodecResult<u8> {
    Ok(take(buf, offset, 1)?[0])
}

fn read_u32(buf: &[u8], offset: &mut usize) -> CodecResult<u32> {
    Ok(LittleEndian::read_u32(take(buf, offset, 4)?))
}

fn read_u64(buf: &[u8], offset: &mut usize) -> CodecResult<u64> {
    Ok(LittleEndian::read_u64(take(buf, offset, 8)?))
}

fn read_text(buf: &[u8], offset: &mut usize, field: TextField) -> CodecResult<String> {
    let len = read_u32(buf, offset)? as usize;
    if len > MAX_TEXT_LEN {
        return Err(CodecError::FieldTooLong {
            field,
            len,
            max: MAX_TEXT_LEN,
        });
    }
    let bytes = take(buf, offset, len)?;
    check_text(field, bytes)?;
    core::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| CodecError::InvalidUtf8 { field })
}

/// Decodes one record that must span the whole of `buf`.
pub fn decode(buf: &[u8]) -> CodecResult<Event> {
    let (event, used) = decode_prefix(buf)?;
    if used != buf.len() {
        return Err(CodecError::TrailingBytes(buf.len() - used));
    }
    Ok(event)
}

/// Decodes the record at the start of `buf`, returning it and the bytes consumed.
pub fn decode_prefix(buf: &[u8]) -> CodecResult<(Event, usize)> {
    let mut offset = 0;

    let tag = read_u8(buf, &mut offset)?;
    let event_type = EventType::from_u8(tag).ok_or(CodecError::InvalidEventType(tag))?;
    let account_id = read_u64(buf, &mut offset)?;
    let strategy_id = read_u64(buf, &mut offset)?;
    let coin = read_text(buf, &mut offset, TextField::Coin)?;
    let amount = read_text(buf, &mut offset, TextField::Amount)?;
    let trace_id = read_text(buf, &mut offset, TextField::TraceId)?;

    Ok((
        Event {
            event_type,
            account_id,
            strategy_id,
            coin,
            amount,
            trace_id,
        },
        offset,
    ))
}
