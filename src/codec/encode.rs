// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Record encoding.

use crate::config::{FIXED_PREFIX_LEN, TEXT_LEN_PREFIX};
use crate::error::CodecResult;
use crate::event::Event;
use byteorder::{ByteOrder, LittleEndian};

fn write_u8(buf: &mut [u8], offset: &mut usize, val: u8) {
    buf[*offset] = val;
    *offset += 1;
}

fn write_u32(buf: &mut [u8], offset: &mut usize, val: u32) {
    LittleEndian::write_u32(&mut buf[*offset..*offset + 4], val);
    *offset += 4;
}

fn write_u64(buf: &mut [u8], offset: &mut usize, val: u64) {
    LittleEndian::write_u64(&mut buf[*offset..*offset + 8], val);
    *offset += 8;
}

fn write_text(buf: &mut [u8], offset: &mut usize, text: &str) {
    let bytes = text.as_bytes();
    write_u32(buf, offset, bytes.len() as u32);
    buf[*offset..*offset + bytes.len()].copy_from_slice(bytes);
    *offset += bytes.len();
}

/// Exact number of bytes `encode` produces for `event`.
pub fn encoded_len(event: &Event) -> usize {
    FIXED_PREFIX_LEN
        + 3 * TEXT_LEN_PREFIX
        + event.coin.len()
        + event.amount.len()
        + event.trace_id.len()
}

pub fn encode(event: &Event) -> CodecResult<Vec<u8>> {
    let mut out = Vec::with_capacity(encoded_len(event));
    encode_into(event, &mut out)?;
    Ok(out)
}

/// Appends the encoded record to `out` and returns its length.
/// `out` is left untouched when the event is rejected.
pub fn encode_into(event: &Event, out: &mut Vec<u8>) -> CodecResult<usize> {
    event.validate()?;

    let len = encoded_len(event);
    let start = out.len();
    out.resize(start + len, 0);
    let buf = &mut out[start..];

    let mut offset = 0;
    write_u8(buf, &mut offset, event.event_type.as_u8());
    write_u64(buf, &mut offset, event.account_id);
    write_u64(buf, &mut offset, event.strategy_id);
    write_text(buf, &mut offset, &event.coin);
    write_text(buf, &mut offset, &event.amount);
    write_text(buf, &mut offset, &event.trace_id);

    debug_assert_eq!(offset, len);
    Ok(len)
}
