// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! On-disk frame around one encoded record.
//!
//! ```text
//! [seq: u64][payload_len: u32][header_check: u64][checksum: u64][payload]
//! ```
//! `header_check` is CRC64 over seq and payload_len; `checksum` is CRC64 over
//! seq, payload_len and payload. All integers are little-endian.
//!
//! The header check lets a reader trust `payload_len` before using it to find
//! the next frame, so a damaged length is never mistaken for a short write.

use byteorder::{ByteOrder, LittleEndian};
use crc64fast::Digest;
use tradelog::config::MAX_RECORD_LEN;

/// Frames claiming a larger payload are corrupt, never merely torn.
pub const MAX_PAYLOAD_LEN: usize = MAX_RECORD_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub seq: u64,
    pub payload_len: u32,
    pub header_check: u64,
    pub checksum: u64,
}

impl FrameHeader {
    pub const SIZE: usize = 8 + 4 + 8 + 8; // 28 bytes

    pub fn for_payload(seq: u64, payload: &[u8]) -> Self {
        let payload_len = payload.len() as u32;
        Self {
            seq,
            payload_len,
            header_check: header_checksum(seq, payload_len),
            checksum: checksum(seq, payload),
        }
    }

    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            seq: LittleEndian::read_u64(&buf[0..8]),
            payload_len: LittleEndian::read_u32(&buf[8..12]),
            header_check: LittleEndian::read_u64(&buf[12..20]),
            checksum: LittleEndian::read_u64(&buf[20..28]),
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        LittleEndian::write_u64(&mut buf[0..8], self.seq);
        LittleEndian::write_u32(&mut buf[8..12], self.payload_len);
        LittleEndian::write_u64(&mut buf[12..20], self.header_check);
        LittleEndian::write_u64(&mut buf[20..28], self.checksum);
        buf
    }

    /// Header plus payload.
    pub fn frame_len(&self) -> u64 {
        Self::SIZE as u64 + self.payload_len as u64
    }

    /// True when seq and payload_len are intact.
    pub fn header_ok(&self) -> bool {
        header_checksum(self.seq, self.payload_len) == self.header_check
    }

    pub fn verify(&self, payload: &[u8]) -> bool {
        payload.len() == self.payload_len as usize && checksum(self.seq, payload) == self.checksum
    }
}

pub fn header_checksum(seq: u64, payload_len: u32) -> u64 {
    let mut digest = Digest::new();
    digest.write(&seq.to_le_bytes());
    digest.write(&payload_len.to_le_bytes());
    digest.sum64()
}

pub fn checksum(seq: u64, payload: &[u8]) -> u64 {
    let mut digest = Digest::new();
    digest.write(&seq.to_le_bytes());
    digest.write(&(payload.len() as u32).to_le_bytes());
    digest.write(payload);
    digest.sum64()
}

/// Appends the framed payload to `out`.
pub fn encode_frame(seq: u64, payload: &[u8], out: &mut Vec<u8>) {
    let header = FrameHeader::for_payload(seq, payload);
    out.reserve(FrameHeader::SIZE + payload.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(payload);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_header_serialization() {
        let header = FrameHeader::for_payload(42, b"hello world");
        let decoded = FrameHeader::from_bytes(&header.to_bytes());
        assert_eq!(header, decoded);
        assert_eq!(decoded.frame_len(), 28 + 11);
        assert!(decoded.header_ok());
    }

    #[test]
    fn test_checksum_covers_seq_and_payload() {
        let header = FrameHeader::for_payload(1, b"payload");
        assert!(header.verify(b"payload"));
        assert!(!header.verify(b"paylaod"));
        assert!(!header.verify(b"payload!"));
        assert_ne!(checksum(1, b"payload"), checksum(2, b"payload"));
    }

    #[test]
    fn test_header_check_covers_length() {
        let mut header = FrameHeader::for_payload(5, b"abc");
        header.payload_len ^= 0x04;
        assert!(!header.header_ok());
        header.payload_len ^= 0x04;
        header.seq += 1;
        assert!(!header.header_ok());
    }

    #[test]
    fn test_encode_frame_layout() {
        let mut out = vec![0xAA];
        encode_frame(7, b"abc", &mut out);
        assert_eq!(out.len(), 1 + FrameHeader::SIZE + 3);
        assert_eq!(&out[1..9], &7u64.to_le_bytes());
        assert_eq!(&out[9..13], &3u32.to_le_bytes());
        assert_eq!(&out[29..], b"abc");
    }
}
