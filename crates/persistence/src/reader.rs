// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Sequential reader over one segment.

use crate::error::{PersistenceError, Result};
use crate::frame::{FrameHeader, MAX_PAYLOAD_LEN};
use crate::segment::list_segments;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tradelog::Event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub seq: u64,
    /// Byte offset of the frame within its segment.
    pub offset: u64,
    pub event: Event,
}

pub struct LogReader {
    path: PathBuf,
    reader: BufReader<File>,
    offset: u64,
    done: bool,
}

impl LogReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| PersistenceError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            reader: BufReader::new(file),
            offset: 0,
            done: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record(&mut self) -> Result<Option<LogRecord>> {
        let offset = self.offset;

        let mut header_bytes = [0u8; FrameHeader::SIZE];
        match read_full(&mut self.reader, &mut header_bytes)? {
            0 => return Ok(None),
            n if n < FrameHeader::SIZE => return Err(PersistenceError::TruncatedFrame { offset }),
            _ => {}
        }
        let header = FrameHeader::from_bytes(&header_bytes);
        if !header.header_ok() {
            return Err(PersistenceError::Corrupted {
                path: self.path.clone(),
                reason: format!("frame header at offset {} fails its check", offset),
            });
        }
        if header.payload_len as usize > MAX_PAYLOAD_LEN {
            return Err(PersistenceError::Corrupted {
                path: self.path.clone(),
                reason: format!("frame at offset {} claims {} payload bytes", offset, header.payload_len),
            });
        }

        let mut payload = vec![0u8; header.payload_len as usize];
        if read_full(&mut self.reader, &mut payload)? < payload.len() {
            return Err(PersistenceError::TruncatedFrame { offset });
        }

        if !header.verify(&payload) {
            return Err(PersistenceError::ChecksumMismatch {
                offset,
                expected: header.checksum,
                found: crate::frame::checksum(header.seq, &payload),
            });
        }

        let event = tradelog::decode(&payload)?;
        self.offset += header.frame_len();
        Ok(Some(LogRecord {
            seq: header.seq,
            offset,
            event,
        }))
    }
}

/// Stops after the first error.
impl Iterator for LogReader {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Reads until `buf` is full or EOF; returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

pub fn read_stream(path: impl AsRef<Path>) -> Result<LogReader> {
    LogReader::open(path)
}

/// Every record of a log file, or of all segments in a directory in write order.
pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<LogRecord>> {
    let path = path.as_ref();
    let segments = if path.is_dir() {
        list_segments(path)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut records = Vec::new();
    for segment in segments {
        for record in LogReader::open(&segment)? {
            records.push(record?);
        }
    }
    Ok(records)
}
