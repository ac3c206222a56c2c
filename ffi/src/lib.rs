// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! C ABI for the tradelog writer. The matching header is `include/tradelog.h`.
//!
//! # Safety
//!
//! Every function takes raw pointers from C. A non-null `Writer *` must point
//! to writable memory for the duration of the call; a non-null `Event *` must
//! point to a readable `Event` whose text pointers are valid for their
//! declared lengths. Null pointers are reported with
//! `TRADELOG_INVALID_ARGUMENT` instead of being dereferenced.
#![allow(clippy::missing_safety_doc)]

use std::ffi::{c_char, c_int, c_void, CStr};
use std::path::PathBuf;
use tradelog::Event as LogEvent;
use tradelog_persistence::LogConfig;
use tradelog_writer::{telemetry, Writer as Session, WriterError};

pub const TRADELOG_OK: c_int = 0;
pub const TRADELOG_OPEN_FAILED: c_int = 1;
pub const TRADELOG_INVALID_EVENT_TYPE: c_int = 2;
pub const TRADELOG_ENCODE_FAILED: c_int = 3;
pub const TRADELOG_WRITE_FAILED: c_int = 4;
pub const TRADELOG_NOT_OPEN: c_int = 5;
pub const TRADELOG_ALREADY_OPEN: c_int = 6;
pub const TRADELOG_ALREADY_CLOSED: c_int = 7;
pub const TRADELOG_CLOSE_FAILED: c_int = 8;
pub const TRADELOG_INVALID_ARGUMENT: c_int = 9;

/// Opaque handle. Zero-initialize it before the first `init_db`; `_db` is
/// null until `init_db` succeeds and again after `free_db`.
#[repr(C)]
pub struct Writer {
    pub _db: *mut c_void,
}

#[repr(C)]
pub struct Event {
    pub event_type: u8,
    pub account_id: u64,
    pub strategy_id: u64,
    pub coin: *const c_char,
    pub coin_len: usize,
    pub amount: *const c_char,
    pub amount_len: usize,
    /// tradeId for TRADE, eventId for BALANCE-CHANGE and SETTLE-FEE.
    pub trace_id: *const c_char,
    pub trace_id_len: usize,
}

fn status(result: Result<(), WriterError>) -> c_int {
    match result {
        Ok(()) => TRADELOG_OK,
        Err(e) => {
            tracing::error!(code = e.code(), "{}", e);
            e.code()
        }
    }
}

unsafe fn session<'a>(w: *mut Writer) -> Option<&'a mut Session> {
    if w.is_null() || (*w)._db.is_null() {
        return None;
    }
    Some(&mut *((*w)._db as *mut Session))
}

/// Declared-length view of a caller buffer; `None` for a null pointer with a
/// non-zero length.
unsafe fn text<'a>(ptr: *const c_char, len: usize) -> Option<&'a [u8]> {
    if ptr.is_null() {
        return if len == 0 { Some(&[]) } else { None };
    }
    Some(std::slice::from_raw_parts(ptr as *const u8, len))
}

unsafe fn open(w: *mut Writer, config: LogConfig) -> c_int {
    telemetry::init_tracing();
    // An existing session reports AlreadyOpen or AlreadyClosed.
    if let Some(db) = session(w) {
        return status(db.init(config));
    }
    let mut db = Box::new(Session::new());
    let code = status(db.init(config));
    if code == TRADELOG_OK {
        (*w)._db = Box::into_raw(db) as *mut c_void;
    }
    code
}

/// Open the log named by `TRADELOG_PATH` (rotation and sync from
/// `TRADELOG_ROTATION` / `TRADELOG_SYNC`). `*w` must be zero-initialized or
/// released with `free_db`; a handle that still holds a session gets
/// `TRADELOG_ALREADY_OPEN` (or `TRADELOG_ALREADY_CLOSED` after `close_db`).
#[no_mangle]
pub unsafe extern "C" fn init_db(w: *mut Writer) -> c_int {
    if w.is_null() {
        return TRADELOG_INVALID_ARGUMENT;
    }
    open(w, LogConfig::from_env())
}

/// Like `init_db`, with the destination given as a NUL-terminated UTF-8 path.
#[no_mangle]
pub unsafe extern "C" fn init_db_at(w: *mut Writer, path: *const c_char) -> c_int {
    if w.is_null() || path.is_null() {
        return TRADELOG_INVALID_ARGUMENT;
    }
    let Ok(path) = CStr::from_ptr(path).to_str() else {
        return TRADELOG_INVALID_ARGUMENT;
    };
    let config = LogConfig {
        path: PathBuf::from(path),
        ..LogConfig::from_env()
    };
    open(w, config)
}

#[no_mangle]
pub unsafe extern "C" fn write_db(w: *mut Writer, event: *const Event) -> c_int {
    if w.is_null() || event.is_null() {
        return TRADELOG_INVALID_ARGUMENT;
    }
    let Some(db) = session(w) else {
        return TRADELOG_NOT_OPEN;
    };
    let e = &*event;
    let (Some(coin), Some(amount), Some(trace_id)) = (
        text(e.coin, e.coin_len),
        text(e.amount, e.amount_len),
        text(e.trace_id, e.trace_id_len),
    ) else {
        return TRADELOG_INVALID_ARGUMENT;
    };

    let result = LogEvent::from_buffers(
        e.event_type,
        e.account_id,
        e.strategy_id,
        (coin, e.coin_len),
        (amount, e.amount_len),
        (trace_id, e.trace_id_len),
    )
    .map_err(WriterError::from)
    .and_then(|event| db.write(&event).map(|_| ()));
    status(result)
}

/// Flush and close. The handle stays allocated so a second call reports
/// `TRADELOG_ALREADY_CLOSED`; release it with `free_db`.
#[no_mangle]
pub unsafe extern "C" fn close_db(w: *mut Writer) -> c_int {
    if w.is_null() {
        return TRADELOG_INVALID_ARGUMENT;
    }
    match session(w) {
        Some(db) => status(db.close()),
        None => TRADELOG_NOT_OPEN,
    }
}

/// Release the handle, closing it first if still open. Safe to call twice.
#[no_mangle]
pub unsafe extern "C" fn free_db(w: *mut Writer) -> c_int {
    if w.is_null() {
        return TRADELOG_INVALID_ARGUMENT;
    }
    if !(*w)._db.is_null() {
        drop(Box::from_raw((*w)._db as *mut Session));
        (*w)._db = std::ptr::null_mut();
    }
    TRADELOG_OK
}
