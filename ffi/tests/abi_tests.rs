use std::ffi::{c_char, CString};
use std::ptr;
use tempfile::tempdir;
use tradelog::{Event as LogEvent, EventType};
use tradelog_ffi::*;
use tradelog_persistence::read_all;

fn handle() -> Writer {
    Writer { _db: ptr::null_mut() }
}

fn raw_event(event_type: u8, coin: &[u8], amount: &[u8], trace_id: &[u8]) -> Event {
    Event {
        event_type,
        account_id: 12,
        strategy_id: 1,
        coin: coin.as_ptr() as *const c_char,
        coin_len: coin.len(),
        amount: amount.as_ptr() as *const c_char,
        amount_len: amount.len(),
        trace_id: trace_id.as_ptr() as *const c_char,
        trace_id_len: trace_id.len(),
    }
}

#[test]
fn test_demo_cycle_over_the_c_abi() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.evlog");
    let c_path = CString::new(path.to_str().unwrap()).unwrap();

    let mut w = handle();
    unsafe {
        assert_eq!(init_db_at(&mut w, c_path.as_ptr()), TRADELOG_OK);
        let event = raw_event(0, b"USDT", b"123", b"trace_id_0");
        assert_eq!(write_db(&mut w, &event), TRADELOG_OK);
        assert_eq!(close_db(&mut w), TRADELOG_OK);
        assert_eq!(close_db(&mut w), TRADELOG_ALREADY_CLOSED);
        assert_eq!(write_db(&mut w, &event), TRADELOG_NOT_OPEN);
        assert_eq!(free_db(&mut w), TRADELOG_OK);
        assert!(w._db.is_null());
        assert_eq!(free_db(&mut w), TRADELOG_OK);
    }

    let records = read_all(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].event,
        LogEvent::new(EventType::Trade, 12, 1, "USDT", "123", "trace_id_0")
    );
}

#[test]
fn test_nul_terminated_buffers_with_declared_length() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.evlog");
    let c_path = CString::new(path.to_str().unwrap()).unwrap();

    let coin = b"USDT\0";
    let amount = b"-0.5\0";
    let trace = b"evt_7\0";
    let mut event = raw_event(1, coin, amount, trace);
    event.coin_len = 4;
    event.amount_len = 4;
    event.trace_id_len = 5;

    let mut w = handle();
    unsafe {
        assert_eq!(init_db_at(&mut w, c_path.as_ptr()), TRADELOG_OK);
        assert_eq!(write_db(&mut w, &event), TRADELOG_OK);
        assert_eq!(free_db(&mut w), TRADELOG_OK, "free closes an open handle");
    }

    let records = read_all(&path).unwrap();
    assert_eq!(records[0].event.coin, "USDT");
    assert_eq!(records[0].event.amount, "-0.5");
    assert_eq!(records[0].event.trace_id, "evt_7");
}

#[test]
fn test_rejected_events() {
    let dir = tempdir().unwrap();
    let c_path = CString::new(dir.path().join("events.evlog").to_str().unwrap()).unwrap();

    let mut w = handle();
    unsafe {
        assert_eq!(init_db_at(&mut w, c_path.as_ptr()), TRADELOG_OK);
        assert_eq!(
            write_db(&mut w, &raw_event(9, b"USDT", b"1", b"t")),
            TRADELOG_INVALID_EVENT_TYPE
        );
        assert_eq!(
            write_db(&mut w, &raw_event(0, b"US\0DT", b"1", b"t")),
            TRADELOG_ENCODE_FAILED
        );
        assert_eq!(
            write_db(&mut w, &raw_event(0, b"USDT", b"one", b"t")),
            TRADELOG_ENCODE_FAILED
        );

        let mut missing = raw_event(0, b"USDT", b"1", b"t");
        missing.coin = ptr::null();
        assert_eq!(write_db(&mut w, &missing), TRADELOG_INVALID_ARGUMENT);

        assert_eq!(close_db(&mut w), TRADELOG_OK);
        free_db(&mut w);
    }
}

#[test]
fn test_null_pointers() {
    let mut w = handle();
    let event = raw_event(0, b"USDT", b"1", b"t");
    unsafe {
        assert_eq!(init_db(ptr::null_mut()), TRADELOG_INVALID_ARGUMENT);
        assert_eq!(init_db_at(&mut w, ptr::null()), TRADELOG_INVALID_ARGUMENT);
        assert_eq!(write_db(ptr::null_mut(), &event), TRADELOG_INVALID_ARGUMENT);
        assert_eq!(write_db(&mut w, ptr::null()), TRADELOG_INVALID_ARGUMENT);
        assert_eq!(close_db(ptr::null_mut()), TRADELOG_INVALID_ARGUMENT);
        assert_eq!(free_db(ptr::null_mut()), TRADELOG_INVALID_ARGUMENT);

        assert_eq!(write_db(&mut w, &event), TRADELOG_NOT_OPEN);
        assert_eq!(close_db(&mut w), TRADELOG_NOT_OPEN);
    }
}

#[test]
fn test_open_failure_leaves_handle_empty() {
    let dir = tempdir().unwrap();
    // A regular file where a parent directory is expected.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let c_path = CString::new(blocker.join("events.evlog").to_str().unwrap()).unwrap();

    let mut w = handle();
    unsafe {
        assert_eq!(init_db_at(&mut w, c_path.as_ptr()), TRADELOG_OPEN_FAILED);
        assert!(w._db.is_null());
    }
}

#[test]
fn test_init_db_reads_environment() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("from_env.evlog");
    std::env::set_var("TRADELOG_PATH", &path);

    let mut w = handle();
    unsafe {
        assert_eq!(init_db(&mut w), TRADELOG_OK);
        assert_eq!(write_db(&mut w, &raw_event(2, b"BTC", b"0.0001", b"evt_1")), TRADELOG_OK);
        assert_eq!(close_db(&mut w), TRADELOG_OK);
        free_db(&mut w);
    }
    std::env::remove_var("TRADELOG_PATH");

    assert_eq!(read_all(&path).unwrap()[0].event.event_type, EventType::SettleFee);
}

#[test]
fn test_second_init_keeps_first_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.evlog");
    let other = dir.path().join("other.evlog");
    let c_path = CString::new(path.to_str().unwrap()).unwrap();
    let c_other = CString::new(other.to_str().unwrap()).unwrap();

    let mut w = handle();
    unsafe {
        assert_eq!(init_db_at(&mut w, c_path.as_ptr()), TRADELOG_OK);
        let first = w._db;
        assert_eq!(init_db_at(&mut w, c_other.as_ptr()), TRADELOG_ALREADY_OPEN);
        assert_eq!(w._db, first, "the open session is kept");
        assert!(!other.exists());

        assert_eq!(write_db(&mut w, &raw_event(0, b"USDT", b"123", b"trace_id_0")), TRADELOG_OK);
        assert_eq!(close_db(&mut w), TRADELOG_OK);
        assert_eq!(init_db_at(&mut w, c_path.as_ptr()), TRADELOG_ALREADY_CLOSED);

        assert_eq!(free_db(&mut w), TRADELOG_OK);
        assert_eq!(init_db_at(&mut w, c_path.as_ptr()), TRADELOG_OK, "a freed handle can be reused");
        assert_eq!(close_db(&mut w), TRADELOG_OK);
        free_db(&mut w);
    }

    assert_eq!(read_all(&path).unwrap().len(), 1);
}
