// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::error::CodecError;
use crate::event::Event;
use crate::types::enums::EventType;
use crate::types::text::TextField;
use rust_decimal::Decimal;

#[test]
fn test_event_type_wire_values() {
    assert_eq!(EventType::Trade.as_u8(), 0);
    assert_eq!(EventType::BalanceChange.as_u8(), 1);
    assert_eq!(EventType::SettleFee.as_u8(), 2);
    for t in EventType::ALL {
        assert_eq!(EventType::from_u8(t.as_u8()), Some(t));
    }
    assert_eq!(EventType::from_u8(3), None);
}

#[test]
fn test_event_type_parse() {
    assert_eq!("trade".parse::<EventType>().unwrap(), EventType::Trade);
    assert_eq!("BALANCE_CHANGE".parse::<EventType>().unwrap(), EventType::BalanceChange);
    assert_eq!("settle-fee".parse::<EventType>().unwrap(), EventType::SettleFee);
    assert_eq!("2".parse::<EventType>().unwrap(), EventType::SettleFee);
    assert_eq!("5".parse::<EventType>().unwrap_err(), CodecError::InvalidEventType(5));
    assert!(matches!("funding".parse::<EventType>(), Err(CodecError::UnknownEventType(_))));
    assert_eq!(EventType::BalanceChange.to_string(), "BALANCE-CHANGE");
}

#[test]
fn test_trace_id_kind() {
    assert_eq!(EventType::Trade.trace_id_kind(), "tradeId");
    assert_eq!(EventType::BalanceChange.trace_id_kind(), "eventId");
    assert_eq!(EventType::SettleFee.trace_id_kind(), "eventId");
}

#[test]
fn test_amount_kept_verbatim() {
    let event = Event::new(EventType::Trade, 1, 1, "USDT", "123.4500", "t");
    assert_eq!(event.amount, "123.4500");
    assert_eq!(event.amount_decimal().unwrap(), Decimal::new(1234500, 4));
}

#[test]
fn test_amount_validation() {
    for ok in ["0", "123", "-5.25", "0.00000001"] {
        let event = Event::new(EventType::Trade, 1, 1, "USDT", ok, "t");
        assert!(event.validate().is_ok(), "{} should be accepted", ok);
    }
    for bad in ["", "abc", "1.2.3"] {
        let event = Event::new(EventType::Trade, 1, 1, "USDT", bad, "t");
        assert!(matches!(event.validate(), Err(CodecError::InvalidAmount(_))), "{:?} should be rejected", bad);
    }
}

#[test]
fn test_default_event_is_encodable() {
    let event = Event::default();
    assert_eq!(event.amount, "0");
    assert!(event.validate().is_ok());
    let bytes = crate::encode(&event).unwrap();
    assert_eq!(crate::decode(&bytes).unwrap(), event);
}

#[test]
fn test_from_buffers_rejects_bad_type() {
    let err = Event::from_buffers(9, 1, 1, (b"USDT", 4), (b"1", 1), (b"t", 1)).unwrap_err();
    assert_eq!(err, CodecError::InvalidEventType(9));
}

#[test]
fn test_from_buffers_length_past_end() {
    let err = Event::from_buffers(0, 1, 1, (b"USDT", 4), (b"1", 1), (b"t", 4)).unwrap_err();
    assert!(matches!(err, CodecError::LengthOutOfBounds { field: TextField::TraceId, .. }));
}
