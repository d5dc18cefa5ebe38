//! `ChipTransport::send_command` against a scripted bus.

use aqpncs::chip::response::ChipResponse;
use aqpncs::chip::transport::ChipTransport;
use aqpncs::error::BusError;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

use crate::mock_hw::{BusOp, MockBus, MockDelay, data, frame};

fn transport(bus: MockBus) -> ChipTransport<MockBus, MockDelay> {
    ChipTransport::new(bus, MockDelay::default())
}

#[test]
fn write_settle_read_in_order() {
    let mut t = transport(MockBus::answering(data("7.02")));
    let response = t.send_command("R", 0x63, 1000, 7).unwrap();

    assert_eq!(response.text(), "7.02");
    let (bus, delay) = t.release();
    assert_eq!(
        bus.ops,
        vec![
            BusOp::Write {
                address: 0x63,
                command: "R".into()
            },
            BusOp::Read {
                address: 0x63,
                len: 7
            },
        ]
    );
    assert_eq!(delay.waits_ms, vec![1000]);
}

#[test]
fn full_frame_yields_size_minus_one_bytes() {
    let mut t = transport(MockBus::answering(data("abcdefghijklm")));
    let response = t.send_command("R", 0x61, 1000, 14).unwrap();
    assert_eq!(response.text(), "abcdefghijklm");
    assert_eq!(response.text().len(), 13);
}

#[test]
fn zero_size_skips_the_read() {
    let mut t = transport(MockBus::answering(data("7.00")));
    let response = t.send_command("SLEEP", 0x63, 300, 0).unwrap();

    assert_eq!(response, ChipResponse::Unread);
    assert_eq!(response.text(), "");
    let (bus, delay) = t.release();
    assert!(bus.read_lens().is_empty());
    assert_eq!(bus.commands(), vec!["SLEEP"]);
    assert_eq!(delay.waits_ms, vec![300]);
}

#[test]
fn status_bytes_map_to_typed_responses() {
    let cases = [
        (2, ChipResponse::Failed, "Request Failed"),
        (254, ChipResponse::Pending, "Pending"),
        (255, ChipResponse::NoData, "No Data"),
    ];
    for (status, expected, text) in cases {
        let mut t = transport(MockBus::answering(frame(status, "junk")));
        let response = t.send_command("R", 0x63, 1000, 7).unwrap();
        assert_eq!(response, expected);
        assert_eq!(response.text(), text);
    }
}

#[test]
fn unknown_status_is_kept() {
    let mut t = transport(MockBus::answering(frame(7, "")));
    let response = t.send_command("R", 0x63, 1000, 7).unwrap();
    assert_eq!(response, ChipResponse::Unknown(7));
    assert_eq!(response.status_code(), Some(7));
}

#[test]
fn rejects_ten_bit_address_before_touching_the_bus() {
    let mut t = transport(MockBus::new());
    assert_eq!(
        t.send_command("R", 0x80, 1000, 7),
        Err(BusError::InvalidAddress(0x80))
    );
    let (bus, delay) = t.release();
    assert!(bus.ops.is_empty());
    assert!(delay.waits_ms.is_empty());
}

#[test]
fn rejects_oversized_response() {
    let mut t = transport(MockBus::new());
    assert_eq!(
        t.send_command("R", 0x64, 1000, 33),
        Err(BusError::ResponseTooLarge(33))
    );
    assert!(t.release().0.ops.is_empty());
}

#[test]
fn write_nack_stops_the_exchange() {
    let mut t = transport(MockBus::new().nack_writes());
    assert_eq!(
        t.send_command("R", 0x63, 1000, 7),
        Err(BusError::Write(ErrorKind::NoAcknowledge(
            NoAcknowledgeSource::Address
        )))
    );
    let (bus, delay) = t.release();
    assert!(bus.read_lens().is_empty());
    assert!(delay.waits_ms.is_empty());
}

#[test]
fn read_failure_is_reported() {
    let mut t = transport(MockBus::new().fail_reads(ErrorKind::ArbitrationLoss));
    assert_eq!(
        t.send_command("R", 0x63, 1000, 7),
        Err(BusError::Read(ErrorKind::ArbitrationLoss))
    );
}
