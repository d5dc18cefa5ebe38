//! Wake / measure / sleep sequencing per chip type.

use aqpncs::app::ports::ProbePort;
use aqpncs::chip::controller::ChipController;
use aqpncs::chip::response::ChipResponse;
use aqpncs::chip::transport::ChipTransport;
use aqpncs::chip::{ChipDescriptor, ChipMode, ChipType};
use aqpncs::error::BusError;

use crate::mock_hw::{MockBus, MockDelay, data};

fn controller(bus: MockBus) -> ChipController<MockBus, MockDelay> {
    ChipController::new(ChipTransport::new(bus, MockDelay::default()))
}

fn wake_reads_for(chip_type: ChipType) -> (usize, usize) {
    let mut ctl = controller(MockBus::answering(data("7.00")));
    let chip = ChipDescriptor::new(chip_type, chip_type.default_address());
    ctl.wake(&chip).unwrap();
    let (bus, _) = ctl.into_transport().release();
    (
        bus.commands().iter().filter(|c| **c == "R").count(),
        bus.read_lens().len(),
    )
}

#[test]
fn wake_purges_four_times_except_dissolved_oxygen() {
    assert_eq!(wake_reads_for(ChipType::Ph), (4, 0));
    assert_eq!(wake_reads_for(ChipType::Ec), (4, 0));
    assert_eq!(wake_reads_for(ChipType::Orp), (4, 0));
    assert_eq!(wake_reads_for(ChipType::DissolvedOxygen), (16, 0));
}

#[test]
fn wake_waits_the_read_settle_each_time() {
    let mut ctl = controller(MockBus::new());
    ctl.wake(&ChipDescriptor::ph(0x63)).unwrap();
    let (_, delay) = ctl.into_transport().release();
    assert_eq!(delay.waits_ms, vec![1000; 4]);
}

#[test]
fn wake_runs_the_full_count_despite_failures() {
    let mut ctl = controller(MockBus::new().nack_writes());
    let result = ctl.wake(&ChipDescriptor::ph(0x63));
    assert!(matches!(result, Err(BusError::Write(_))));
    let (bus, _) = ctl.into_transport().release();
    assert_eq!(bus.commands().len(), 4);
}

#[test]
fn measure_reads_the_per_type_response_size() {
    for (chip_type, size) in [
        (ChipType::Ph, 7),
        (ChipType::Ec, 32),
        (ChipType::Orp, 8),
        (ChipType::DissolvedOxygen, 14),
    ] {
        let mut ctl = controller(MockBus::answering(data("1.00")));
        let mut chip = ChipDescriptor::new(chip_type, chip_type.default_address());
        ctl.measure(&mut chip).unwrap();
        let (bus, delay) = ctl.into_transport().release();
        assert_eq!(bus.commands(), vec!["R"]);
        assert_eq!(bus.read_lens(), vec![size], "{:?}", chip_type);
        assert_eq!(delay.waits_ms, vec![1000]);
    }
}

#[test]
fn measure_overwrites_last_response() {
    let mut bus = MockBus::answering(data("7.10"));
    bus.push_response(data("6.95"));
    let mut ctl = controller(bus);
    let mut chip = ChipDescriptor::ph(0x63);
    assert_eq!(chip.last_response, ChipResponse::Unread);

    let first = ctl.measure(&mut chip).unwrap();
    assert_eq!(first.text(), "6.95");
    assert_eq!(chip.last_response, first);

    let second = ctl.measure(&mut chip).unwrap();
    assert_eq!(second.text(), "7.10");
    assert_eq!(chip.last_response, second);
}

#[test]
fn measure_is_repeatable_on_a_steady_circuit() {
    let mut ctl = controller(MockBus::answering(data("7.04")));
    let mut chip = ChipDescriptor::ph(0x63);
    let a = ctl.measure(&mut chip).unwrap();
    let b = ctl.measure(&mut chip).unwrap();
    assert_eq!(a, b);
}

#[test]
fn failed_measure_leaves_last_response_alone() {
    let mut ctl = controller(MockBus::new().nack_writes());
    let mut chip = ChipDescriptor::ph(0x63);
    assert!(ctl.measure(&mut chip).is_err());
    assert_eq!(chip.last_response, ChipResponse::Unread);
}

#[test]
fn sleep_and_led_commands_skip_the_read() {
    let mut ctl = controller(MockBus::new());
    let chip = ChipDescriptor::ph(0x63);
    ctl.set_led(&chip, true).unwrap();
    ctl.set_led(&chip, false).unwrap();
    ctl.sleep(&chip).unwrap();
    let (bus, delay) = ctl.into_transport().release();
    assert_eq!(bus.commands(), vec!["L,1", "L,0", "SLEEP"]);
    assert!(bus.read_lens().is_empty());
    assert_eq!(delay.waits_ms, vec![300; 3]);
}

#[test]
fn serial_mode_is_recorded_but_not_acted_on() {
    let mut ctl = controller(MockBus::answering(data("7.00")));
    let mut chip = ChipDescriptor::ph(0x63);
    chip.mode = ChipMode::Serial;

    ctl.wake(&chip).unwrap();
    ctl.measure(&mut chip).unwrap();
    ctl.sleep(&chip).unwrap();

    assert_eq!(chip.mode, ChipMode::Serial);
    let (bus, _) = ctl.into_transport().release();
    assert_eq!(bus.commands(), vec!["R", "R", "R", "R", "R", "SLEEP"]);
}
