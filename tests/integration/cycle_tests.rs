//! Full wake cycles: CycleService over a real ChipController on a mock bus.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use aqpncs::adapters::statsd::UdpStatsdPublisher;
use aqpncs::app::events::{CycleEvent, CyclePhase, CycleReport};
use aqpncs::app::ports::{PublishPort, WakeReason};
use aqpncs::app::service::CycleService;
use aqpncs::chip::ChipDescriptor;
use aqpncs::chip::controller::ChipController;
use aqpncs::chip::transport::ChipTransport;
use aqpncs::config::SystemConfig;
use aqpncs::error::{BusError, Error, PublishError, ReadingError, RetainedError};

use crate::mock_hw::{
    CountingIdentity, MockBus, MockDelay, MockPower, MockRetained, RecordingPublisher,
    RecordingSink, data, frame,
};

const ID: &str = "a1b2c3d4e5f6";

struct Rig {
    service: CycleService,
    probe: ChipController<MockBus, MockDelay>,
    store: MockRetained,
    identity: CountingIdentity,
    power: MockPower,
    sink: RecordingSink,
}

impl Rig {
    fn new(bus: MockBus, store: MockRetained) -> Self {
        Self::with_config(SystemConfig::default(), bus, store)
    }

    fn with_config(config: SystemConfig, bus: MockBus, store: MockRetained) -> Self {
        let chip = ChipDescriptor::ph(config.chip_address);
        Self {
            service: CycleService::new(config, chip),
            probe: ChipController::new(ChipTransport::new(bus, MockDelay::default())),
            store,
            identity: CountingIdentity::new(ID),
            power: MockPower::new(),
            sink: RecordingSink::default(),
        }
    }

    fn run(&mut self, publisher: &mut impl PublishPort) -> CycleReport {
        self.service.run_cycle(
            &mut self.probe,
            publisher,
            &mut self.store,
            &mut self.identity,
            &mut self.power,
            &mut self.sink,
        )
    }

    fn commands(&self) -> Vec<String> {
        self.probe
            .transport()
            .bus()
            .commands()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

// ── Threshold decisions ───────────────────────────────────────

#[test]
fn small_drift_is_not_published() {
    let mut rig = Rig::new(MockBus::answering(data("7.02")), MockRetained::holding(7.00, ID));
    let mut publisher = RecordingPublisher::default();

    let report = rig.run(&mut publisher);

    assert_eq!(report.reading, Some(7.02));
    assert!(!report.published);
    assert!(report.errors.is_empty());
    assert!(publisher.calls.is_empty());
    assert_eq!(rig.store.last_reading(), Some(7.00));
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, CycleEvent::Suppressed { .. })),
        1
    );
}

#[test]
fn change_of_exactly_the_threshold_is_not_published() {
    for (baseline, measured) in [(7.00, "7.05"), (7.00, "6.95"), (4.00, "4.05"), (7.10, "7.15")] {
        let mut rig = Rig::new(
            MockBus::answering(data(measured)),
            MockRetained::holding(baseline, ID),
        );
        let mut publisher = RecordingPublisher::default();

        let report = rig.run(&mut publisher);

        assert!(!report.published, "{baseline} -> {measured}");
        assert!(publisher.calls.is_empty());
        assert_eq!(rig.store.last_reading(), Some(baseline));
    }
}

#[test]
fn one_hundredth_past_the_threshold_is_published() {
    let mut rig = Rig::new(MockBus::answering(data("7.06")), MockRetained::holding(7.00, ID));
    let mut publisher = RecordingPublisher::default();
    assert!(rig.run(&mut publisher).published);
    assert_eq!(publisher.calls, vec![(ID.to_owned(), "7.06".to_owned())]);
}

#[test]
fn large_change_sends_a_statsd_gauge() {
    let collector = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    collector
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let SocketAddr::V4(addr) = collector.local_addr().unwrap() else {
        panic!("expected IPv4 collector");
    };
    let mut publisher = UdpStatsdPublisher::new(addr, "aqpncs");
    let mut rig = Rig::new(MockBus::answering(data("7.10")), MockRetained::holding(7.00, ID));

    let report = rig.run(&mut publisher);

    assert!(report.published);
    assert_eq!(report.last_reading, 7.10);
    assert_eq!(rig.store.last_reading(), Some(7.10));

    let mut buf = [0u8; 128];
    let (n, _) = collector.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..n], format!("aqpncs.{}:7.10|g", ID).as_bytes());
}

#[test]
fn baseline_only_moves_on_publish() {
    let mut bus = MockBus::answering(data("7.09"));
    bus.push_response(data("7.03"));
    bus.push_response(data("7.06"));
    let mut rig = Rig::new(bus, MockRetained::holding(7.00, ID));
    let mut publisher = RecordingPublisher::default();

    // 7.03: within 0.05 of 7.00.
    assert!(!rig.run(&mut publisher).published);
    // 7.06: 0.06 from the unchanged baseline.
    assert!(rig.run(&mut publisher).published);
    // 7.09: only 0.03 from the new baseline.
    assert!(!rig.run(&mut publisher).published);

    assert_eq!(publisher.calls, vec![(ID.to_owned(), "7.06".to_owned())]);
    assert_eq!(rig.store.last_reading(), Some(7.06));
}

#[test]
fn drops_are_published_too() {
    let mut rig = Rig::new(MockBus::answering(data("6.80")), MockRetained::holding(7.00, ID));
    let mut publisher = RecordingPublisher::default();
    assert!(rig.run(&mut publisher).published);
    assert_eq!(publisher.calls[0].1, "6.80");
}

#[test]
fn failed_send_still_moves_the_baseline() {
    let mut rig = Rig::new(MockBus::answering(data("7.50")), MockRetained::holding(7.00, ID));
    let mut publisher = RecordingPublisher {
        fail_with: Some(PublishError::Send),
        ..Default::default()
    };

    let report = rig.run(&mut publisher);

    assert!(report.published);
    assert_eq!(report.errors.as_slice(), &[Error::Publish(PublishError::Send)]);
    assert_eq!(rig.store.last_reading(), Some(7.50));
}

// ── Identity and retained state ───────────────────────────────

#[test]
fn first_boot_resolves_identity_once() {
    let mut rig = Rig::new(MockBus::answering(data("6.90")), MockRetained::default());
    rig.power.wake = WakeReason::PowerOn;
    let mut publisher = RecordingPublisher::default();

    let report = rig.run(&mut publisher);
    assert!(report.published, "6.90 is far from the zero sentinel");
    assert_eq!(publisher.calls, vec![(ID.to_owned(), "6.90".to_owned())]);

    rig.run(&mut publisher);
    assert_eq!(rig.identity.calls, 1);
    assert_eq!(rig.store.state.as_ref().unwrap().device_id.as_str(), ID);
    assert!(matches!(
        rig.sink.events.first(),
        Some(CycleEvent::Started {
            wake: WakeReason::PowerOn,
            ..
        })
    ));
}

#[test]
fn corrupted_retained_memory_counts_as_first_boot() {
    let mut store = MockRetained::holding(7.00, ID);
    store.load_error = Some(RetainedError::Corrupted);
    let mut rig = Rig::new(MockBus::answering(data("7.02")), store);
    let mut publisher = RecordingPublisher::default();

    let report = rig.run(&mut publisher);

    assert_eq!(report.errors[0], Error::Retained(RetainedError::Corrupted));
    assert!(report.published, "baseline fell back to 0.0");
    assert_eq!(rig.identity.calls, 1);
}

// ── Failures ──────────────────────────────────────────────────

#[test]
fn no_data_is_not_a_reading() {
    let mut rig = Rig::new(MockBus::answering(frame(255, "")), MockRetained::holding(7.00, ID));
    let mut publisher = RecordingPublisher::default();

    let report = rig.run(&mut publisher);

    assert_eq!(report.reading, None);
    assert!(!report.published);
    assert_eq!(
        report.errors.as_slice(),
        &[Error::Reading(ReadingError::NoData)]
    );
    assert_eq!(rig.store.last_reading(), Some(7.00));
    assert_eq!(rig.commands().last().map(String::as_str), Some("SLEEP"));
}

#[test]
fn failed_status_never_becomes_zero() {
    let mut rig = Rig::new(MockBus::answering(frame(2, "")), MockRetained::holding(0.04, ID));
    let mut publisher = RecordingPublisher::default();

    let report = rig.run(&mut publisher);

    assert_eq!(report.reading, None);
    assert!(publisher.calls.is_empty());
    assert!(report
        .errors
        .contains(&Error::Reading(ReadingError::Failed)));
}

#[test]
fn absent_circuit_still_sleeps_and_powers_down() {
    let mut rig = Rig::new(MockBus::new().nack_writes(), MockRetained::holding(7.00, ID));
    let mut publisher = RecordingPublisher::default();

    let report = rig.run(&mut publisher);

    assert!(!report.published);
    assert!(matches!(report.errors[0], Error::Bus(BusError::Write(_))));
    assert_eq!(rig.commands().last().map(String::as_str), Some("SLEEP"));
    assert_eq!(rig.power.sleeps, vec![60]);
    assert_eq!(rig.store.saves, 1);
    assert_eq!(rig.store.last_reading(), Some(7.00));
}

#[test]
fn every_fault_of_a_dead_cycle_is_reported() {
    let config = SystemConfig {
        debug_led: true,
        ..Default::default()
    };
    let mut store = MockRetained::holding(7.00, ID);
    store.load_error = Some(RetainedError::Corrupted);
    let mut rig = Rig::with_config(config, MockBus::new().nack_writes(), store);

    let report = rig.run(&mut RecordingPublisher::default());

    // Retained load, wake, L,1, measure, L,0, SLEEP.
    assert_eq!(report.errors.len(), 6);
    assert_eq!(report.dropped_errors, 0);
    assert_eq!(report.errors[0], Error::Retained(RetainedError::Corrupted));
    assert!(report.errors[1..]
        .iter()
        .all(|e| matches!(e, Error::Bus(BusError::Write(_)))));
    assert_eq!(
        rig.commands(),
        vec!["R", "R", "R", "R", "L,1", "R", "L,0", "SLEEP"]
    );
}

// ── Sequencing ────────────────────────────────────────────────

#[test]
fn phases_run_in_order_and_end_idle() {
    let mut rig = Rig::new(MockBus::answering(data("7.40")), MockRetained::holding(7.00, ID));
    rig.run(&mut RecordingPublisher::default());

    assert_eq!(
        rig.sink.phases(),
        vec![
            CyclePhase::Waking,
            CyclePhase::Measuring,
            CyclePhase::Deciding,
            CyclePhase::Publishing,
            CyclePhase::Sleeping,
            CyclePhase::PowerDown,
            CyclePhase::Idle,
        ]
    );
    assert_eq!(rig.service.phase(), CyclePhase::Idle);
    assert!(matches!(
        rig.sink.events.iter().rev().nth(1),
        Some(CycleEvent::Finished(_))
    ));
}

#[test]
fn suppressed_cycle_skips_publishing_phase() {
    let mut rig = Rig::new(MockBus::answering(data("7.00")), MockRetained::holding(7.00, ID));
    rig.run(&mut RecordingPublisher::default());
    assert!(!rig.sink.phases().contains(&CyclePhase::Publishing));
}

#[test]
fn bus_sees_wake_measure_sleep() {
    let mut rig = Rig::new(MockBus::answering(data("7.00")), MockRetained::holding(7.00, ID));
    rig.run(&mut RecordingPublisher::default());
    assert_eq!(rig.commands(), vec!["R", "R", "R", "R", "R", "SLEEP"]);
}

#[test]
fn debug_led_brackets_the_measurement() {
    let config = SystemConfig {
        debug_led: true,
        ..Default::default()
    };
    let mut rig = Rig::with_config(
        config,
        MockBus::answering(data("7.00")),
        MockRetained::holding(7.00, ID),
    );
    rig.run(&mut RecordingPublisher::default());
    assert_eq!(
        rig.commands(),
        vec!["R", "R", "R", "R", "L,1", "R", "L,0", "SLEEP"]
    );
}

#[test]
fn configured_sleep_period_reaches_power_port() {
    let config = SystemConfig {
        sleep_secs: 900,
        ..Default::default()
    };
    let mut rig = Rig::with_config(
        config,
        MockBus::answering(data("7.00")),
        MockRetained::holding(7.00, ID),
    );
    rig.run(&mut RecordingPublisher::default());
    rig.run(&mut RecordingPublisher::default());
    assert_eq!(rig.power.sleeps, vec![900, 900]);
    assert_eq!(rig.service.cycles(), 2);
}
