//! Cycle service: the hexagonal core.
//!
//! [`CycleService`] owns the configuration and the circuit descriptor and
//! runs one complete wake cycle per call. All I/O flows through port
//! traits injected at the call site, so the whole cycle is testable with
//! mock adapters.
//!
//! ```text
//!                ┌──────────────────────────────────────────────┐
//!  ProbePort ◀──▶│ Idle → Waking → Measuring → Deciding ─┐      │──▶ EventSink
//!                │                      ┌── Publishing ◀─┤      │
//! PublishPort ◀──│                      └─▶ Sleeping ◀───┘      │
//!                │                          PowerDown → Idle    │──▶ PowerPort
//!                └──────────────────────────────────────────────┘
//!                          ▲ RetainedStore (load / save)
//! ```
//!
//! The publish baseline only moves when a value is published, so a run of
//! small drifts cannot creep past the threshold unreported.

use log::{debug, info, warn};

use crate::chip::ChipDescriptor;
use crate::chip::response::ChipResponse;
use crate::config::SystemConfig;
use crate::error::{Error, RetainedError};
use crate::reading::{Reading, exceeds_threshold};
use crate::retained::RetainedState;

use super::events::{CycleEvent, CyclePhase, CycleReport};
use super::ports::{EventSink, IdentityPort, PowerPort, ProbePort, PublishPort, RetainedStore};

// ───────────────────────────────────────────────────────────────
// CycleService
// ───────────────────────────────────────────────────────────────

pub struct CycleService {
    config: SystemConfig,
    chip: ChipDescriptor,
    phase: CyclePhase,
    cycles: u64,
}

impl CycleService {
    pub fn new(config: SystemConfig, chip: ChipDescriptor) -> Self {
        Self {
            config,
            chip,
            phase: CyclePhase::Idle,
            cycles: 0,
        }
    }

    // ── Per-wake orchestration ────────────────────────────────

    /// Run one cycle from `Idle` through `PowerDown`.
    ///
    /// On hardware `power.power_down` never returns, so the report is also
    /// emitted as [`CycleEvent::Finished`] before suspending.
    pub fn run_cycle(
        &mut self,
        probe: &mut impl ProbePort,
        publisher: &mut impl PublishPort,
        store: &mut impl RetainedStore,
        identity: &mut impl IdentityPort,
        power: &mut impl PowerPort,
        sink: &mut impl EventSink,
    ) -> CycleReport {
        self.cycles += 1;
        self.phase = CyclePhase::Idle;

        let mut report = CycleReport::default();
        let mut state = Self::restore(store, identity, &mut report, sink);
        report.last_reading = state.last_reading;
        sink.emit(&CycleEvent::Started {
            wake: power.wake_reason(),
            device_id: state.device_id.clone(),
        });

        let mut measured: Option<ChipResponse> = None;
        let mut reading: Option<Reading> = None;

        loop {
            let next = match self.phase {
                CyclePhase::Idle => CyclePhase::Waking,

                CyclePhase::Waking => {
                    if let Err(e) = probe.wake(&self.chip) {
                        Self::fault(e.into(), &mut report, sink);
                    }
                    CyclePhase::Measuring
                }

                CyclePhase::Measuring => {
                    if self.config.debug_led {
                        if let Err(e) = probe.set_led(&self.chip, true) {
                            Self::fault(e.into(), &mut report, sink);
                        }
                    }
                    match probe.measure(&mut self.chip) {
                        Ok(response) => {
                            sink.emit(&CycleEvent::Measured(response.clone()));
                            measured = Some(response);
                        }
                        Err(e) => Self::fault(e.into(), &mut report, sink),
                    }
                    CyclePhase::Deciding
                }

                CyclePhase::Deciding => match measured.as_ref().map(Reading::from_response) {
                    Some(Ok(r)) => {
                        report.reading = Some(r.value);
                        let baseline = state.last_reading;
                        if exceeds_threshold(r.value, baseline, self.config.publish_threshold) {
                            reading = Some(r);
                            CyclePhase::Publishing
                        } else {
                            sink.emit(&CycleEvent::Suppressed {
                                value: r.value,
                                baseline,
                            });
                            CyclePhase::Sleeping
                        }
                    }
                    Some(Err(e)) => {
                        Self::fault(e.into(), &mut report, sink);
                        CyclePhase::Sleeping
                    }
                    // Bus failure already recorded.
                    None => CyclePhase::Sleeping,
                },

                CyclePhase::Publishing => {
                    if let Some(r) = reading.take() {
                        let baseline = state.last_reading;
                        if let Err(e) = publisher.publish(&state.device_id, &r.text) {
                            Self::fault(e.into(), &mut report, sink);
                        }
                        // Fire-and-forget: the attempt moves the baseline.
                        state.last_reading = r.value;
                        report.published = true;
                        sink.emit(&CycleEvent::Published {
                            value: r.value,
                            baseline,
                        });
                    }
                    CyclePhase::Sleeping
                }

                CyclePhase::Sleeping => {
                    if self.config.debug_led {
                        if let Err(e) = probe.set_led(&self.chip, false) {
                            Self::fault(e.into(), &mut report, sink);
                        }
                    }
                    if let Err(e) = probe.sleep(&self.chip) {
                        Self::fault(e.into(), &mut report, sink);
                    }
                    CyclePhase::PowerDown
                }

                CyclePhase::PowerDown => {
                    report.last_reading = state.last_reading;
                    store.save(&state);
                    sink.emit(&CycleEvent::Finished(report.clone()));
                    power.power_down(self.config.sleep_secs);
                    self.transition(CyclePhase::Idle, sink);
                    return report;
                }
            };
            self.transition(next, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn chip(&self) -> &ChipDescriptor {
        &self.chip
    }

    /// Cycles run since this process started (resets on every deep sleep
    /// on hardware).
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn restore(
        store: &mut impl RetainedStore,
        identity: &mut impl IdentityPort,
        report: &mut CycleReport,
        sink: &mut impl EventSink,
    ) -> RetainedState {
        let mut state = match store.load() {
            Ok(state) => {
                debug!(
                    "Retained: last_reading={} device_id='{}'",
                    state.last_reading, state.device_id
                );
                state
            }
            Err(RetainedError::Uninitialised) => {
                info!("Retained memory empty, starting from sentinel");
                RetainedState::default()
            }
            Err(e) => {
                Self::fault(e.into(), report, sink);
                RetainedState::default()
            }
        };

        if !state.has_device_id() {
            state.device_id = identity.device_id();
            info!("Device ID resolved: {}", state.device_id);
        }
        state
    }

    fn transition(&mut self, next: CyclePhase, sink: &mut impl EventSink) {
        let from = self.phase;
        self.phase = next;
        sink.emit(&CycleEvent::PhaseChanged { from, to: next });
    }

    fn fault(error: Error, report: &mut CycleReport, sink: &mut impl EventSink) {
        warn!("Cycle fault: {}", error);
        sink.emit(&CycleEvent::Fault(error));
        report.record(error);
    }
}
