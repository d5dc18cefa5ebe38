//! Outbound cycle events.
//!
//! The [`CycleService`](super::service::CycleService) emits these through
//! the [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them (serial log today).

use super::ports::WakeReason;
use crate::chip::response::ChipResponse;
use crate::error::Error;
use crate::retained::DeviceId;

/// Phases of one wake cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CyclePhase {
    Idle,
    Waking,
    Measuring,
    Deciding,
    Publishing,
    Sleeping,
    PowerDown,
}

/// Structured events emitted by the cycle.
#[derive(Debug, Clone)]
pub enum CycleEvent {
    /// A cycle began (carries why the CPU is awake and who we are).
    Started {
        wake: WakeReason,
        device_id: DeviceId,
    },

    /// The cycle moved between phases.
    PhaseChanged { from: CyclePhase, to: CyclePhase },

    /// The circuit answered a reading request.
    Measured(ChipResponse),

    /// A value crossed the threshold and was handed to the publisher.
    Published { value: f32, baseline: f32 },

    /// A value stayed within the threshold of the baseline.
    Suppressed { value: f32, baseline: f32 },

    /// Something failed; the cycle continues.
    Fault(Error),

    /// The cycle is complete and the device is about to power down.
    Finished(CycleReport),
}

/// Summary of one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Parsed value, if the circuit produced one.
    pub reading: Option<f32>,
    /// Whether the publisher was invoked.
    pub published: bool,
    /// Baseline carried into the next cycle.
    pub last_reading: f32,
    /// Failures observed, oldest first.
    pub errors: heapless::Vec<Error, MAX_CYCLE_FAULTS>,
    /// Failures that did not fit in `errors`.
    pub dropped_errors: u8,
}

/// Most faults one cycle can raise: retained load, wake, LED on, measure,
/// LED off, sleep.
pub const MAX_CYCLE_FAULTS: usize = 6;

impl CycleReport {
    pub(crate) fn record(&mut self, error: Error) {
        if self.errors.push(error).is_err() {
            self.dropped_errors = self.dropped_errors.saturating_add(1);
        }
    }
}
