//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing cycle events to the ESP-IDF logger
//! (UART / USB-CDC in production). Per-phase chatter is logged at debug
//! level so it only shows with `verbose` set.

use log::{debug, info, warn};

use crate::app::events::CycleEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`CycleEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &CycleEvent) {
        match event {
            CycleEvent::Started { wake, device_id } => {
                info!("START | wake={:?} | device={}", wake, device_id);
            }
            CycleEvent::PhaseChanged { from, to } => {
                debug!("CYCLE | {:?} -> {:?}", from, to);
            }
            CycleEvent::Measured(response) => {
                info!(
                    "MEASURE | status={:?} | '{}'",
                    response.status_code(),
                    response.text()
                );
            }
            CycleEvent::Published { value, baseline } => {
                info!("PUBLISH | {:.3} (was {:.3})", value, baseline);
            }
            CycleEvent::Suppressed { value, baseline } => {
                info!(
                    "HOLD | {:.3} within threshold of {:.3}",
                    value, baseline
                );
            }
            CycleEvent::Fault(error) => {
                warn!("FAULT | {}", error);
            }
            CycleEvent::Finished(report) => {
                info!(
                    "DONE | reading={:?} published={} baseline={:.3} errors={}",
                    report.reading,
                    report.published,
                    report.last_reading,
                    report.errors.len() + usize::from(report.dropped_errors)
                );
            }
        }
    }
}
