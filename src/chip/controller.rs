//! Wake / measure / sleep sequencing for EZO circuits.
//!
//! Each operation is a fixed, one-shot command sequence; nothing is
//! remembered between calls except the descriptor's `last_response`.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, warn};

use super::response::ChipResponse;
use super::transport::ChipTransport;
use super::{
    ChipDescriptor, CMD_LED_OFF, CMD_LED_ON, CMD_READ, CMD_SLEEP, READ_SETTLE_MS,
    SHORT_SETTLE_MS,
};
use crate::app::ports::ProbePort;
use crate::error::BusError;

/// Drives circuits through a [`ChipTransport`].
pub struct ChipController<I2C, D> {
    transport: ChipTransport<I2C, D>,
}

impl<I2C: I2c, D: DelayNs> ChipController<I2C, D> {
    pub fn new(transport: ChipTransport<I2C, D>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &ChipTransport<I2C, D> {
        &self.transport
    }

    pub fn into_transport(self) -> ChipTransport<I2C, D> {
        self.transport
    }
}

impl<I2C: I2c, D: DelayNs> ProbePort for ChipController<I2C, D> {
    /// Purge stale output with `wake_reads()` discarded `R` commands.
    ///
    /// Always issues the full count. The first bus error, if any, is
    /// returned after the last purge.
    fn wake(&mut self, chip: &ChipDescriptor) -> Result<(), BusError> {
        let reads = chip.chip_type.wake_reads();
        let mut first_err = None;
        for i in 0..reads {
            if let Err(e) = self
                .transport
                .send_command(CMD_READ, chip.address, READ_SETTLE_MS, 0)
            {
                warn!("EZO wake {}/{} failed: {}", i + 1, reads, e);
                first_err.get_or_insert(e);
            }
        }
        debug!("EZO 0x{:02X} | woke with {} purge reads", chip.address, reads);
        first_err.map_or(Ok(()), Err)
    }

    fn measure(&mut self, chip: &mut ChipDescriptor) -> Result<ChipResponse, BusError> {
        let response = self.transport.send_command(
            CMD_READ,
            chip.address,
            READ_SETTLE_MS,
            chip.chip_type.response_size(),
        )?;
        chip.last_response = response.clone();
        Ok(response)
    }

    fn sleep(&mut self, chip: &ChipDescriptor) -> Result<(), BusError> {
        self.transport
            .send_command(CMD_SLEEP, chip.address, SHORT_SETTLE_MS, 0)
            .map(|_| ())
    }

    fn set_led(&mut self, chip: &ChipDescriptor, on: bool) -> Result<(), BusError> {
        let cmd = if on { CMD_LED_ON } else { CMD_LED_OFF };
        self.transport
            .send_command(cmd, chip.address, SHORT_SETTLE_MS, 0)
            .map(|_| ())
    }
}
