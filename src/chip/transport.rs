//! Command/response exchange with a single EZO circuit.
//!
//! Generic over `embedded-hal` 1.0 I2C and delay traits so the same code
//! drives the ESP-IDF `I2cDriver` on hardware and mock buses on the host.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::debug;

use super::response::{ChipResponse, MAX_RESPONSE_SIZE};
use crate::error::BusError;

/// Owns the bus and the delay provider used for settle waits.
pub struct ChipTransport<I2C, D> {
    bus: I2C,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> ChipTransport<I2C, D> {
    pub fn new(bus: I2C, delay: D) -> Self {
        Self { bus, delay }
    }

    /// Write `command` to `address`, wait `settle_delay_ms`, then read and
    /// decode `response_size` bytes.
    ///
    /// With `response_size == 0` no read is issued and the result is
    /// [`ChipResponse::Unread`]. Argument checks happen before any bus
    /// traffic.
    pub fn send_command(
        &mut self,
        command: &str,
        address: u8,
        settle_delay_ms: u32,
        response_size: usize,
    ) -> Result<ChipResponse, BusError> {
        if address > 0x7F {
            return Err(BusError::InvalidAddress(address));
        }
        if response_size > MAX_RESPONSE_SIZE {
            return Err(BusError::ResponseTooLarge(response_size));
        }

        self.bus
            .write(address, command.as_bytes())
            .map_err(|e| BusError::Write(e.kind()))?;
        self.delay.delay_ms(settle_delay_ms);

        if response_size == 0 {
            return Ok(ChipResponse::Unread);
        }

        let mut frame = [0u8; MAX_RESPONSE_SIZE];
        self.bus
            .read(address, &mut frame[..response_size])
            .map_err(|e| BusError::Read(e.kind()))?;

        let response = ChipResponse::decode(&frame[..response_size]);
        debug!(
            "EZO 0x{:02X} | {} -> status={:?} '{}'",
            address,
            command,
            response.status_code(),
            response.text()
        );
        Ok(response)
    }

    pub fn bus(&self) -> &I2C {
        &self.bus
    }

    /// Give back the bus and delay (used by tests to inspect mocks).
    pub fn release(self) -> (I2C, D) {
        (self.bus, self.delay)
    }
}
