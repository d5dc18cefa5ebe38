//! Simulated EZO pH circuit for host runs.
//!
//! Implements `embedded_hal::i2c::I2c` so the real [`ChipTransport`]
//! drives it unchanged. Answers `R` with a slowly drifting pH value,
//! accepts `SLEEP` and `L,x`, and reports status 255 when read without a
//! pending command.
//!
//! [`ChipTransport`]: crate::chip::transport::ChipTransport

use core::fmt::Write;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::chip::response::status;

pub struct SimPhCircuit {
    address: u8,
    pending: Option<heapless::String<8>>,
    reads: u32,
    led_on: bool,
    asleep: bool,
}

impl SimPhCircuit {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            pending: None,
            reads: 0,
            led_on: false,
            asleep: false,
        }
    }

    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    pub fn led_on(&self) -> bool {
        self.led_on
    }

    /// Triangle wave between 6.80 and 7.20, one step per `R`.
    fn current_ph(&self) -> f32 {
        let step = (self.reads % 40) as f32;
        let offset = if step < 20.0 { step } else { 40.0 - step };
        6.80 + offset * 0.02
    }

    fn handle_write(&mut self, bytes: &[u8]) {
        self.asleep = false;
        let cmd = core::str::from_utf8(bytes).unwrap_or("");
        match cmd {
            "R" => self.reads = self.reads.wrapping_add(1),
            "SLEEP" => self.asleep = true,
            "L,1" => self.led_on = true,
            "L,0" => self.led_on = false,
            _ => {}
        }
        self.pending = Some(crate::config::bounded(cmd));
    }

    fn handle_read(&mut self, buf: &mut [u8]) {
        buf.fill(0);
        let Some(first) = buf.first_mut() else {
            return;
        };
        match self.pending.take().as_deref() {
            Some("R") => {
                *first = status::SUCCESS;
                let mut text = heapless::String::<16>::new();
                let _ = write!(text, "{:.2}", self.current_ph());
                for (dst, src) in buf[1..].iter_mut().zip(text.bytes()) {
                    *dst = src;
                }
            }
            Some(_) => *first = status::SUCCESS,
            None => *first = status::NO_DATA,
        }
    }
}

impl ErrorType for SimPhCircuit {
    type Error = ErrorKind;
}

impl I2c for SimPhCircuit {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.handle_write(bytes),
                Operation::Read(buf) => self.handle_read(buf),
            }
        }
        Ok(())
    }
}
