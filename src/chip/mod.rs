//! Atlas Scientific EZO circuits over I2C.
//!
//! ```text
//!   ChipController ──▶ ChipTransport ──▶ embedded_hal::i2c::I2c
//!   (wake/measure/     (write, settle,     (ESP-IDF I2cDriver,
//!    sleep/led)         read, decode)       sim circuit, mocks)
//! ```
//!
//! Every command is ASCII, followed by a fixed settle delay, followed by
//! an optional read of a fixed-size response whose first byte is a status
//! code. Response sizes and delays below come from the EZO datasheets and
//! are not tunable.

pub mod controller;
pub mod response;
pub mod transport;

use response::ChipResponse;

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

/// Take a single reading.
pub const CMD_READ: &str = "R";
/// Enter low-power mode until the next command.
pub const CMD_SLEEP: &str = "SLEEP";
/// Indicator LED on / off.
pub const CMD_LED_ON: &str = "L,1";
pub const CMD_LED_OFF: &str = "L,0";

/// Processing time for `R`, identical across circuit types.
pub const READ_SETTLE_MS: u32 = 1000;
/// Processing time for `SLEEP` and `L,x`.
pub const SHORT_SETTLE_MS: u32 = 300;

// ---------------------------------------------------------------------------
// Circuit identity
// ---------------------------------------------------------------------------

/// EZO circuit family. Decides response framing and warm-up length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipType {
    Ph,
    Ec,
    Orp,
    DissolvedOxygen,
}

impl ChipType {
    /// Bytes to request after `R`, status byte included.
    pub const fn response_size(self) -> usize {
        match self {
            Self::Ph => 7,
            Self::Ec => 32,
            Self::Orp => 8,
            Self::DissolvedOxygen => 14,
        }
    }

    /// Number of discarded `R` commands needed before a reading is trusted.
    pub const fn wake_reads(self) -> u8 {
        match self {
            Self::DissolvedOxygen => 16,
            _ => 4,
        }
    }

    /// Factory I2C address.
    pub const fn default_address(self) -> u8 {
        match self {
            Self::DissolvedOxygen => 0x61,
            Self::Orp => 0x62,
            Self::Ph => 0x63,
            Self::Ec => 0x64,
        }
    }
}

/// Circuit protocol mode. Recorded only: the controller always speaks
/// I2C and never checks this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChipMode {
    #[default]
    I2c,
    Serial,
}

/// One physical circuit on the bus.
///
/// Lives for the whole process; [`ChipController::measure`] overwrites
/// `last_response` in place.
///
/// [`ChipController::measure`]: crate::app::ports::ProbePort::measure
#[derive(Debug, Clone, PartialEq)]
pub struct ChipDescriptor {
    pub chip_type: ChipType,
    pub mode: ChipMode,
    pub address: u8,
    pub last_response: ChipResponse,
}

impl ChipDescriptor {
    pub fn new(chip_type: ChipType, address: u8) -> Self {
        Self {
            chip_type,
            mode: ChipMode::I2c,
            address,
            last_response: ChipResponse::Unread,
        }
    }

    /// A pH circuit at `address`.
    pub fn ph(address: u8) -> Self {
        Self::new(ChipType::Ph, address)
    }
}
