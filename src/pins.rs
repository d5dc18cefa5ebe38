//! GPIO / peripheral pin assignments for the probe board.
//!
//! Single source of truth for pin numbers; `main` builds the I2C driver
//! from these.

// ---------------------------------------------------------------------------
// I²C bus (EZO circuit in I2C mode)
// ---------------------------------------------------------------------------

/// Default ESP32 DevKit I2C data pin.
pub const I2C_SDA_GPIO: i32 = 21;
/// Default ESP32 DevKit I2C clock pin.
pub const I2C_SCL_GPIO: i32 = 22;

/// Standard-mode bus clock. EZO circuits support up to 400 kHz; 100 kHz
/// tolerates long probe leads.
pub const I2C_BAUD_HZ: u32 = 100_000;
