//! Unified error types for the aqpncs firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the cycle
//! report and the top-level loop handle failures uniformly. All variants
//! are `Copy` and carry no heap data.

use core::fmt;

use embedded_hal::i2c::ErrorKind;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An I2C transaction with the EZO circuit failed.
    Bus(BusError),
    /// The circuit answered, but not with a usable number.
    Reading(ReadingError),
    /// The statsd datagram could not be built or sent.
    Publish(PublishError),
    /// Retained memory did not hold a valid image.
    Retained(RetainedError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Reading(e) => write!(f, "reading: {e}"),
            Self::Publish(e) => write!(f, "publish: {e}"),
            Self::Retained(e) => write!(f, "retained: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

/// Failures of a single command/response exchange on the I2C bus.
///
/// These are distinct from the status bytes the circuit itself reports
/// (see [`ChipResponse`](crate::chip::response::ChipResponse)): a bus error
/// means no status byte was obtained at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Address is outside the 7-bit range.
    InvalidAddress(u8),
    /// Requested response is larger than the transport buffer.
    ResponseTooLarge(usize),
    /// The command write was not acknowledged.
    Write(ErrorKind),
    /// The response read failed.
    Read(ErrorKind),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress(addr) => write!(f, "address 0x{addr:02X} is not 7-bit"),
            Self::ResponseTooLarge(n) => write!(f, "response of {n} bytes exceeds buffer"),
            Self::Write(kind) => write!(f, "write failed: {kind}"),
            Self::Read(kind) => write!(f, "read failed: {kind}"),
        }
    }
}

impl std::error::Error for BusError {}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Reading errors
// ---------------------------------------------------------------------------

/// Why a circuit response could not be turned into a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingError {
    /// Status 2: the circuit rejected the command.
    Failed,
    /// Status 254: the circuit is still processing.
    Pending,
    /// Status 255: the circuit has nothing to report.
    NoData,
    /// Any other status byte.
    Unknown(u8),
    /// Status 1 but the payload was empty.
    Empty,
    /// Status 1 but the payload is not a finite decimal number.
    Malformed,
}

impl fmt::Display for ReadingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed => write!(f, "request failed"),
            Self::Pending => write!(f, "result pending"),
            Self::NoData => write!(f, "no data"),
            Self::Unknown(code) => write!(f, "unknown status {code}"),
            Self::Empty => write!(f, "empty payload"),
            Self::Malformed => write!(f, "payload is not a number"),
        }
    }
}

impl std::error::Error for ReadingError {}

impl From<ReadingError> for Error {
    fn from(e: ReadingError) -> Self {
        Self::Reading(e)
    }
}

// ---------------------------------------------------------------------------
// Publish errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    /// The gauge line does not fit the datagram buffer.
    LineTooLong,
    /// The local UDP socket could not be opened.
    Bind,
    /// The datagram was not accepted by the network stack.
    Send,
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineTooLong => write!(f, "gauge line too long"),
            Self::Bind => write!(f, "UDP bind failed"),
            Self::Send => write!(f, "UDP send failed"),
        }
    }
}

impl std::error::Error for PublishError {}

impl From<PublishError> for Error {
    fn from(e: PublishError) -> Self {
        Self::Publish(e)
    }
}

// ---------------------------------------------------------------------------
// Retained-memory errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetainedError {
    /// Magic word missing: memory was never written (cold boot).
    Uninitialised,
    /// Magic word present but the checksum does not match.
    Corrupted,
}

impl fmt::Display for RetainedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialised => write!(f, "retained image uninitialised"),
            Self::Corrupted => write!(f, "retained image checksum mismatch"),
        }
    }
}

impl std::error::Error for RetainedError {}

impl From<RetainedError> for Error {
    fn from(e: RetainedError) -> Self {
        Self::Retained(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
