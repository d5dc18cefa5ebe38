//! Decoding of EZO I2C response frames.
//!
//! ```text
//!   byte 0      bytes 1..n
//!   ┌────────┬──────────────────────────────┐
//!   │ status │ ASCII payload, NUL-padded    │
//!   └────────┴──────────────────────────────┘
//! ```

/// Largest frame any circuit sends (EC: status + 31 payload bytes).
pub const MAX_RESPONSE_SIZE: usize = 32;

/// Decoded payload text.
pub type ResponseText = heapless::String<{ MAX_RESPONSE_SIZE - 1 }>;

/// Status byte values.
pub mod status {
    pub const SUCCESS: u8 = 1;
    pub const FAILED: u8 = 2;
    pub const PENDING: u8 = 254;
    pub const NO_DATA: u8 = 255;
}

/// Outcome of one command exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChipResponse {
    /// The command was sent without requesting a response.
    Unread,
    /// Status 1, with the payload decoded up to the first NUL.
    Data(ResponseText),
    /// Status 2.
    Failed,
    /// Status 254.
    Pending,
    /// Status 255.
    NoData,
    /// Any status byte the circuit firmware does not document.
    Unknown(u8),
}

impl ChipResponse {
    /// Decode a raw frame. An empty frame means nothing was read.
    pub fn decode(frame: &[u8]) -> Self {
        let Some((&code, payload)) = frame.split_first() else {
            return Self::Unread;
        };
        match code {
            status::SUCCESS => Self::Data(decode_payload(payload)),
            status::FAILED => Self::Failed,
            status::PENDING => Self::Pending,
            status::NO_DATA => Self::NoData,
            other => Self::Unknown(other),
        }
    }

    /// The raw status byte, or `None` when no response was read.
    pub fn status_code(&self) -> Option<u8> {
        match self {
            Self::Unread => None,
            Self::Data(_) => Some(status::SUCCESS),
            Self::Failed => Some(status::FAILED),
            Self::Pending => Some(status::PENDING),
            Self::NoData => Some(status::NO_DATA),
            Self::Unknown(code) => Some(*code),
        }
    }

    /// Payload text for `Data`, the fixed diagnostic message otherwise.
    pub fn text(&self) -> &str {
        match self {
            Self::Data(text) => text.as_str(),
            Self::Failed => "Request Failed",
            Self::Pending => "Pending",
            Self::NoData => "No Data",
            Self::Unread | Self::Unknown(_) => "",
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }
}

/// Payload bytes up to the first NUL. Non-ASCII bytes become `?`.
fn decode_payload(payload: &[u8]) -> ResponseText {
    let mut text = ResponseText::new();
    for &b in payload.iter().take_while(|&&b| b != 0) {
        let c = if b.is_ascii() { char::from(b) } else { '?' };
        if text.push(c).is_err() {
            break;
        }
    }
    text
}
