//! Numeric interpretation of circuit responses and the publish gate.
//!
//! Only a status-1 payload that parses as a finite decimal becomes a
//! [`Reading`]. Every other response maps to a [`ReadingError`], so an
//! error message can never be mistaken for a measurement of zero.

use crate::chip::response::{ChipResponse, ResponseText};
use crate::error::ReadingError;

/// A successfully parsed measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Parsed value of the first field.
    pub value: f32,
    /// The first field exactly as the circuit sent it (used as the gauge
    /// value so no precision is lost to float formatting).
    pub text: ResponseText,
}

impl Reading {
    /// Convert a response into a reading.
    ///
    /// Multi-field payloads (EC: `"EC,TDS,SAL,SG"`) use the first field.
    pub fn from_response(response: &ChipResponse) -> Result<Self, ReadingError> {
        let payload = match response {
            ChipResponse::Data(text) => text.as_str(),
            ChipResponse::Failed => return Err(ReadingError::Failed),
            ChipResponse::Pending => return Err(ReadingError::Pending),
            ChipResponse::NoData => return Err(ReadingError::NoData),
            ChipResponse::Unknown(code) => return Err(ReadingError::Unknown(*code)),
            ChipResponse::Unread => return Err(ReadingError::Empty),
        };

        let field = payload.split(',').next().unwrap_or("").trim();
        if field.is_empty() {
            return Err(ReadingError::Empty);
        }
        let value: f32 = field.parse().map_err(|_| ReadingError::Malformed)?;
        if !value.is_finite() {
            return Err(ReadingError::Malformed);
        }

        let mut text = ResponseText::new();
        text.push_str(field).map_err(|_| ReadingError::Malformed)?;
        Ok(Self { value, text })
    }
}

/// Differences this close to the threshold count as equal to it.
///
/// Readings arrive as decimal text (`"7.05"`) and are stored as `f32`, so a
/// delta of exactly 0.05 in decimal can come out a few ULPs above 0.05.
/// The circuit resolves 0.001 at best, far coarser than this.
const EDGE_TOLERANCE: f64 = 1e-4;

/// `true` when `current` differs from the published baseline by strictly
/// more than `threshold`, judged on the decimal values the circuit sent.
pub fn exceeds_threshold(current: f32, baseline: f32, threshold: f32) -> bool {
    let delta = (f64::from(current) - f64::from(baseline)).abs();
    delta > f64::from(threshold) + EDGE_TOLERANCE
}
