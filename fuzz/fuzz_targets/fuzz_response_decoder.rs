//! Fuzz target: `ChipResponse::decode` and `Reading::from_response`
//!
//! Arbitrary frames must decode without panicking, data text must stay
//! ASCII and within the frame, and only data responses may become
//! readings.
//!
//! cargo fuzz run fuzz_response_decoder

#![no_main]

use aqpncs::chip::response::{ChipResponse, MAX_RESPONSE_SIZE};
use aqpncs::reading::Reading;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let frame = &data[..data.len().min(MAX_RESPONSE_SIZE)];
    let response = ChipResponse::decode(frame);

    if let ChipResponse::Data(text) = &response {
        assert!(text.is_ascii());
        assert!(text.len() < frame.len().max(1));
    }

    if let Ok(reading) = Reading::from_response(&response) {
        assert!(response.is_data(), "non-data response became a reading");
        assert!(reading.value.is_finite());
    }
});
