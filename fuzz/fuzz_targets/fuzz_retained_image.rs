//! Fuzz target: `RetainedImage::decode`
//!
//! RTC memory holds whatever a brown-out left behind. Any bit pattern
//! must decode to a state or a typed error, never a panic, and a decoded
//! state must survive re-encoding unchanged.
//!
//! cargo fuzz run fuzz_retained_image

#![no_main]

use aqpncs::retained::RetainedImage;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < size_of::<RetainedImage>() {
        return;
    }
    // SAFETY: every field is plain integer data, so any bit pattern is a
    // valid value; read_unaligned tolerates the fuzzer's buffer alignment.
    let image: RetainedImage =
        unsafe { core::ptr::read_unaligned(data.as_ptr().cast::<RetainedImage>()) };

    if let Ok(state) = image.decode() {
        let again = RetainedImage::encode(&state).decode();
        if state.last_reading.is_nan() {
            assert!(again.is_ok());
        } else {
            assert_eq!(again, Ok(state));
        }
    }
});
