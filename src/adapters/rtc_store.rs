//! RTC slow-memory adapter for [`RetainedStore`].
//!
//! On ESP-IDF the image lives in `.rtc.data`, which the bootloader
//! zero-fills on cold boot and leaves untouched across deep sleep. On the
//! host the same static simply lives for the process, which is what the
//! simulation loop needs.

use log::debug;

use crate::app::ports::RetainedStore;
use crate::error::RetainedError;
use crate::retained::{RetainedImage, RetainedState};

#[cfg_attr(target_os = "espidf", unsafe(link_section = ".rtc.data"))]
static mut RTC_IMAGE: RetainedImage = RetainedImage::blank();

/// Zero-sized handle to the retained image.
///
/// Only the main task may hold one: access is unsynchronised.
#[derive(Debug)]
pub struct RtcRetainedStore {
    _private: (),
}

impl RtcRetainedStore {
    /// # Safety
    ///
    /// At most one instance may exist, and only on the main task.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RetainedStore for RtcRetainedStore {
    fn load(&mut self) -> Result<RetainedState, RetainedError> {
        // SAFETY: single instance on the main task (see `new`).
        let image = unsafe { core::ptr::read(&raw const RTC_IMAGE) };
        image.decode()
    }

    fn save(&mut self, state: &RetainedState) {
        let image = RetainedImage::encode(state);
        // SAFETY: single instance on the main task (see `new`).
        unsafe { core::ptr::write(&raw mut RTC_IMAGE, image) };
        debug!(
            "RTC: saved last_reading={} device_id='{}'",
            state.last_reading, state.device_id
        );
    }
}
