//! Time adapter.
//!
//! Uptime for cycle timing, and a blocking [`DelayNs`] for the EZO settle
//! waits on the host.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()`. The device
//!   build delays with `esp_idf_hal::delay::FreeRtos` instead of
//!   [`StdDelay`].
//! - **all other targets**: `std::time::Instant` and `thread::sleep`.

use embedded_hal::delay::DelayNs;

/// Monotonic uptime source.
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot. Deep sleep resets this on the device.
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since the adapter was created.
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Thread-sleeping delay for host runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
