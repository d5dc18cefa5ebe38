//! Power management adapter.
//!
//! - **`target_os = "espidf"`**: reads the sleep wakeup cause and enters
//!   timer-woken deep sleep. `power_down` never returns; the chip restarts
//!   from reset with RTC memory intact.
//! - **all other targets**: the first cycle reports `PowerOn`, later ones
//!   `Timer`, and `power_down` blocks the thread for the sleep period so
//!   the simulation loop paces like the device.

use log::info;

use crate::app::ports::{PowerPort, WakeReason};

pub struct DeepSleepPower {
    #[cfg(not(target_os = "espidf"))]
    slept: bool,
}

impl Default for DeepSleepPower {
    fn default() -> Self {
        Self::new()
    }
}

impl DeepSleepPower {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            slept: false,
        }
    }
}

#[cfg(target_os = "espidf")]
impl PowerPort for DeepSleepPower {
    fn wake_reason(&self) -> WakeReason {
        use esp_idf_svc::sys::*;
        // SAFETY: read-only query of the last wakeup source.
        let cause = unsafe { esp_sleep_get_wakeup_cause() };
        if cause == esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER {
            WakeReason::Timer
        } else if cause == esp_sleep_source_t_ESP_SLEEP_WAKEUP_UNDEFINED {
            WakeReason::PowerOn
        } else {
            WakeReason::Other
        }
    }

    fn power_down(&mut self, secs: u32) {
        info!("Power: deep sleep for {}s", secs);
        // SAFETY: retained state has been saved; nothing else needs to
        // survive the reset that follows.
        unsafe { esp_idf_svc::sys::esp_deep_sleep(u64::from(secs) * 1_000_000) }
    }
}

#[cfg(not(target_os = "espidf"))]
impl PowerPort for DeepSleepPower {
    fn wake_reason(&self) -> WakeReason {
        if self.slept {
            WakeReason::Timer
        } else {
            WakeReason::PowerOn
        }
    }

    fn power_down(&mut self, secs: u32) {
        info!("Power(sim): sleeping {}s", secs);
        std::thread::sleep(std::time::Duration::from_secs(u64::from(secs)));
        self.slept = true;
    }
}
