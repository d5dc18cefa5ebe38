//! Probe identity from the factory base MAC.
//!
//! All six MAC bytes as lowercase hex, e.g. `24a160c3d2e1`. This is the
//! middle component of the gauge name. [`CycleService`] asks for it only
//! when retained memory is empty and caches it there afterwards.
//!
//! [`CycleService`]: crate::app::service::CycleService

use core::fmt::Write;

use crate::app::ports::IdentityPort;
use crate::retained::DeviceId;

#[cfg(target_os = "espidf")]
fn factory_mac() -> [u8; 6] {
    let mut mac = [0u8; 6];
    // SAFETY: eFuse read into a 6-byte buffer owned by this frame.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Fixed on the host so gauge names are stable across runs.
#[cfg(not(target_os = "espidf"))]
fn factory_mac() -> [u8; 6] {
    [0x24, 0xA1, 0x60, 0xC3, 0xD2, 0xE1]
}

/// Lowercase hex of `mac`, no separators.
pub fn format_id(mac: &[u8; 6]) -> DeviceId {
    mac.iter().fold(DeviceId::new(), |mut id, byte| {
        // 12 chars always fit the 24-byte id buffer.
        let _ = write!(id, "{byte:02x}");
        id
    })
}

#[derive(Debug, Default)]
pub struct MacIdentity;

impl MacIdentity {
    pub fn new() -> Self {
        Self
    }
}

impl IdentityPort for MacIdentity {
    fn device_id(&mut self) -> DeviceId {
        format_id(&factory_mac())
    }
}
