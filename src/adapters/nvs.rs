//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`]. The whole [`SystemConfig`] is stored as one
//! postcard blob under `aqpncs/syscfg`; no blob means "use defaults".
//!
//! - Every save is validated first; invalid values never reach flash.
//! - ESP-IDF NVS commits are atomic, so a brown-out leaves either the old
//!   or the new blob.
//! - The host backend keeps the blob in memory (dev/test only).

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::{SystemConfig, validate_config};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    ESP_ERR_NVS_NEW_VERSION_FOUND, ESP_ERR_NVS_NO_FREE_PAGES, ESP_ERR_NVS_NOT_FOUND, EspError, esp,
    esp_err_t, nvs_close, nvs_commit, nvs_flash_erase, nvs_flash_init, nvs_get_blob, nvs_handle_t,
    nvs_open, nvs_open_mode_t_NVS_READONLY, nvs_open_mode_t_NVS_READWRITE, nvs_set_blob,
};

#[cfg(target_os = "espidf")]
const NAMESPACE: &core::ffi::CStr = c"aqpncs";
#[cfg(target_os = "espidf")]
const KEY: &core::ffi::CStr = c"syscfg";

/// Upper bound on a stored blob; anything larger is treated as damage.
#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsConfigStore {
    #[cfg(not(target_os = "espidf"))]
    blob: std::cell::RefCell<Option<Vec<u8>>>,
}

impl NvsConfigStore {
    /// Bring up the NVS partition.
    ///
    /// A full or version-mismatched partition is erased and re-initialised
    /// once; only a failure after that is reported.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: runs once on the main task before any other NVS user.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: partition unusable ({}), erasing", ret);
                esp!(unsafe { nvs_flash_erase() }).map_err(|_| ConfigError::IoError)?;
                esp!(unsafe { nvs_flash_init() }).map_err(|_| ConfigError::IoError)?;
            } else {
                esp!(ret).map_err(|_| ConfigError::IoError)?;
            }
            info!("NvsConfigStore: flash ready");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsConfigStore: in-memory backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            blob: std::cell::RefCell::new(None),
        })
    }

    /// Stored config if it loads and validates, defaults otherwise.
    ///
    /// The probe has to boot and publish even with a damaged or stale
    /// blob in flash.
    pub fn load_or_default(&self) -> SystemConfig {
        let loaded = self
            .load()
            .and_then(|cfg| validate_config(&cfg).map(|()| cfg));
        loaded.unwrap_or_else(|e| {
            warn!("NvsConfigStore: {} - falling back to defaults", e);
            SystemConfig::default()
        })
    }

    fn decode(bytes: &[u8]) -> Result<SystemConfig, ConfigError> {
        let cfg = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        info!("NvsConfigStore: loaded {} byte config", bytes.len());
        Ok(cfg)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        Ok(self.blob.borrow().clone())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&self, bytes: Vec<u8>) -> Result<(), ConfigError> {
        *self.blob.borrow_mut() = Some(bytes);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        let handle = match NvsHandle::open(false) {
            Ok(h) => h,
            // Namespace is created on first write.
            Err(e) if e.code() == ESP_ERR_NVS_NOT_FOUND as esp_err_t => return Ok(None),
            Err(e) => {
                warn!("NvsConfigStore: open failed: {}", e);
                return Err(ConfigError::IoError);
            }
        };
        handle.get_blob().map_err(|e| {
            warn!("NvsConfigStore: read failed: {}", e);
            ConfigError::IoError
        })
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&self, bytes: Vec<u8>) -> Result<(), ConfigError> {
        NvsHandle::open(true)
            .and_then(|h| h.set_blob(&bytes))
            .map_err(|e| {
                warn!("NvsConfigStore: write failed: {}", e);
                ConfigError::IoError
            })
    }
}

impl ConfigPort for NvsConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        match self.read_blob()? {
            Some(bytes) => Self::decode(&bytes),
            None => {
                info!("NvsConfigStore: nothing stored, using defaults");
                Ok(SystemConfig::default())
            }
        }
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        let len = bytes.len();
        self.write_blob(bytes)?;
        info!("NvsConfigStore: saved {} byte config", len);
        Ok(())
    }
}

/// Open namespace handle, closed on drop.
#[cfg(target_os = "espidf")]
struct NvsHandle(nvs_handle_t);

#[cfg(target_os = "espidf")]
impl NvsHandle {
    fn open(writable: bool) -> Result<Self, EspError> {
        let mode = if writable {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        // SAFETY: NAMESPACE is NUL-terminated; `handle` outlives the call.
        esp!(unsafe { nvs_open(NAMESPACE.as_ptr(), mode, &mut handle) })?;
        Ok(Self(handle))
    }

    fn get_blob(&self) -> Result<Option<Vec<u8>>, EspError> {
        let mut size: usize = 0;
        // SAFETY: a null output pointer asks NVS for the stored size only.
        let ret = unsafe { nvs_get_blob(self.0, KEY.as_ptr(), core::ptr::null_mut(), &mut size) };
        if ret == ESP_ERR_NVS_NOT_FOUND as esp_err_t {
            return Ok(None);
        }
        esp!(ret)?;
        if size == 0 || size > MAX_BLOB_SIZE {
            warn!("NvsConfigStore: implausible blob size {}", size);
            return Ok(None);
        }

        let mut buf = vec![0u8; size];
        // SAFETY: `buf` holds exactly `size` writable bytes.
        esp!(unsafe { nvs_get_blob(self.0, KEY.as_ptr(), buf.as_mut_ptr().cast(), &mut size) })?;
        buf.truncate(size);
        Ok(Some(buf))
    }

    fn set_blob(&self, bytes: &[u8]) -> Result<(), EspError> {
        // SAFETY: `bytes` is valid for reads of `bytes.len()` bytes.
        esp!(unsafe { nvs_set_blob(self.0, KEY.as_ptr(), bytes.as_ptr().cast(), bytes.len()) })?;
        esp!(unsafe { nvs_commit(self.0) })
    }
}

#[cfg(target_os = "espidf")]
impl Drop for NvsHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful nvs_open.
        unsafe { nvs_close(self.0) }
    }
}
