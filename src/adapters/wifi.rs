//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`]. The probe is awake for a few seconds
//! per cycle, so there is no reconnect loop: one blocking bring-up per
//! wake, and a failure only costs that cycle's publish.
//!
//! On `espidf` the `BlockingWifi<EspWifi>` driver is handed in from `main`
//! via [`WifiAdapter::attach`]; the host build pretends every join works.

use core::fmt;
use log::{error, info};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

/// 802.11 SSID limit in bytes.
const SSID_MAX: usize = 32;
/// WPA2 passphrase bounds; an empty passphrase joins an open network.
const PASSPHRASE_MIN: usize = 8;
const PASSPHRASE_MAX: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    MissingCredentials,
    BadSsid,
    BadPassphrase,
    /// Device build only: `attach` was never called.
    NoDriver,
    JoinFailed,
    AlreadyJoined,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MissingCredentials => "no network configured",
            Self::BadSsid => "SSID must be 1..=32 printable ASCII bytes",
            Self::BadPassphrase => "passphrase must be empty or 8..=64 printable ASCII bytes",
            Self::NoDriver => "radio driver missing",
            Self::JoinFailed => "could not join network",
            Self::AlreadyJoined => "station already joined",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ConnectivityError {}

pub trait ConnectivityPort {
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Idle,
    Joining,
    Joined,
    Failed,
}

/// SSID and passphrase that already passed validation.
#[derive(Debug, Clone, Default)]
struct Credentials {
    ssid: heapless::String<SSID_MAX>,
    passphrase: heapless::String<PASSPHRASE_MAX>,
}

impl Credentials {
    fn parse(ssid: &str, passphrase: &str) -> Result<Self, ConnectivityError> {
        let printable = |s: &str| s.bytes().all(|b| (b' '..=b'~').contains(&b));

        if ssid.is_empty() || !printable(ssid) {
            return Err(ConnectivityError::BadSsid);
        }
        let open = passphrase.is_empty();
        if !open && (passphrase.len() < PASSPHRASE_MIN || !printable(passphrase)) {
            return Err(ConnectivityError::BadPassphrase);
        }

        Ok(Self {
            // Capacity checks double as the upper length bound.
            ssid: ssid.try_into().map_err(|_| ConnectivityError::BadSsid)?,
            passphrase: passphrase
                .try_into()
                .map_err(|_| ConnectivityError::BadPassphrase)?,
        })
    }

    fn is_open(&self) -> bool {
        self.passphrase.is_empty()
    }
}

pub struct WifiAdapter {
    state: WifiState,
    creds: Option<Credentials>,
    #[cfg(target_os = "espidf")]
    driver: Option<BlockingWifi<EspWifi<'static>>>,
}

impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            state: WifiState::Idle,
            creds: None,
            #[cfg(target_os = "espidf")]
            driver: None,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    /// Give the adapter its ESP-IDF driver. Needed before the first join.
    #[cfg(target_os = "espidf")]
    pub fn attach(&mut self, driver: BlockingWifi<EspWifi<'static>>) {
        self.driver = Some(driver);
    }

    #[cfg(target_os = "espidf")]
    fn join(&mut self, creds: &Credentials) -> Result<(), ConnectivityError> {
        let driver = self.driver.as_mut().ok_or(ConnectivityError::NoDriver)?;
        let client = ClientConfiguration {
            ssid: creds.ssid.as_str().try_into().map_err(|_| ConnectivityError::BadSsid)?,
            password: creds
                .passphrase
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::BadPassphrase)?,
            auth_method: if creds.is_open() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        };

        let step = |what: &'static str| {
            move |e: esp_idf_svc::sys::EspError| {
                error!("WiFi: {} step failed: {}", what, e);
                ConnectivityError::JoinFailed
            }
        };
        driver
            .set_configuration(&Configuration::Client(client))
            .map_err(step("configure"))?;
        driver.start().map_err(step("start"))?;
        driver.connect().map_err(step("associate"))?;
        driver.wait_netif_up().map_err(step("dhcp"))?;

        match driver.wifi().sta_netif().get_ip_info() {
            Ok(info) => info!("WiFi: address {}", info.ip),
            Err(e) => error!("WiFi: joined but no IP info: {}", e),
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn join(&mut self, creds: &Credentials) -> Result<(), ConnectivityError> {
        info!(
            "WiFi(host): pretending to join '{}' ({})",
            creds.ssid,
            if creds.is_open() { "open" } else { "wpa2" }
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn leave(&mut self) {
        if let Some(driver) = self.driver.as_mut() {
            if let Err(e) = driver.disconnect().and_then(|()| driver.stop()) {
                error!("WiFi: shutdown failed: {}", e);
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn leave(&mut self) {}
}

impl ConnectivityPort for WifiAdapter {
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        let creds = Credentials::parse(ssid, password)?;
        info!("WiFi: network set to '{}'", creds.ssid);
        self.creds = Some(creds);
        Ok(())
    }

    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.state == WifiState::Joined {
            return Err(ConnectivityError::AlreadyJoined);
        }
        let creds = self
            .creds
            .clone()
            .ok_or(ConnectivityError::MissingCredentials)?;

        self.state = WifiState::Joining;
        let joined = self.join(&creds);
        self.state = if joined.is_ok() {
            WifiState::Joined
        } else {
            WifiState::Failed
        };
        joined
    }

    fn disconnect(&mut self) {
        self.leave();
        self.state = WifiState::Idle;
    }

    fn is_connected(&self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            self.driver
                .as_ref()
                .is_some_and(|d| d.is_connected().unwrap_or(false))
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.state == WifiState::Joined
        }
    }
}

/// Set credentials and join once. Failures are logged and returned; the
/// cycle runs either way.
pub fn bring_up<C: ConnectivityPort>(
    wifi: &mut C,
    ssid: &str,
    password: &str,
) -> Result<(), ConnectivityError> {
    wifi.set_credentials(ssid, password)
        .and_then(|()| wifi.connect())
        .inspect_err(|e| error!("WiFi: offline this wake ({})", e))
}
