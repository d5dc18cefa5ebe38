//! statsd gauge publisher over UDP.
//!
//! Implements [`PublishPort`]. Each call formats one line
//!
//! ```text
//!   <namespace>.<device_id>:<value>|g
//! ```
//!
//! and sends it as a single datagram. No acknowledgement, no retry: a lost
//! packet is simply a missing point on the graph.
//!
//! `std::net::UdpSocket` is backed by lwIP on ESP-IDF and by the host
//! stack in tests, so the same code runs on both.

use core::fmt::Write;
use std::net::{SocketAddrV4, UdpSocket};

use log::{debug, warn};

use crate::app::ports::PublishPort;
use crate::error::PublishError;

/// Datagram buffer. Far above any realistic gauge line.
pub const MAX_LINE_LEN: usize = 128;

pub type GaugeLine = heapless::String<MAX_LINE_LEN>;

/// Build a statsd gauge line.
pub fn gauge_line(namespace: &str, device_id: &str, value: &str) -> Result<GaugeLine, PublishError> {
    let mut line = GaugeLine::new();
    write!(line, "{}.{}:{}|g", namespace, device_id, value).map_err(|_| PublishError::LineTooLong)?;
    Ok(line)
}

/// UDP statsd client. The socket is opened lazily on first publish and
/// reused for the rest of the wake.
pub struct UdpStatsdPublisher {
    target: SocketAddrV4,
    namespace: heapless::String<16>,
    socket: Option<UdpSocket>,
}

impl UdpStatsdPublisher {
    pub fn new(target: SocketAddrV4, namespace: &str) -> Self {
        Self {
            target,
            namespace: crate::config::bounded(namespace),
            socket: None,
        }
    }

    pub fn target(&self) -> SocketAddrV4 {
        self.target
    }

    fn socket(&mut self) -> Result<&UdpSocket, PublishError> {
        if self.socket.is_none() {
            let socket = UdpSocket::bind("0.0.0.0:0").map_err(|e| {
                warn!("statsd: bind failed: {}", e);
                PublishError::Bind
            })?;
            self.socket = Some(socket);
        }
        self.socket.as_ref().ok_or(PublishError::Bind)
    }
}

impl PublishPort for UdpStatsdPublisher {
    fn publish(&mut self, device_id: &str, value: &str) -> Result<(), PublishError> {
        let line = gauge_line(&self.namespace, device_id, value)?;
        let target = self.target;
        let socket = self.socket()?;
        let sent = socket.send_to(line.as_bytes(), target).map_err(|e| {
            warn!("statsd: send to {} failed: {}", target, e);
            PublishError::Send
        })?;
        debug!("statsd: {} bytes -> {} '{}'", sent, target, line);
        Ok(())
    }
}
