//! aqpncs probe firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod chip;
pub mod config;
pub mod error;
pub mod pins;
pub mod reading;
pub mod retained;
