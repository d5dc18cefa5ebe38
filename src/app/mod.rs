//! Application core: the wake cycle with no I/O of its own.
//!
//! [`service::CycleService`] sequences one wake (phases, the publish
//! threshold, retained state) against the traits in [`ports`], so the
//! whole cycle runs in host tests against mocks.

pub mod events;
pub mod ports;
pub mod service;
