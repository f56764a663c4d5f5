//! Application core: pure domain wiring, zero I/O.
//!
//! [`service::AppService`] routes inbound events into the commissioning
//! state machine, the poll-rate throttle and the key trigger.  All
//! interaction with the radio stack, timers and storage happens through
//! the **port traits** in [`ports`], keeping this layer testable without
//! real hardware.

pub mod events;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod mock;
