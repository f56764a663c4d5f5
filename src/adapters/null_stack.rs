//! Placeholder network stack for targets without a radio binding.
//!
//! Accepts every request and never answers, so the device stays in
//! `Initializing`.  Only the last poll interval is kept; nothing grows
//! with uptime.

use log::debug;

use crate::app::ports::{BindCapacity, NetworkStack, StackError};
use crate::commissioning::ModeFlags;
use crate::config::RadioConfig;

#[derive(Debug, Default)]
pub struct NullNetworkStack {
    poll_interval_ms: Option<u32>,
}

impl NullNetworkStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last poll interval pushed by the application, if any.
    pub fn poll_interval_ms(&self) -> Option<u32> {
        self.poll_interval_ms
    }
}

impl NetworkStack for NullNetworkStack {
    fn configure(&mut self, _radio: &RadioConfig) -> Result<(), StackError> {
        Ok(())
    }

    fn start_commissioning(&mut self, modes: ModeFlags) -> Result<(), StackError> {
        debug!("NullStack: commissioning {:?} dropped", modes);
        Ok(())
    }

    fn attempt_network_recovery(&mut self) -> Result<(), StackError> {
        debug!("NullStack: recovery request dropped");
        Ok(())
    }

    fn set_poll_interval(&mut self, interval_ms: u32) -> Result<(), StackError> {
        self.poll_interval_ms = Some(interval_ms);
        Ok(())
    }

    fn bind_capacity(&self) -> Option<BindCapacity> {
        None
    }
}
