//! Host simulation of the mesh network stack.
//!
//! [`SimNetworkStack`] records every outbound call and answers the
//! asynchronous ones from a script.  Each `start_commissioning` or
//! `attempt_network_recovery` pops the next scripted reply into an outbox;
//! the harness drains the outbox into the event queue, the same path real
//! stack callbacks take.
//!
//! ```text
//!  AppService ──attempt_network_recovery()──▶ SimNetworkStack
//!                                                 │ script.pop_front()
//!  EventQueue ◀──────────── take_outbox() ◀───────┘
//! ```

use std::collections::VecDeque;

use log::debug;

use crate::app::ports::{BindCapacity, NetworkStack, StackError};
use crate::commissioning::{
    CommissioningMode, CommissioningOutcome, CommissioningStatusEvent, ModeFlags,
};
use crate::config::RadioConfig;
use crate::events::Event;

/// One recorded outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCall {
    Configure(RadioConfig),
    StartCommissioning(ModeFlags),
    AttemptRecovery,
    SetPollInterval(u32),
}

#[derive(Debug, Default)]
pub struct SimNetworkStack {
    calls: Vec<SimCall>,
    script: VecDeque<Event>,
    outbox: Vec<Event>,
    poll_interval_ms: Option<u32>,
    capacity: Option<BindCapacity>,
    recovery_error: Option<StackError>,
}

impl SimNetworkStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the reply to the next asynchronous call.
    pub fn script(&mut self, reply: Event) {
        self.script.push_back(reply);
    }

    /// Script `n` failed parent-recovery rounds.
    pub fn script_recovery_failures(&mut self, n: usize) {
        for _ in 0..n {
            self.script(Event::StatusChanged(CommissioningStatusEvent::new(
                CommissioningMode::ParentLost,
                CommissioningOutcome::Failure,
            )));
        }
    }

    /// Script a successful parent recovery.
    pub fn script_recovery_success(&mut self) {
        self.script(Event::StatusChanged(CommissioningStatusEvent::new(
            CommissioningMode::ParentLost,
            CommissioningOutcome::NetworkRestored,
        )));
    }

    /// Replies produced since the last call.
    pub fn take_outbox(&mut self) -> Vec<Event> {
        core::mem::take(&mut self.outbox)
    }

    pub fn set_bind_capacity(&mut self, capacity: Option<BindCapacity>) {
        self.capacity = capacity;
    }

    /// Make every `attempt_network_recovery` fail with `err`.
    pub fn fail_recovery(&mut self, err: Option<StackError>) {
        self.recovery_error = err;
    }

    pub fn calls(&self) -> &[SimCall] {
        &self.calls
    }

    pub fn recovery_attempts(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SimCall::AttemptRecovery))
            .count()
    }

    /// Last poll interval pushed by the application, if any.
    pub fn poll_interval_ms(&self) -> Option<u32> {
        self.poll_interval_ms
    }

    fn reply(&mut self) {
        match self.script.pop_front() {
            Some(event) => {
                debug!("SimStack: reply {:?}", event);
                self.outbox.push(event);
            }
            None => debug!("SimStack: script empty, no reply"),
        }
    }
}

impl NetworkStack for SimNetworkStack {
    fn configure(&mut self, radio: &RadioConfig) -> Result<(), StackError> {
        self.calls.push(SimCall::Configure(*radio));
        Ok(())
    }

    fn start_commissioning(&mut self, modes: ModeFlags) -> Result<(), StackError> {
        self.calls.push(SimCall::StartCommissioning(modes));
        self.reply();
        Ok(())
    }

    fn attempt_network_recovery(&mut self) -> Result<(), StackError> {
        self.calls.push(SimCall::AttemptRecovery);
        if let Some(err) = self.recovery_error {
            return Err(err);
        }
        self.reply();
        Ok(())
    }

    fn set_poll_interval(&mut self, interval_ms: u32) -> Result<(), StackError> {
        self.calls.push(SimCall::SetPollInterval(interval_ms));
        self.poll_interval_ms = Some(interval_ms);
        Ok(())
    }

    fn bind_capacity(&self) -> Option<BindCapacity> {
        self.capacity
    }
}
