//! Recording port doubles for unit tests.

use core::time::Duration;

use super::events::AppEvent;
use super::ports::{BindCapacity, EventSink, NetworkStack, StackError, TimerError, TimerService};
use crate::commissioning::ModeFlags;
use crate::config::RadioConfig;
use crate::timers::{TimerHandle, TimerTag};

#[derive(Debug, Clone, PartialEq)]
pub enum StackCall {
    Configure(RadioConfig),
    StartCommissioning(ModeFlags),
    AttemptRecovery,
    SetPollInterval(u32),
}

#[derive(Default)]
pub struct RecordingStack {
    pub calls: Vec<StackCall>,
    pub fail_recovery: bool,
    pub capacity: Option<BindCapacity>,
}

impl RecordingStack {
    pub fn recovery_attempts(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, StackCall::AttemptRecovery))
            .count()
    }

    pub fn poll_intervals(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                StackCall::SetPollInterval(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }
}

impl NetworkStack for RecordingStack {
    fn configure(&mut self, radio: &RadioConfig) -> Result<(), StackError> {
        self.calls.push(StackCall::Configure(*radio));
        Ok(())
    }

    fn start_commissioning(&mut self, modes: ModeFlags) -> Result<(), StackError> {
        self.calls.push(StackCall::StartCommissioning(modes));
        Ok(())
    }

    fn attempt_network_recovery(&mut self) -> Result<(), StackError> {
        self.calls.push(StackCall::AttemptRecovery);
        if self.fail_recovery {
            return Err(StackError::Busy);
        }
        Ok(())
    }

    fn set_poll_interval(&mut self, interval_ms: u32) -> Result<(), StackError> {
        self.calls.push(StackCall::SetPollInterval(interval_ms));
        Ok(())
    }

    fn bind_capacity(&self) -> Option<BindCapacity> {
        self.capacity
    }
}

#[derive(Default)]
pub struct RecordingTimers {
    pub scheduled: Vec<(TimerTag, TimerHandle, Duration)>,
    pub cancelled: Vec<TimerTag>,
    pub fail_next: bool,
}

impl RecordingTimers {
    pub fn scheduled_for(&self, tag: TimerTag) -> Vec<Duration> {
        self.scheduled
            .iter()
            .filter(|(t, _, _)| *t == tag)
            .map(|(_, _, d)| *d)
            .collect()
    }
}

impl TimerService for RecordingTimers {
    fn schedule(
        &mut self,
        tag: TimerTag,
        handle: TimerHandle,
        after: Duration,
    ) -> Result<(), TimerError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(TimerError::Platform);
        }
        self.scheduled.push((tag, handle, after));
        Ok(())
    }

    fn cancel(&mut self, tag: TimerTag) {
        self.cancelled.push(tag);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
