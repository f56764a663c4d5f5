//! Manual recovery on key press.
//!
//! A user pressing the key on an orphaned device is a strong hint that
//! someone is waiting for it, so we ask the stack for a rejoin right away
//! instead of sitting out the backoff delay.  Retry state is left alone:
//! if the attempt fails, the pending rejoin timer still fires on schedule.

use log::{debug, info};

use super::machine::CommissioningStateMachine;
use crate::app::ports::NetworkStack;

/// Key-press accelerant for parent recovery.
#[derive(Debug, Default)]
pub struct KeyRecoveryTrigger {
    manual_attempts: u32,
}

impl KeyRecoveryTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press.  Returns `true` if a recovery was requested.
    pub fn on_key_press(
        &mut self,
        machine: &mut CommissioningStateMachine,
        stack: &mut impl NetworkStack,
    ) -> bool {
        if !machine.is_detached() {
            debug!("KeyTrigger: attached ({}), nothing to do", machine.phase());
            return false;
        }

        self.manual_attempts = self.manual_attempts.wrapping_add(1);
        info!(
            "KeyTrigger: no parent in {}, requesting immediate recovery (#{})",
            machine.phase(),
            self.manual_attempts
        );
        machine.request_recovery(stack);
        true
    }

    /// Manual recovery requests issued since boot.
    pub fn manual_attempts(&self) -> u32 {
        self.manual_attempts
    }
}
