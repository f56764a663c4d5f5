//! One-shot timer bookkeeping.
//!
//! The platform timer service only knows how to fire a tagged timer once.
//! [`PendingTimers`] keeps the tag → handle map on our side so the
//! "replace, never duplicate" rule is a data-structure invariant:
//!
//! ```text
//!  schedule(Rejoin, 12s) ──▶ { Rejoin: #1 }
//!  schedule(Rejoin, 14s) ──▶ cancel(Rejoin) ──▶ { Rejoin: #2 }
//!  TimerElapsed(Rejoin, #1) ──▶ stale, dropped
//!  TimerElapsed(Rejoin, #2) ──▶ accepted, { }
//! ```

use core::fmt;
use core::time::Duration;

use heapless::FnvIndexMap;
use log::{debug, warn};

use crate::app::ports::{TimerError, TimerService};

/// Purpose of a timer.  At most one timer per tag is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTag {
    /// Fires the next parent-recovery attempt.
    Rejoin,
    /// Lowers the radio poll rate after a join settles.
    PollThrottle,
}

impl fmt::Display for TimerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejoin => f.write_str("rejoin"),
            Self::PollThrottle => f.write_str("poll-throttle"),
        }
    }
}

/// Identity of one scheduled instance of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u32);

/// Tag → handle map of every timer we consider live.
#[derive(Debug)]
pub struct PendingTimers {
    live: FnvIndexMap<TimerTag, TimerHandle, 4>,
    next_id: u32,
}

impl PendingTimers {
    pub fn new() -> Self {
        Self {
            live: FnvIndexMap::new(),
            next_id: 1,
        }
    }

    /// Schedule `tag` to fire after `after`, replacing a pending one.
    pub fn schedule(
        &mut self,
        service: &mut impl TimerService,
        tag: TimerTag,
        after: Duration,
    ) -> Result<TimerHandle, TimerError> {
        if let Some(old) = self.live.remove(&tag) {
            debug!("Timers: replacing {} #{}", tag, old.0);
            service.cancel(tag);
        }

        let handle = TimerHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);

        service.schedule(tag, handle, after)?;
        self.live
            .insert(tag, handle)
            .map_err(|_| TimerError::NoSlot)?;
        debug!("Timers: {} #{} in {}ms", tag, handle.0, after.as_millis());
        Ok(handle)
    }

    /// Cancel `tag` if it is pending.
    pub fn cancel(&mut self, service: &mut impl TimerService, tag: TimerTag) {
        if self.live.remove(&tag).is_some() {
            service.cancel(tag);
        }
    }

    /// Accept a firing.  Returns `false` for stale handles, which belong to
    /// a timer that was replaced or cancelled after its event was queued.
    pub fn on_elapsed(&mut self, tag: TimerTag, handle: TimerHandle) -> bool {
        match self.live.get(&tag) {
            Some(&live) if live == handle => {
                self.live.remove(&tag);
                true
            }
            Some(&live) => {
                warn!("Timers: stale {} #{} (live #{})", tag, handle.0, live.0);
                false
            }
            None => {
                warn!("Timers: stale {} #{} (none live)", tag, handle.0);
                false
            }
        }
    }

    pub fn pending(&self, tag: TimerTag) -> Option<TimerHandle> {
        self.live.get(&tag).copied()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl Default for PendingTimers {
    fn default() -> Self {
        Self::new()
    }
}
