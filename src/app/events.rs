//! Outbound application events.
//!
//! The commissioning core emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (blink the status LED, log to serial,
//! forward to a host).

use core::time::Duration;

use crate::commissioning::{BindRequest, CommissioningPhase};
use crate::app::ports::BindCapacity;

/// Coarse link status for user-visible feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Looking for a network or parent.
    Searching,
    /// Joined and talking to a parent.
    Connected,
    /// No network found or parent gone.
    Lost,
    /// Traffic worth acknowledging (e.g. a bind request).
    Activity,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Link status changed; drives the indicator.
    Status(LinkStatus),

    /// The commissioning phase changed.
    PhaseChanged {
        from: CommissioningPhase,
        to: CommissioningPhase,
    },

    /// A rejoin attempt was scheduled.
    RejoinScheduled {
        delay: Duration,
        attempts_remaining: u8,
        exhausted: bool,
    },

    /// A peer asked for a binding.
    BindRequested {
        request: BindRequest,
        capacity: Option<BindCapacity>,
    },

    /// The radio poll interval was changed.
    PollIntervalChanged { interval_ms: u32 },

    /// Commissioning was started with the given mode bits.
    Started { modes: u8 },
}
