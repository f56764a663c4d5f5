//! Radio poll-rate throttling for a sleepy end device.
//!
//! Right after a join the device keeps polling its parent quickly so any
//! in-flight traffic (binding, configuration, reports) completes.  When
//! the poll-throttle timer fires the interval is relaxed to save power;
//! any user interaction snaps it back to the responsive rate.
//!
//! ```text
//!   join ──▶ [poll-throttle timer] ──▶ RELAXED ──[key]──▶ RESPONSIVE
//!                                         ▲                   │
//!                                         └──[next join]──────┘
//! ```

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, NetworkStack};
use crate::config::PowerConfig;

/// Which poll interval is currently applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Stack default at boot, or after user interaction.
    Responsive,
    /// Power-saving interval.
    Relaxed,
}

/// Applies poll-rate changes through the network stack.
#[derive(Debug)]
pub struct PollRateThrottle {
    config: PowerConfig,
    mode: PollMode,
}

impl PollRateThrottle {
    pub fn new(config: PowerConfig) -> Self {
        Self {
            config,
            mode: PollMode::Responsive,
        }
    }

    pub fn mode(&self) -> PollMode {
        self.mode
    }

    /// The poll-throttle timer fired: widen the poll interval.
    pub fn on_timer_fired(&mut self, stack: &mut impl NetworkStack, sink: &mut impl EventSink) {
        info!("PollThrottle: lowering poll rate");
        self.apply(PollMode::Relaxed, stack, sink);
    }

    /// Key press or release: narrow the poll interval immediately.
    pub fn on_user_activity(&mut self, stack: &mut impl NetworkStack, sink: &mut impl EventSink) {
        debug!("PollThrottle: user activity");
        self.apply(PollMode::Responsive, stack, sink);
    }

    fn apply(&mut self, mode: PollMode, stack: &mut impl NetworkStack, sink: &mut impl EventSink) {
        if !self.config.power_saving {
            debug!("PollThrottle: power saving disabled, keeping stack poll rate");
            return;
        }

        let interval_ms = match mode {
            PollMode::Relaxed => self.config.relaxed_poll_interval_ms,
            PollMode::Responsive => self.config.responsive_poll_interval_ms,
        };

        match stack.set_poll_interval(interval_ms) {
            Ok(()) => {
                self.mode = mode;
                sink.emit(&AppEvent::PollIntervalChanged { interval_ms });
            }
            Err(e) => warn!("PollThrottle: set_poll_interval({}) failed: {}", interval_ms, e),
        }
    }
}
