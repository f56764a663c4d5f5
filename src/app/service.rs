//! Application service: the hexagonal core.
//!
//! [`AppService`] is the composition root for commissioning: it owns the
//! state machine, the poll-rate throttle and the key-press trigger, and
//! exposes a single [`dispatch`](AppService::dispatch) entry point for
//! every inbound [`Event`].  All I/O flows through the [`Ports`] passed in
//! per call, making the whole service testable with mock adapters.
//!
//! ```text
//!  EventQueue ──▶ ┌──────────────────────────────┐ ──▶ NetworkStack
//!                 │          AppService          │ ──▶ TimerService
//!                 │ StateMachine · Throttle · Key│ ──▶ EventSink
//!                 └──────────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::commissioning::backoff::RetryState;
use crate::commissioning::key_trigger::KeyRecoveryTrigger;
use crate::commissioning::machine::CommissioningStateMachine;
use crate::commissioning::{CommissioningPhase, DeviceState};
use crate::config::CommissioningConfig;
use crate::events::Event;
use crate::power::{PollMode, PollRateThrottle};
use crate::timers::TimerTag;

use super::ports::{ConfigError, ConfigPort, EventSink, NetworkStack, Ports, TimerService};

/// Point-in-time view of the commissioning core, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSnapshot {
    pub phase: CommissioningPhase,
    pub retry: RetryState,
    pub rejoin_pending: bool,
    pub poll_throttle_pending: bool,
    pub poll_mode: PollMode,
    pub device_state: Option<DeviceState>,
    pub manual_recoveries: u32,
    pub events_handled: u64,
}

/// The application service orchestrates all commissioning logic.
pub struct AppService {
    machine: CommissioningStateMachine,
    throttle: PollRateThrottle,
    key_trigger: KeyRecoveryTrigger,
    events_handled: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start commissioning; call [`start`](Self::start) next.
    pub fn new(config: CommissioningConfig) -> Self {
        Self {
            machine: CommissioningStateMachine::new(&config),
            throttle: PollRateThrottle::new(config.power),
            key_trigger: KeyRecoveryTrigger::new(),
            events_handled: 0,
        }
    }

    /// Load configuration from `store`, falling back to defaults when it
    /// is missing, unreadable or invalid.
    pub fn load_config(store: &impl ConfigPort) -> CommissioningConfig {
        let loaded = store.load().and_then(|c| c.validate().map(|()| c));
        match loaded {
            Ok(config) => {
                info!("Config loaded from storage");
                config
            }
            Err(ConfigError::NotFound) => {
                info!("No stored config, using defaults");
                CommissioningConfig::default()
            }
            Err(e) => {
                warn!("Stored config rejected ({}), using defaults", e);
                CommissioningConfig::default()
            }
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Configure the radio and kick off commissioning.
    pub fn start<S, T, E>(&mut self, ports: &mut Ports<'_, S, T, E>)
    where
        S: NetworkStack,
        T: TimerService,
        E: EventSink,
    {
        self.machine.initialize(ports);
        info!("AppService started in {}", self.machine.phase());
    }

    // ── Event dispatch ────────────────────────────────────────

    /// Handle one inbound event to completion.
    pub fn dispatch<S, T, E>(&mut self, event: Event, ports: &mut Ports<'_, S, T, E>)
    where
        S: NetworkStack,
        T: TimerService,
        E: EventSink,
    {
        self.events_handled += 1;

        match event {
            Event::StatusChanged(status) => {
                self.machine.on_status_changed(&status, ports);
            }
            Event::BindRequestReceived(request) => {
                self.machine.on_bind_notification(&request, ports);
            }
            Event::DeviceStateChanged(state) => {
                self.machine.on_device_state_changed(state, ports);
            }
            Event::TimerElapsed { tag, handle } => {
                if !self.machine.accept_timer(tag, handle) {
                    return;
                }
                match tag {
                    TimerTag::Rejoin => self.machine.on_rejoin_timer_fired(ports),
                    TimerTag::PollThrottle => {
                        self.throttle.on_timer_fired(ports.stack, ports.sink);
                    }
                }
            }
            Event::KeyPressed => {
                self.key_trigger.on_key_press(&mut self.machine, ports.stack);
                self.throttle.on_user_activity(ports.stack, ports.sink);
            }
            Event::KeyReleased => {
                debug!("AppService: key released");
                self.throttle.on_user_activity(ports.stack, ports.sink);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> CommissioningPhase {
        self.machine.phase()
    }

    pub fn retry_state(&self) -> RetryState {
        self.machine.retry_state()
    }

    pub fn poll_mode(&self) -> PollMode {
        self.throttle.mode()
    }

    pub fn snapshot(&self) -> ServiceSnapshot {
        let timers = self.machine.timers();
        ServiceSnapshot {
            phase: self.machine.phase(),
            retry: self.machine.retry_state(),
            rejoin_pending: timers.pending(TimerTag::Rejoin).is_some(),
            poll_throttle_pending: timers.pending(TimerTag::PollThrottle).is_some(),
            poll_mode: self.throttle.mode(),
            device_state: self.machine.device_state(),
            manual_recoveries: self.key_trigger.manual_attempts(),
            events_handled: self.events_handled,
        }
    }
}
