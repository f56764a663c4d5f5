//! Commissioning state machine.
//!
//! Owns the current [`CommissioningPhase`], the rejoin [`RetryState`] and
//! the pending-timer map.  Status notifications from the stack are mapped
//! to an [`Action`] by one table ([`action_for`]); the machine then applies
//! that action against the ports it is handed for the duration of the call.
//!
//! | mode            | outcome          | action                            |
//! |-----------------|------------------|-----------------------------------|
//! | Initialization  | NoNetwork        | report lost, stay `Initializing`  |
//! | Initialization  | NetworkRestored  | on-connect, `Joined`              |
//! | NetworkSteering | Success          | on-connect, `Joined`              |
//! | NetworkSteering | anything else    | report searching, `Steering...`   |
//! | ParentLost      | NetworkRestored  | reset backoff, `Joined`           |
//! | ParentLost      | anything else    | back off + arm rejoin, `Recovering` |
//! | anything else   |                  | ignored                           |

use core::time::Duration;

use log::{debug, info, warn};

use super::backoff::{BackoffPolicy, RetryState};
use super::{
    BindRequest, CommissioningMode, CommissioningOutcome, CommissioningPhase,
    CommissioningStatusEvent, DeviceState, ModeFlags,
};
use crate::app::events::{AppEvent, LinkStatus};
use crate::app::ports::{EventSink, NetworkStack, Ports, TimerService};
use crate::config::{CommissioningConfig, RadioConfig};
use crate::timers::{PendingTimers, TimerHandle, TimerTag};

/// What a status notification asks the machine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Initialization found no network: tell the user, keep waiting.
    ReportNoNetwork,
    /// Joined (or rejoined at boot): run the on-connect sequence.
    Connect,
    /// Steering is still running or failed; the stack keeps trying.
    ReportSearching,
    /// Parent came back on its own.
    ParentRestored,
    /// Parent still missing: schedule the next rejoin.
    ScheduleRejoin,
    /// Not a combination we act on.
    Ignore,
}

/// The full transition table.  Pure.
pub fn action_for(mode: CommissioningMode, outcome: CommissioningOutcome) -> Action {
    use CommissioningMode as M;
    use CommissioningOutcome as O;

    match (mode, outcome) {
        (M::Initialization, O::NoNetwork) => Action::ReportNoNetwork,
        (M::Initialization, O::NetworkRestored) => Action::Connect,
        (M::Initialization, _) => Action::Ignore,
        (M::NetworkSteering, O::Success) => Action::Connect,
        (M::NetworkSteering, _) => Action::ReportSearching,
        (M::ParentLost, O::NetworkRestored) => Action::ParentRestored,
        (M::ParentLost, _) => Action::ScheduleRejoin,
        (M::FindingBinding, _) => Action::Ignore,
    }
}

/// The commissioning state machine.
pub struct CommissioningStateMachine {
    phase: CommissioningPhase,
    retry: RetryState,
    policy: BackoffPolicy,
    radio: RadioConfig,
    poll_throttle_delay: Duration,
    timers: PendingTimers,
    device_state: Option<DeviceState>,
}

impl CommissioningStateMachine {
    /// Build the machine in `Idle` with a full retry budget.
    pub fn new(config: &CommissioningConfig) -> Self {
        let policy = BackoffPolicy::new(config.backoff);
        Self {
            phase: CommissioningPhase::Idle,
            retry: RetryState::initial(&policy),
            policy,
            radio: config.radio,
            poll_throttle_delay: config.power.poll_throttle_delay(),
            timers: PendingTimers::new(),
            device_state: None,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> CommissioningPhase {
        self.phase
    }

    pub fn retry_state(&self) -> RetryState {
        self.retry
    }

    pub fn timers(&self) -> &PendingTimers {
        &self.timers
    }

    /// Last network role reported by the stack.
    pub fn device_state(&self) -> Option<DeviceState> {
        self.device_state
    }

    /// True when the device has no parent: either the phase says so or
    /// the stack reported us orphaned.
    pub fn is_detached(&self) -> bool {
        self.phase.is_detached() || self.device_state == Some(DeviceState::Orphan)
    }

    // ── Entry points ──────────────────────────────────────────

    /// Configure the radio and start commissioning.  Only the first call
    /// has an effect.
    pub fn initialize<S, T, E>(&mut self, ports: &mut Ports<'_, S, T, E>)
    where
        S: NetworkStack,
        T: TimerService,
        E: EventSink,
    {
        if self.phase != CommissioningPhase::Idle {
            warn!("Commissioning: initialize() ignored in {}", self.phase);
            return;
        }

        if let Err(e) = ports.stack.configure(&self.radio) {
            warn!("Commissioning: radio configuration failed: {}", e);
        }

        let modes: ModeFlags = self.radio.start_modes;
        info!("Commissioning: starting, modes=0x{:02X}", modes.bits());
        if let Err(e) = ports.stack.start_commissioning(modes) {
            warn!("Commissioning: start failed: {}", e);
        }

        ports.sink.emit(&AppEvent::Started { modes: modes.bits() });
        ports.sink.emit(&AppEvent::Status(LinkStatus::Searching));
        self.set_phase(CommissioningPhase::Initializing, ports.sink);
    }

    /// The single state-transition entry point for stack status.
    pub fn on_status_changed<S, T, E>(
        &mut self,
        event: &CommissioningStatusEvent,
        ports: &mut Ports<'_, S, T, E>,
    ) where
        S: NetworkStack,
        T: TimerService,
        E: EventSink,
    {
        debug!(
            "Commissioning: mode={:?} status={:?} remaining=0x{:02X}",
            event.mode,
            event.outcome,
            event.remaining_modes.bits()
        );

        match action_for(event.mode, event.outcome) {
            Action::ReportNoNetwork => {
                info!("Commissioning: no network");
                ports.sink.emit(&AppEvent::Status(LinkStatus::Lost));
            }
            Action::Connect => {
                self.on_connect(ports);
            }
            Action::ReportSearching => {
                ports.sink.emit(&AppEvent::Status(LinkStatus::Searching));
                self.set_phase(CommissioningPhase::SteeringInProgress, ports.sink);
            }
            Action::ParentRestored => {
                info!("Commissioning: parent restored");
                self.clear_orphan();
                self.retry.reset(&self.policy);
                self.timers.cancel(ports.timer_service, TimerTag::Rejoin);
                ports.sink.emit(&AppEvent::Status(LinkStatus::Connected));
                self.set_phase(CommissioningPhase::Joined, ports.sink);
            }
            Action::ScheduleRejoin => {
                self.schedule_rejoin(ports);
            }
            Action::Ignore => {
                debug!(
                    "Commissioning: ignored {:?}/{:?}",
                    event.mode, event.outcome
                );
            }
        }
    }

    /// The rejoin timer elapsed: ask the stack to find our parent.  The
    /// outcome arrives later as another status notification.
    pub fn on_rejoin_timer_fired<S, T, E>(&mut self, ports: &mut Ports<'_, S, T, E>)
    where
        S: NetworkStack,
        T: TimerService,
        E: EventSink,
    {
        info!("Commissioning: rejoin timer fired, attempting recovery");
        self.request_recovery(ports.stack);
    }

    /// Report a bind request.  Never touches phase or retry state.
    pub fn on_bind_notification<S, T, E>(
        &mut self,
        request: &BindRequest,
        ports: &mut Ports<'_, S, T, E>,
    ) where
        S: NetworkStack,
        T: TimerService,
        E: EventSink,
    {
        let capacity = ports.stack.bind_capacity();
        info!(
            "Commissioning: bind request cluster=0x{:04X} dst=0x{:04X} ep={}",
            request.cluster_id, request.dst_addr, request.endpoint
        );
        if let Some(c) = capacity {
            debug!(
                "Commissioning: bind table {}/{} used",
                c.used_entries, c.max_entries
            );
        }
        ports.sink.emit(&AppEvent::Status(LinkStatus::Activity));
        ports.sink.emit(&AppEvent::BindRequested {
            request: *request,
            capacity,
        });
    }

    /// Track the stack's view of our network role.
    pub fn on_device_state_changed<S, T, E>(
        &mut self,
        state: DeviceState,
        ports: &mut Ports<'_, S, T, E>,
    ) where
        S: NetworkStack,
        T: TimerService,
        E: EventSink,
    {
        debug!("Commissioning: device state {:?}", state);
        self.device_state = Some(state);

        ports.sink.emit(&AppEvent::Status(LinkStatus::Searching));
        match state {
            DeviceState::EndDevice => {
                ports.sink.emit(&AppEvent::Status(LinkStatus::Connected));
            }
            DeviceState::Orphan if self.phase == CommissioningPhase::Joined => {
                self.set_phase(CommissioningPhase::ParentLost, ports.sink);
            }
            _ => {}
        }
    }

    /// Filter a timer firing against the pending map.  `false` means stale.
    pub fn accept_timer(&mut self, tag: TimerTag, handle: TimerHandle) -> bool {
        self.timers.on_elapsed(tag, handle)
    }

    /// Ask the stack for an immediate recovery attempt.  Failures are
    /// logged only; the backoff timer or the next key press retries.
    pub fn request_recovery(&mut self, stack: &mut impl NetworkStack) {
        if let Err(e) = stack.attempt_network_recovery() {
            warn!("Commissioning: recovery request failed: {}", e);
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn on_connect<S, T, E>(&mut self, ports: &mut Ports<'_, S, T, E>)
    where
        S: NetworkStack,
        T: TimerService,
        E: EventSink,
    {
        info!("Commissioning: connected");
        self.clear_orphan();
        self.retry.reset(&self.policy);
        self.timers.cancel(ports.timer_service, TimerTag::Rejoin);
        if let Err(e) = self.timers.schedule(
            ports.timer_service,
            TimerTag::PollThrottle,
            self.poll_throttle_delay,
        ) {
            warn!("Commissioning: poll throttle timer not armed: {}", e);
        }
        ports.sink.emit(&AppEvent::Status(LinkStatus::Connected));
        self.set_phase(CommissioningPhase::Joined, ports.sink);
    }

    /// A rejoin supersedes the stack's last orphan report.
    fn clear_orphan(&mut self) {
        if self.device_state == Some(DeviceState::Orphan) {
            self.device_state = None;
        }
    }

    fn schedule_rejoin<S, T, E>(&mut self, ports: &mut Ports<'_, S, T, E>)
    where
        S: NetworkStack,
        T: TimerService,
        E: EventSink,
    {
        ports.sink.emit(&AppEvent::Status(LinkStatus::Lost));

        let step = self.retry.advance(&self.policy);
        info!(
            "Commissioning: parent lost, rejoin in {}s ({} attempts left{})",
            step.delay.as_secs(),
            step.attempts_remaining,
            if step.exhausted { ", at ceiling" } else { "" }
        );

        match self
            .timers
            .schedule(ports.timer_service, TimerTag::Rejoin, step.delay)
        {
            Ok(_) => ports.sink.emit(&AppEvent::RejoinScheduled {
                delay: step.delay,
                attempts_remaining: step.attempts_remaining,
                exhausted: step.exhausted,
            }),
            Err(e) => warn!("Commissioning: rejoin timer not armed: {}", e),
        }

        self.set_phase(CommissioningPhase::Recovering, ports.sink);
    }

    fn set_phase(&mut self, to: CommissioningPhase, sink: &mut impl EventSink) {
        if to == self.phase {
            return;
        }
        let from = self.phase;
        info!("Commissioning: {} -> {}", from, to);
        self.phase = to;
        sink.emit(&AppEvent::PhaseChanged { from, to });
    }
}
