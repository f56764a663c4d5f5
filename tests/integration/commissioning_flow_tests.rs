//! End-to-end commissioning and parent-recovery episodes.

use std::time::Duration;

use sleepynode::adapters::sim_stack::SimCall;
use sleepynode::app::events::{AppEvent, LinkStatus};
use sleepynode::app::ports::BindCapacity;
use sleepynode::commissioning::{
    BindRequest, CommissioningMode as Mode, CommissioningOutcome as Outcome, CommissioningPhase,
    CommissioningStatusEvent, DeviceState, ModeFlags,
};
use sleepynode::config::CommissioningConfig;
use sleepynode::events::Event;
use sleepynode::timers::{TimerHandle, TimerTag};

use crate::mock_hw::SimNode;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

/// Steering succeeds, then the parent disappears.
fn joined_then_orphaned() -> SimNode {
    let mut node = SimNode::started();
    node.status(Mode::NetworkSteering, Outcome::Success);
    node.inject(Event::DeviceStateChanged(DeviceState::Orphan));
    assert_eq!(node.app.phase(), CommissioningPhase::ParentLost);
    node
}

#[test]
fn start_configures_radio_and_steers() {
    let node = SimNode::started();
    assert_eq!(node.app.phase(), CommissioningPhase::Initializing);
    assert_eq!(
        node.stack.calls(),
        &[
            SimCall::Configure(CommissioningConfig::default().radio),
            SimCall::StartCommissioning(ModeFlags::NETWORK_STEERING | ModeFlags::FINDING_BINDING),
        ]
    );
    assert_eq!(node.link_statuses(), vec![LinkStatus::Searching]);
}

#[test]
fn scripted_steering_success_joins_at_boot() {
    let mut node = SimNode::new(CommissioningConfig::default());
    node.stack.script(Event::StatusChanged(CommissioningStatusEvent::new(
        Mode::NetworkSteering,
        Outcome::Success,
    )));
    node.start();
    assert_eq!(node.app.phase(), CommissioningPhase::Joined);
}

#[test]
fn initialization_without_network_keeps_waiting() {
    let mut node = SimNode::started();
    node.clear_events();
    node.status(Mode::Initialization, Outcome::NoNetwork);
    assert_eq!(node.app.phase(), CommissioningPhase::Initializing);
    assert_eq!(node.link_statuses(), vec![LinkStatus::Lost]);
    assert_eq!(node.timers.armed_count(), 0);
}

// ── Truncating backoff ────────────────────────────────────

#[test]
fn three_failures_back_off_12_14_16() {
    let mut node = SimNode::started();
    for _ in 0..3 {
        node.status(Mode::ParentLost, Outcome::Failure);
    }
    assert_eq!(node.rejoin_delays(), vec![secs(12), secs(14), secs(16)]);
    assert_eq!(node.app.retry_state().attempts_remaining, 17);
    assert_eq!(node.app.phase(), CommissioningPhase::Recovering);
    // Only the latest rejoin is armed.
    assert_eq!(node.timers.remaining(TimerTag::Rejoin), Some(secs(16)));
}

// ── Restore resets backoff ────────────────────────────────

#[test]
fn network_restored_resets_retry_state() {
    let mut node = SimNode::started();
    for _ in 0..6 {
        node.status(Mode::ParentLost, Outcome::NoNetwork);
    }
    node.status(Mode::ParentLost, Outcome::NetworkRestored);

    let snap = node.app.snapshot();
    assert_eq!(snap.phase, CommissioningPhase::Joined);
    assert_eq!(snap.retry.attempts_remaining, 20);
    assert_eq!(snap.retry.current_delay, secs(10));
    assert!(!snap.rejoin_pending);
    assert_eq!(node.timers.remaining(TimerTag::Rejoin), None);
}

// ── Join arms one poll throttle ───────────────────────────

#[test]
fn steering_success_arms_single_poll_throttle() {
    let mut node = SimNode::started();
    node.status(Mode::NetworkSteering, Outcome::Success);

    assert_eq!(node.app.phase(), CommissioningPhase::Joined);
    assert_eq!(node.timers.armed_count(), 1);
    assert_eq!(node.timers.remaining(TimerTag::PollThrottle), Some(secs(10)));
    assert!(node.sink.events.contains(&AppEvent::PhaseChanged {
        from: CommissioningPhase::Initializing,
        to: CommissioningPhase::Joined,
    }));
}

// ── Exhausted budget retries at the ceiling ───────────────

#[test]
fn exhausted_budget_pins_delay_at_ceiling() {
    let mut node = SimNode::started();
    for _ in 0..20 {
        node.status(Mode::ParentLost, Outcome::Failure);
    }
    let retry = node.app.retry_state();
    assert_eq!(retry.attempts_remaining, 0);
    assert!(retry.current_delay < secs(1800));

    for _ in 0..5 {
        node.status(Mode::ParentLost, Outcome::Failure);
        assert_eq!(node.app.retry_state().attempts_remaining, 0);
        assert_eq!(node.app.retry_state().current_delay, secs(1800));
    }
    let delays = node.rejoin_delays();
    assert_eq!(delays.len(), 25);
    assert!(delays.windows(2).all(|w| w[0] <= w[1]));
    assert!(delays[20..].iter().all(|d| *d == secs(1800)));
    assert!(node.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::RejoinScheduled { exhausted: true, .. }
    )));
}

// ── Full recovery episode driven by the rejoin timer ──────

#[test]
fn timer_driven_recovery_episode() {
    let mut node = joined_then_orphaned();
    node.stack.script_recovery_failures(2);
    node.stack.script_recovery_success();

    node.status(Mode::ParentLost, Outcome::Failure);
    assert_eq!(node.app.phase(), CommissioningPhase::Recovering);

    node.advance(secs(12));
    node.advance(secs(14));
    node.advance(secs(16));

    assert_eq!(node.stack.recovery_attempts(), 3);
    assert_eq!(node.rejoin_delays(), vec![secs(12), secs(14), secs(16)]);
    let snap = node.app.snapshot();
    assert_eq!(snap.phase, CommissioningPhase::Joined);
    assert_eq!(snap.retry.attempts_remaining, 20);
    assert!(!snap.rejoin_pending);
    assert_eq!(node.timers.remaining(TimerTag::Rejoin), None);
}

#[test]
fn rejoin_timer_does_not_fire_early() {
    let mut node = SimNode::started();
    node.status(Mode::ParentLost, Outcome::Failure);
    node.advance(secs(11));
    assert_eq!(node.stack.recovery_attempts(), 0);
    node.advance(secs(1));
    assert_eq!(node.stack.recovery_attempts(), 1);
}

#[test]
fn stale_rejoin_firing_is_ignored() {
    let mut node = SimNode::started();
    node.status(Mode::ParentLost, Outcome::Failure);
    node.inject(Event::TimerElapsed {
        tag: TimerTag::Rejoin,
        handle: TimerHandle(0xDEAD),
    });
    assert_eq!(node.stack.recovery_attempts(), 0);
    assert!(node.app.snapshot().rejoin_pending);
}

#[test]
fn unrecognised_pairs_are_ignored() {
    let mut node = SimNode::started();
    node.status(Mode::ParentLost, Outcome::Failure);
    let before = node.app.snapshot();
    let calls = node.stack.calls().len();

    node.status(Mode::FindingBinding, Outcome::Success);
    node.status(Mode::Initialization, Outcome::Failure);

    let after = node.app.snapshot();
    assert_eq!(after.phase, before.phase);
    assert_eq!(after.retry, before.retry);
    assert_eq!(node.stack.calls().len(), calls);
}

#[test]
fn bind_request_reports_target_and_capacity() {
    let mut node = SimNode::started();
    node.status(Mode::NetworkSteering, Outcome::Success);
    node.stack.set_bind_capacity(Some(BindCapacity {
        max_entries: 16,
        used_entries: 4,
    }));
    node.clear_events();

    let request = BindRequest {
        cluster_id: 0x0006,
        dst_addr: 0x0000,
        endpoint: 10,
    };
    node.inject(Event::BindRequestReceived(request));

    assert_eq!(node.app.phase(), CommissioningPhase::Joined);
    assert_eq!(
        node.sink.events,
        vec![
            AppEvent::Status(LinkStatus::Activity),
            AppEvent::BindRequested {
                request,
                capacity: Some(BindCapacity {
                    max_entries: 16,
                    used_entries: 4,
                }),
            },
        ]
    );
}
