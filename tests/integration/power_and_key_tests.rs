//! Poll-rate throttle and key-press recovery through the full loop.

use std::convert::Infallible;
use std::time::Duration;

use embedded_hal::digital::{ErrorType, InputPin};
use sleepynode::adapters::sim_stack::SimCall;
use sleepynode::commissioning::{
    CommissioningMode as Mode, CommissioningOutcome as Outcome, CommissioningPhase, DeviceState,
};
use sleepynode::config::{CommissioningConfig, PowerConfig};
use sleepynode::drivers::key::KeyDriver;
use sleepynode::events::Event;
use sleepynode::power::PollMode;
use sleepynode::timers::TimerTag;

use crate::mock_hw::SimNode;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn poll_calls(node: &SimNode) -> Vec<u32> {
    node.stack
        .calls()
        .iter()
        .filter_map(|c| match c {
            SimCall::SetPollInterval(ms) => Some(*ms),
            _ => None,
        })
        .collect()
}

#[test]
fn poll_rate_relaxes_ten_seconds_after_join() {
    let mut node = SimNode::started();
    node.status(Mode::NetworkSteering, Outcome::Success);

    node.advance(secs(9));
    assert!(poll_calls(&node).is_empty());
    assert_eq!(node.app.poll_mode(), PollMode::Responsive);

    node.advance(secs(1));
    assert_eq!(poll_calls(&node), vec![0]);
    assert_eq!(node.app.poll_mode(), PollMode::Relaxed);
    assert!(!node.app.snapshot().poll_throttle_pending);
}

#[test]
fn key_activity_restores_responsive_polling() {
    let mut node = SimNode::started();
    node.status(Mode::NetworkSteering, Outcome::Success);
    node.advance(secs(10));

    node.inject(Event::KeyPressed);
    node.inject(Event::KeyReleased);

    assert_eq!(poll_calls(&node), vec![0, 1, 1]);
    assert_eq!(node.app.poll_mode(), PollMode::Responsive);
    // Attached: the key never triggers recovery.
    assert_eq!(node.stack.recovery_attempts(), 0);
}

#[test]
fn power_saving_disabled_leaves_poll_rate_alone() {
    let config = CommissioningConfig {
        power: PowerConfig {
            power_saving: false,
            ..PowerConfig::default()
        },
        ..CommissioningConfig::default()
    };
    let mut node = SimNode::new(config);
    node.start();
    node.status(Mode::NetworkSteering, Outcome::Success);
    node.advance(secs(30));
    node.inject(Event::KeyPressed);

    assert!(poll_calls(&node).is_empty());
}

#[test]
fn key_press_while_recovering_rejoins_immediately() {
    let mut node = SimNode::started();
    node.status(Mode::ParentLost, Outcome::Failure);
    node.status(Mode::ParentLost, Outcome::Failure);
    let retry = node.app.retry_state();

    node.inject(Event::KeyPressed);

    assert_eq!(node.stack.recovery_attempts(), 1);
    assert_eq!(node.app.retry_state(), retry);
    assert_eq!(node.app.phase(), CommissioningPhase::Recovering);
    assert_eq!(node.timers.remaining(TimerTag::Rejoin), Some(secs(14)));
    assert_eq!(node.app.snapshot().manual_recoveries, 1);
}

#[test]
fn key_press_recovery_success_joins() {
    let mut node = SimNode::started();
    node.status(Mode::ParentLost, Outcome::Failure);
    node.stack.script_recovery_success();

    node.inject(Event::KeyPressed);

    assert_eq!(node.app.phase(), CommissioningPhase::Joined);
    assert_eq!(node.app.retry_state().attempts_remaining, 20);
    assert!(!node.app.snapshot().rejoin_pending);
}

#[test]
fn key_press_when_stack_reports_orphan() {
    let mut node = SimNode::started();
    node.inject(Event::DeviceStateChanged(DeviceState::Orphan));
    assert_eq!(node.app.phase(), CommissioningPhase::Initializing);

    node.inject(Event::KeyPressed);
    assert_eq!(node.stack.recovery_attempts(), 1);
}

#[test]
fn key_press_after_parent_restored_does_nothing() {
    let mut node = SimNode::started();
    node.status(Mode::NetworkSteering, Outcome::Success);
    node.inject(Event::DeviceStateChanged(DeviceState::Orphan));
    node.status(Mode::ParentLost, Outcome::NetworkRestored);
    assert_eq!(node.app.phase(), CommissioningPhase::Joined);

    node.inject(Event::KeyPressed);
    assert_eq!(node.stack.recovery_attempts(), 0);
    assert_eq!(node.app.snapshot().manual_recoveries, 0);
}

#[test]
fn key_press_while_steering_does_nothing() {
    let mut node = SimNode::started();
    node.status(Mode::NetworkSteering, Outcome::Failure);
    node.inject(Event::KeyPressed);
    assert_eq!(node.stack.recovery_attempts(), 0);
}

// ── Key driver feeding the node ──────────────────────────────

struct ScriptedPin {
    low: bool,
}

impl ErrorType for ScriptedPin {
    type Error = Infallible;
}

impl InputPin for ScriptedPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.low)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.low)
    }
}

#[test]
fn debounced_key_drives_recovery() {
    let mut node = SimNode::started();
    node.status(Mode::ParentLost, Outcome::Failure);

    let mut key = KeyDriver::new(ScriptedPin { low: true });
    let mut now_ms = 0;
    while now_ms <= 100 {
        if let Some(event) = key.poll(now_ms) {
            node.inject(event);
        }
        now_ms += 10;
    }
    assert_eq!(node.stack.recovery_attempts(), 1);
}
