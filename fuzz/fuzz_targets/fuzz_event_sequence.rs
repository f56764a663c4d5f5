//! Fuzz target: arbitrary event sequences
//!
//! Decodes each input byte into one inbound event (status pair, device
//! state, key edge or a virtual-clock jump) and checks after every step:
//! - no panics
//! - at most one timer per tag is armed
//! - retry delay stays within the configured ceiling
//! - a joined node never keeps a rejoin timer
//!
//! cargo fuzz run fuzz_event_sequence

#![no_main]

use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use sleepynode::adapters::sim_stack::SimNetworkStack;
use sleepynode::adapters::timer::VirtualTimerService;
use sleepynode::app::events::AppEvent;
use sleepynode::app::ports::{EventSink, Ports};
use sleepynode::app::service::AppService;
use sleepynode::commissioning::{
    CommissioningMode, CommissioningOutcome, CommissioningPhase, CommissioningStatusEvent,
    DeviceState,
};
use sleepynode::config::CommissioningConfig;
use sleepynode::events::Event;

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

const MODES: [CommissioningMode; 4] = [
    CommissioningMode::Initialization,
    CommissioningMode::NetworkSteering,
    CommissioningMode::ParentLost,
    CommissioningMode::FindingBinding,
];

const OUTCOMES: [CommissioningOutcome; 5] = [
    CommissioningOutcome::NoNetwork,
    CommissioningOutcome::NetworkRestored,
    CommissioningOutcome::Success,
    CommissioningOutcome::Failure,
    CommissioningOutcome::InProgress,
];

fn decode(byte: u8) -> Option<Event> {
    match byte >> 5 {
        0..=3 => {
            let idx = usize::from(byte & 0x1F) % (MODES.len() * OUTCOMES.len());
            Some(Event::StatusChanged(CommissioningStatusEvent::new(
                MODES[idx / OUTCOMES.len()],
                OUTCOMES[idx % OUTCOMES.len()],
            )))
        }
        4 => Some(Event::DeviceStateChanged(if byte & 1 == 0 {
            DeviceState::Orphan
        } else {
            DeviceState::EndDevice
        })),
        5 => Some(if byte & 1 == 0 {
            Event::KeyPressed
        } else {
            Event::KeyReleased
        }),
        _ => None,
    }
}

fuzz_target!(|data: &[u8]| {
    let config = CommissioningConfig::default();
    let ceiling = config.backoff.max_delay();
    let mut app = AppService::new(config);
    let mut stack = SimNetworkStack::new();
    let mut timers = VirtualTimerService::new();
    let mut sink = NullSink;

    app.start(&mut Ports::new(&mut stack, &mut timers, &mut sink));

    for &byte in data {
        let events = match decode(byte) {
            Some(event) => vec![event],
            None => timers.advance(Duration::from_secs(u64::from(byte & 0x3F) * 10)),
        };
        for event in events {
            app.dispatch(event, &mut Ports::new(&mut stack, &mut timers, &mut sink));
        }

        let snap = app.snapshot();
        assert!(timers.armed_count() <= 2);
        assert!(snap.retry.current_delay <= ceiling);
        if snap.phase == CommissioningPhase::Joined {
            assert!(!snap.rejoin_pending);
        }
    }
});
