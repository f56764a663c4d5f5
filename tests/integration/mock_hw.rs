//! Simulated node for integration tests.
//!
//! Wires the real [`AppService`] to the host adapters: the scripted
//! [`SimNetworkStack`], the virtual-clock [`VirtualTimerService`] and a
//! sink that records every [`AppEvent`].  Events travel through a real
//! [`EventQueue`] exactly as on target: stack replies and timer firings
//! are enqueued, then drained one at a time into `dispatch`.

use std::time::Duration;

use sleepynode::adapters::sim_stack::SimNetworkStack;
use sleepynode::adapters::timer::VirtualTimerService;
use sleepynode::app::events::{AppEvent, LinkStatus};
use sleepynode::app::ports::{EventSink, Ports};
use sleepynode::app::service::AppService;
use sleepynode::commissioning::{CommissioningMode, CommissioningOutcome, CommissioningStatusEvent};
use sleepynode::config::CommissioningConfig;
use sleepynode::events::{Event, EventQueue};

// ── Recording sink ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── SimNode ───────────────────────────────────────────────────

pub struct SimNode {
    pub app: AppService,
    pub stack: SimNetworkStack,
    pub timers: VirtualTimerService,
    pub sink: RecordingSink,
    pub queue: EventQueue,
}

#[allow(dead_code)]
impl SimNode {
    pub fn new(config: CommissioningConfig) -> Self {
        Self {
            app: AppService::new(config),
            stack: SimNetworkStack::new(),
            timers: VirtualTimerService::new(),
            sink: RecordingSink::default(),
            queue: EventQueue::new(),
        }
    }

    /// Node with default config, started.
    pub fn started() -> Self {
        let mut node = Self::new(CommissioningConfig::default());
        node.start();
        node
    }

    pub fn start(&mut self) {
        self.app.start(&mut Ports::new(
            &mut self.stack,
            &mut self.timers,
            &mut self.sink,
        ));
        self.forward_stack_replies();
        self.pump();
    }

    /// Enqueue an external event and run the loop until idle.
    pub fn inject(&mut self, event: Event) {
        assert!(self.queue.push(event), "event queue overflow");
        self.pump();
    }

    pub fn status(&mut self, mode: CommissioningMode, outcome: CommissioningOutcome) {
        self.inject(Event::StatusChanged(CommissioningStatusEvent::new(mode, outcome)));
    }

    /// Advance virtual time; due timers are enqueued and dispatched.
    pub fn advance(&mut self, by: Duration) {
        for fired in self.timers.advance(by) {
            assert!(self.queue.push(fired), "event queue overflow");
        }
        self.pump();
    }

    /// Jump to the next armed timer and dispatch it.  `false` if none.
    pub fn fire_next_timer(&mut self) -> bool {
        match self.timers.fire_next() {
            Some(fired) => {
                self.inject(fired);
                true
            }
            None => false,
        }
    }

    /// Drain the queue, feeding stack replies back in, until idle.
    pub fn pump(&mut self) {
        while let Some(event) = self.queue.pop() {
            self.app.dispatch(
                event,
                &mut Ports::new(&mut self.stack, &mut self.timers, &mut self.sink),
            );
            self.forward_stack_replies();
        }
    }

    fn forward_stack_replies(&mut self) {
        for reply in self.stack.take_outbox() {
            assert!(self.queue.push(reply), "event queue overflow");
        }
    }

    // ── Assertions helpers ────────────────────────────────────

    /// Every rejoin delay announced so far, in order.
    pub fn rejoin_delays(&self) -> Vec<Duration> {
        self.sink
            .events
            .iter()
            .filter_map(|e| match e {
                AppEvent::RejoinScheduled { delay, .. } => Some(*delay),
                _ => None,
            })
            .collect()
    }

    pub fn link_statuses(&self) -> Vec<LinkStatus> {
        self.sink
            .events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Status(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn clear_events(&mut self) {
        self.sink.events.clear();
    }
}
