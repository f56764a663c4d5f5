//! Inbound event system.
//!
//! Events are produced by:
//! - Network stack callbacks (commissioning status, bind requests, device state)
//! - Timer callbacks (rejoin, poll throttle)
//! - Key input (press / release)
//!
//! and consumed by the main loop, which hands them one at a time, in
//! arrival order, to [`AppService::dispatch`](crate::app::service::AppService::dispatch).
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Stack CB    │────▶│              │     │              │
//! │ Timer CB    │────▶│  EventQueue  │────▶│  Main Loop   │
//! │ Key driver  │────▶│  (FIFO)      │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;
use log::warn;

use crate::commissioning::{BindRequest, CommissioningStatusEvent, DeviceState};
use crate::timers::{TimerHandle, TimerTag};

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 16;

/// Every input the commissioning core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Commissioning status notification from the stack.
    StatusChanged(CommissioningStatusEvent),
    /// A peer requested a binding.
    BindRequestReceived(BindRequest),
    /// The stack's view of our network role changed.
    DeviceStateChanged(DeviceState),
    /// A one-shot timer fired.
    TimerElapsed { tag: TimerTag, handle: TimerHandle },
    /// Key pressed.
    KeyPressed,
    /// Key released.
    KeyReleased,
}

/// Bounded FIFO shared between callback producers and the main loop.
///
/// Every access runs inside a critical section, so timer and stack
/// callbacks may push while the main loop pops.
pub struct EventQueue {
    inner: Mutex<RefCell<Deque<Event, EVENT_QUEUE_CAP>>>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Enqueue an event.  Returns `false` if the queue is full (event dropped).
    pub fn push(&self, event: Event) -> bool {
        let accepted =
            critical_section::with(|cs| self.inner.borrow_ref_mut(cs).push_back(event).is_ok());
        if !accepted {
            warn!("EventQueue: full, dropped {:?}", event);
        }
        accepted
    }

    /// Dequeue the oldest event.
    pub fn pop(&self) -> Option<Event> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).pop_front())
    }

    /// Drain all pending events into a callback, in FIFO order.
    ///
    /// Events pushed by the handler itself are drained in the same call.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
