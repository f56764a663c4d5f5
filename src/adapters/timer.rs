//! Timer service adapters.
//!
//! - [`VirtualTimerService`]: host, a virtual clock the harness advances
//!   explicitly.  Due firings come back in fire-time order, so a whole
//!   rejoin episode runs deterministically without sleeping.
//! - `EspTimerService` (feature `espidf`): one ESP-IDF task timer per
//!   scheduled instance; the callback pushes
//!   [`Event::TimerElapsed`](crate::events::Event::TimerElapsed) into the
//!   static event queue.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! they only enqueue and never touch the application state directly.

use core::time::Duration;

use log::debug;

use crate::app::ports::{TimerError, TimerService};
use crate::events::Event;
use crate::timers::{TimerHandle, TimerTag};

#[derive(Debug, Clone, Copy)]
struct Armed {
    tag: TimerTag,
    handle: TimerHandle,
    due: Duration,
    seq: u64,
}

/// Deterministic timer service driven by [`advance`](Self::advance).
#[derive(Debug, Default)]
pub struct VirtualTimerService {
    now: Duration,
    armed: Vec<Armed>,
    seq: u64,
}

impl VirtualTimerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time since construction.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Time left until `tag` fires, if armed.
    pub fn remaining(&self, tag: TimerTag) -> Option<Duration> {
        self.armed
            .iter()
            .find(|a| a.tag == tag)
            .map(|a| a.due.saturating_sub(self.now))
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Move the clock forward by `by` and return every firing that fell
    /// due, earliest first.  Ties fire in scheduling order.
    pub fn advance(&mut self, by: Duration) -> Vec<Event> {
        let target = self.now + by;
        let mut due: Vec<Armed> = Vec::new();
        self.armed.retain(|a| {
            if a.due <= target {
                due.push(*a);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|a| (a.due, a.seq));
        self.now = target;

        due.into_iter()
            .map(|a| {
                debug!("VirtualTimer: {} #{} fired at {}ms", a.tag, a.handle.0, a.due.as_millis());
                Event::TimerElapsed {
                    tag: a.tag,
                    handle: a.handle,
                }
            })
            .collect()
    }

    /// Jump straight to the earliest armed timer and fire it alone.
    pub fn fire_next(&mut self) -> Option<Event> {
        let (i, _) = self
            .armed
            .iter()
            .enumerate()
            .min_by_key(|(_, a)| (a.due, a.seq))?;
        let a = self.armed.remove(i);
        self.now = self.now.max(a.due);
        Some(Event::TimerElapsed {
            tag: a.tag,
            handle: a.handle,
        })
    }
}

impl TimerService for VirtualTimerService {
    fn schedule(
        &mut self,
        tag: TimerTag,
        handle: TimerHandle,
        after: Duration,
    ) -> Result<(), TimerError> {
        self.armed.retain(|a| a.tag != tag);
        self.seq += 1;
        self.armed.push(Armed {
            tag,
            handle,
            due: self.now + after,
            seq: self.seq,
        });
        Ok(())
    }

    fn cancel(&mut self, tag: TimerTag) {
        self.armed.retain(|a| a.tag != tag);
    }
}

#[cfg(feature = "espidf")]
pub use esp::EspTimerService;

#[cfg(feature = "espidf")]
mod esp {
    use core::time::Duration;

    use esp_idf_svc::timer::{EspTaskTimerService, EspTimer};
    use heapless::FnvIndexMap;
    use log::warn;

    use crate::app::ports::{TimerError, TimerService};
    use crate::events::{Event, EventQueue};
    use crate::timers::{TimerHandle, TimerTag};

    /// ESP-IDF task timers feeding the static event queue.
    pub struct EspTimerService {
        service: EspTaskTimerService,
        queue: &'static EventQueue,
        live: FnvIndexMap<TimerTag, EspTimer<'static>, 4>,
    }

    impl EspTimerService {
        pub fn new(queue: &'static EventQueue) -> Result<Self, TimerError> {
            let service = EspTaskTimerService::new().map_err(|e| {
                warn!("EspTimerService: init failed: {}", e);
                TimerError::Platform
            })?;
            Ok(Self {
                service,
                queue,
                live: FnvIndexMap::new(),
            })
        }
    }

    impl TimerService for EspTimerService {
        fn schedule(
            &mut self,
            tag: TimerTag,
            handle: TimerHandle,
            after: Duration,
        ) -> Result<(), TimerError> {
            self.cancel(tag);

            let queue = self.queue;
            let timer = self
                .service
                .timer(move || {
                    queue.push(Event::TimerElapsed { tag, handle });
                })
                .map_err(|e| {
                    warn!("EspTimerService: create {} failed: {}", tag, e);
                    TimerError::Platform
                })?;
            timer.after(after).map_err(|e| {
                warn!("EspTimerService: arm {} failed: {}", tag, e);
                TimerError::Platform
            })?;
            self.live
                .insert(tag, timer)
                .map_err(|_| TimerError::NoSlot)?;
            Ok(())
        }

        fn cancel(&mut self, tag: TimerTag) {
            if let Some(timer) = self.live.remove(&tag) {
                if let Err(e) = timer.cancel() {
                    warn!("EspTimerService: cancel {} failed: {}", tag, e);
                }
            }
        }
    }
}
