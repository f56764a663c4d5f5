//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on target, stderr on the host).  An LED or
//! report adapter would implement the same trait.

use log::info;

use crate::app::events::{AppEvent, LinkStatus};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as one tagged line.
#[derive(Debug, Default)]
pub struct LogEventSink {
    emitted: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events written since construction.
    pub fn emitted(&self) -> u32 {
        self.emitted
    }
}

fn link_label(status: LinkStatus) -> &'static str {
    match status {
        LinkStatus::Searching => "searching",
        LinkStatus::Connected => "connected",
        LinkStatus::Lost => "lost",
        LinkStatus::Activity => "activity",
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        self.emitted = self.emitted.wrapping_add(1);
        match event {
            AppEvent::Status(status) => {
                info!("LINK | {}", link_label(*status));
            }
            AppEvent::PhaseChanged { from, to } => {
                info!("PHASE | {} -> {}", from, to);
            }
            AppEvent::RejoinScheduled {
                delay,
                attempts_remaining,
                exhausted,
            } => {
                info!(
                    "REJOIN | in={}s left={}{}",
                    delay.as_secs(),
                    attempts_remaining,
                    if *exhausted { " (ceiling)" } else { "" }
                );
            }
            AppEvent::BindRequested { request, capacity } => match capacity {
                Some(c) => info!(
                    "BIND | cluster=0x{:04X} dst=0x{:04X} ep={} | table={}/{}",
                    request.cluster_id,
                    request.dst_addr,
                    request.endpoint,
                    c.used_entries,
                    c.max_entries
                ),
                None => info!(
                    "BIND | cluster=0x{:04X} dst=0x{:04X} ep={}",
                    request.cluster_id, request.dst_addr, request.endpoint
                ),
            },
            AppEvent::PollIntervalChanged { interval_ms } => {
                info!("POLL | interval={}ms", interval_ms);
            }
            AppEvent::Started { modes } => {
                info!("START | modes=0b{:08b}", modes);
            }
        }
    }
}
