//! SleepyNode Firmware: Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  NetworkStack    EspTimerService   LogEventSink   NvsAdapter   │
//! │  (radio)         (TimerService)    (EventSink)    (Config+NVS) │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  StateMachine · Backoff · PollThrottle · KeyTrigger    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  EventQueue (critical-section FIFO) ◀── timers · key driver    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::info;

use sleepynode::adapters::log_sink::LogEventSink;
use sleepynode::adapters::null_stack::NullNetworkStack;
use sleepynode::adapters::nvs::NvsAdapter;
use sleepynode::adapters::timer::EspTimerService;
use sleepynode::app::ports::Ports;
use sleepynode::app::service::AppService;
use sleepynode::drivers::key::KeyDriver;
use sleepynode::error::Error;
use sleepynode::events::EventQueue;

/// Main-loop tick; also the key sampling period.
const TICK_MS: u32 = 20;

static EVENTS: EventQueue = EventQueue::new();

fn uptime_ms() -> u32 {
    // SAFETY: esp_timer_get_time has no preconditions once the scheduler runs.
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() } / 1000) as u32
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("SleepyNode v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take().map_err(|_| Error::Init("peripherals already taken"))?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let partition = EspDefaultNvsPartition::take().map_err(|_| Error::Init("NVS partition"))?;
    let nvs = NvsAdapter::new(partition);
    let config = AppService::load_config(&nvs);

    // ── 3. Construct adapters ─────────────────────────────────
    // No radio stack binding yet: the null stack never replies, so the
    // device stays in Initializing.
    let mut stack = NullNetworkStack::new();
    let mut timers = EspTimerService::new(&EVENTS)
        .map_err(Error::from)
        .context("timer service")?;
    let mut log_sink = LogEventSink::new();

    let mut key_pin =
        PinDriver::input(peripherals.pins.gpio9).map_err(|_| Error::Init("key GPIO"))?;
    key_pin
        .set_pull(Pull::Up)
        .map_err(|_| Error::Init("key pull-up"))?;
    let mut key = KeyDriver::new(key_pin);

    // ── 4. Construct app service ──────────────────────────────
    let mut app = AppService::new(config);
    app.start(&mut Ports::new(&mut stack, &mut timers, &mut log_sink));

    info!("System ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    loop {
        if let Some(event) = key.poll(uptime_ms()) {
            EVENTS.push(event);
        }

        EVENTS.drain(|event| {
            app.dispatch(event, &mut Ports::new(&mut stack, &mut timers, &mut log_sink));
        });

        FreeRtos::delay_ms(TICK_MS);
    }
}
