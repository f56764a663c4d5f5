//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (network stack, timer service, event sinks, storage)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches the radio
//! or the RTOS directly.
//!
//! All port errors are typed and `Copy`.  The commissioning core logs and
//! absorbs them; none of them is fatal.

use core::time::Duration;

use crate::commissioning::ModeFlags;
use crate::config::{CommissioningConfig, RadioConfig};
use crate::timers::{TimerHandle, TimerTag};

// ───────────────────────────────────────────────────────────────
// Network stack port (driven adapter: domain → join/recovery stack)
// ───────────────────────────────────────────────────────────────

/// Binding table usage reported by the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindCapacity {
    pub max_entries: u16,
    pub used_entries: u16,
}

/// Outbound calls into the mesh network stack.
///
/// The stack answers asynchronously: outcomes come back later as
/// [`Event::StatusChanged`](crate::events::Event::StatusChanged).
pub trait NetworkStack {
    /// Push radio settings (TX power, trust-centre key policy).
    fn configure(&mut self, radio: &RadioConfig) -> Result<(), StackError>;

    /// Begin commissioning in the given modes.
    fn start_commissioning(&mut self, modes: ModeFlags) -> Result<(), StackError>;

    /// Ask the stack to look for our parent again (rejoin).
    fn attempt_network_recovery(&mut self) -> Result<(), StackError>;

    /// Set the data-request poll interval; 0 stops automatic polling.
    fn set_poll_interval(&mut self, interval_ms: u32) -> Result<(), StackError>;

    /// Current binding table capacity, if the stack exposes it.
    fn bind_capacity(&self) -> Option<BindCapacity>;
}

// ───────────────────────────────────────────────────────────────
// Timer service port (driven adapter: domain → RTOS timers)
// ───────────────────────────────────────────────────────────────

/// One-shot timer service.
///
/// A fired timer comes back as
/// [`Event::TimerElapsed`](crate::events::Event::TimerElapsed) carrying the
/// same tag and handle.
pub trait TimerService {
    /// Arm `tag` to fire once after `after`.  An already armed timer with
    /// the same tag is replaced.
    fn schedule(&mut self, tag: TimerTag, handle: TimerHandle, after: Duration)
    -> Result<(), TimerError>;

    /// Disarm `tag`.  No-op if it is not armed.
    fn cancel(&mut self, tag: TimerTag);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → indicator / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Fire-and-forget: adapters decide whether they blink
/// an LED, write a log line or forward a report.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Port bundle
// ───────────────────────────────────────────────────────────────

/// Borrowed view of the ports an event handler may drive.
///
/// Built fresh by the caller for every dispatched event, so the domain
/// never stores a reference to an adapter.
pub struct Ports<'a, S, T, E> {
    pub stack: &'a mut S,
    pub timer_service: &'a mut T,
    pub sink: &'a mut E,
}

impl<'a, S, T, E> Ports<'a, S, T, E>
where
    S: NetworkStack,
    T: TimerService,
    E: EventSink,
{
    pub fn new(stack: &'a mut S, timer_service: &'a mut T, sink: &'a mut E) -> Self {
        Self {
            stack,
            timer_service,
            sink,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`CommissioningConfig`].
///
/// Implementations MUST call [`CommissioningConfig::validate`] before
/// persisting and reject invalid values instead of clamping them.
pub trait ConfigPort {
    fn load(&self) -> Result<CommissioningConfig, ConfigError>;

    fn save(&mut self, config: &CommissioningConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Namespaced key-value storage.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`NetworkStack`] calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// The stack has not finished its own initialisation.
    NotReady,
    /// Another commissioning procedure is running.
    Busy,
    /// The call is not available for this device type / build.
    Unsupported,
    /// Platform status code.
    Platform(i32),
}

/// Errors from [`TimerService`] calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// No free timer slot.
    NoSlot,
    /// The RTOS refused to arm the timer.
    Platform,
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Underlying storage failed.
    Storage(StorageError),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    NotFound,
    Full,
    IoError,
}

impl core::fmt::Display for StackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotReady => write!(f, "stack not ready"),
            Self::Busy => write!(f, "stack busy"),
            Self::Unsupported => write!(f, "unsupported by this device type"),
            Self::Platform(code) => write!(f, "platform status {}", code),
        }
    }
}

impl core::fmt::Display for TimerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoSlot => write!(f, "no free timer slot"),
            Self::Platform => write!(f, "timer service refused"),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}
