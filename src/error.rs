//! Unified error type for the node firmware.
//!
//! The boot path bubbles timer and peripheral failures up with `?`.  The
//! running commissioning core never returns these: it logs port failures
//! and keeps going, and a bad stored config falls back to defaults.

use core::fmt;

use crate::app::ports::TimerError;

/// Every fallible boot-time operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A timer could not be armed.
    Timer(TimerError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timer(e) => write!(f, "timer: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<TimerError> for Error {
    fn from(e: TimerError) -> Self {
        Self::Timer(e)
    }
}
