//! Debounced key driver.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up.  The main loop calls
//! [`KeyDriver::poll`] at its tick rate; a level change has to be stable
//! for [`DEBOUNCE_MS`] before it is reported.
//!
//! ```text
//!  Released ──low──▶ PressDebounce ──stable 50ms──▶ Pressed  (KeyPressed)
//!     ▲                  │ high                        │ high
//!     │                  ▼                             ▼
//!     └──stable 50ms── ReleaseDebounce ◀───────────────┘    (KeyReleased)
//! ```

use embedded_hal::digital::InputPin;
use log::{debug, warn};

use crate::events::Event;

pub const DEBOUNCE_MS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyState {
    Released,
    PressDebounce { since_ms: u32 },
    Pressed,
    ReleaseDebounce { since_ms: u32 },
}

/// Turns raw pin levels into [`Event::KeyPressed`] / [`Event::KeyReleased`].
pub struct KeyDriver<P> {
    pin: P,
    state: KeyState,
}

impl<P: InputPin> KeyDriver<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            state: KeyState::Released,
        }
    }

    /// True once a press has been debounced and not yet released.
    pub fn is_pressed(&self) -> bool {
        matches!(self.state, KeyState::Pressed | KeyState::ReleaseDebounce { .. })
    }

    /// Sample the pin.  `now_ms` is monotonic milliseconds since boot.
    pub fn poll(&mut self, now_ms: u32) -> Option<Event> {
        let low = match self.pin.is_low() {
            Ok(low) => low,
            Err(e) => {
                warn!("Key: pin read failed: {:?}", e);
                return None;
            }
        };

        match (self.state, low) {
            (KeyState::Released, true) => {
                self.state = KeyState::PressDebounce { since_ms: now_ms };
                None
            }
            (KeyState::PressDebounce { .. }, false) => {
                debug!("Key: bounce on press");
                self.state = KeyState::Released;
                None
            }
            (KeyState::PressDebounce { since_ms }, true) => {
                if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = KeyState::Pressed;
                    return Some(Event::KeyPressed);
                }
                None
            }
            (KeyState::Pressed, false) => {
                self.state = KeyState::ReleaseDebounce { since_ms: now_ms };
                None
            }
            (KeyState::ReleaseDebounce { .. }, true) => {
                debug!("Key: bounce on release");
                self.state = KeyState::Pressed;
                None
            }
            (KeyState::ReleaseDebounce { since_ms }, false) => {
                if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = KeyState::Released;
                    return Some(Event::KeyReleased);
                }
                None
            }
            (KeyState::Released, false) | (KeyState::Pressed, true) => None,
        }
    }
}
