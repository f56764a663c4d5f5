//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements    | Connects to                          |
//! |-------------|---------------|--------------------------------------|
//! | `log_sink`  | EventSink     | Serial log output                    |
//! | `nvs`       | ConfigPort    | NVS / in-memory store                |
//! |             | StoragePort   |                                      |
//! | `null_stack`| NetworkStack  | Placeholder until a radio is bound   |
//! | `sim_stack` | NetworkStack  | Scripted host simulation             |
//! | `timer`     | TimerService  | Virtual clock / ESP-IDF task timers  |

pub mod log_sink;
pub mod null_stack;
pub mod nvs;
pub mod sim_stack;
pub mod timer;
