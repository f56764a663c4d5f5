//! Sleepy end-device commissioning firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! simulation.  All ESP-IDF-specific code is guarded by the `espidf`
//! feature within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod commissioning;
pub mod config;
pub mod error;
pub mod events;
pub mod power;
pub mod timers;

pub mod adapters;
pub mod drivers;
