//! Peripheral drivers.

pub mod key;
