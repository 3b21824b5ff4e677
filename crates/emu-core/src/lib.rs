//! Core traits and types for cycle-accurate emulation.
//!
//! Chips exchange bytes with the outside world over a [`Bus`]. The bus
//! is serviced by the circuit driver, never by the chip itself.

mod bus;

pub use bus::{Bus, SimpleBus};
