//! Application core: pure domain logic, zero I/O.
//!
//! Turns command text into directives and drives the actuators. All
//! interaction with terminals, recognizers, audio, and time happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
