//! Sandman bed controller library.
//!
//! Exposes the controller core (command language, actuator state machine,
//! service, scheduler) and the host adapters for the binary and for
//! integration testing.

#![deny(unused_must_use)]

pub mod actuator;
pub mod adapters;
pub mod app;
pub mod command;
pub mod config;
pub mod error;
pub mod input;
pub mod pins;
pub mod scheduler;
