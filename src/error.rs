//! Unified error types for the Sandman controller.
//!
//! A single [`Error`] enum that every subsystem converts into, keeping the
//! run loop's handling uniform. Variants are `Copy`.
//!
//! Note what is *not* here: unrecognized words, partial commands, and
//! rejected directives are normal operation, not errors.

use core::fmt;
use std::io;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is missing or invalid.
    Config(ConfigError),
    /// The speech input source failed. Always fatal to the run loop.
    Recognizer(RecognizerError),
    /// GPIO setup failed.
    Gpio(GpioError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Recognizer(e) => write!(f, "recognizer: {e}"),
            Self::Gpio(e) => write!(f, "gpio: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file does not exist.
    NotFound,
    /// The config file exists but could not be read.
    Unreadable(io::ErrorKind),
    /// The file is not valid JSON for the config schema.
    Malformed { line: usize, column: usize },
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config file not found"),
            Self::Unreadable(kind) => write!(f, "config file unreadable ({kind})"),
            Self::Malformed { line, column } => {
                write!(f, "config malformed at line {line}, column {column}")
            }
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Recognizer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerError {
    /// The utterance stream ended.
    Closed,
    /// Reading the utterance stream failed.
    Io(io::ErrorKind),
}

impl fmt::Display for RecognizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "utterance stream closed"),
            Self::Io(kind) => write!(f, "utterance stream read failed ({kind})"),
        }
    }
}

impl From<RecognizerError> for Error {
    fn from(e: RecognizerError) -> Self {
        Self::Recognizer(e)
    }
}

// ---------------------------------------------------------------------------
// GPIO errors
// ---------------------------------------------------------------------------

/// GPIO failures, tagged with the pin number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    Export(u32),
    Direction(u32),
    Write(u32),
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Export(pin) => write!(f, "could not export GPIO {pin}"),
            Self::Direction(pin) => write!(f, "could not set direction of GPIO {pin}"),
            Self::Write(pin) => write!(f, "could not write GPIO {pin}"),
        }
    }
}

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}
