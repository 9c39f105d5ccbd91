//! Outbound application events.
//!
//! The [`ControllerService`](super::service::ControllerService) and the
//! [`Scheduler`](crate::scheduler::Scheduler) emit these through the
//! [`EventSink`](super::ports::EventSink) port.

use core::fmt;

use crate::actuator::{MotionState, Rejection, Timing};
use crate::command::tokenizer::Overflow;
use crate::command::{Action, Channel, Directive};
use crate::error::RecognizerError;

/// Where a line of command text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Keyboard,
    Speech,
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyboard => f.write_str("keyboard"),
            Self::Speech => f.write_str("speech"),
        }
    }
}

/// Structured events emitted by the controller core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started with the given timing.
    Started(Timing),

    /// A complete line or utterance arrived.
    CommandReceived { source: InputSource, text: String },

    /// A line had more words than the token buffer holds.
    TokenOverflow {
        source: InputSource,
        overflow: Overflow,
    },

    /// The keyboard line buffer filled before a terminator; it was reset.
    LineOverflow { capacity: usize },

    /// A directive was parsed and is about to be applied.
    DirectiveParsed {
        source: InputSource,
        directive: Directive,
    },

    /// An actuator refused an action.
    DirectiveRejected {
        channel: Channel,
        action: Action,
        reason: Rejection,
    },

    /// An actuator changed state.
    StateChanged {
        channel: Channel,
        from: MotionState,
        to: MotionState,
    },

    /// All actuator outputs were enabled or disabled.
    ControlsEnabled(bool),

    /// The keyboard `quit` command was entered.
    QuitRequested,

    /// The speech source failed; the loop is terminating.
    RecognizerFailed(RecognizerError),

    /// Orderly shutdown finished; all outputs released.
    Shutdown,
}
