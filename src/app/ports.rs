//! Port traits: the boundary between the controller core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControllerService / Scheduler (domain)
//! ```
//!
//! Input sources, the sound queue, the event sink, and the clock are all
//! driven adapters. The core consumes them via generics and never touches a
//! terminal, audio device, or pipe directly. Actuator outputs go through
//! [`embedded_hal::digital::OutputPin`] rather than a port of their own.
//!
//! Every polling method here must return immediately: the scheduler is
//! single-threaded and never suspends inside a tick.

use std::time::{Duration, Instant};

use crate::error::RecognizerError;

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Input ports
// ───────────────────────────────────────────────────────────────

/// Local terminal, polled one character at a time.
pub trait KeyboardPort {
    /// Next pending character, or `None` if nothing is waiting.
    fn poll_char(&mut self) -> Option<char>;
}

/// Speech recognizer, polled for complete utterances.
pub trait SpeechPort {
    /// Next recognized utterance, if one is ready.
    ///
    /// An `Err` means the recognizer is unusable; the caller shuts down.
    fn poll_utterance(&mut self) -> Result<Option<String>, RecognizerError>;
}

// ───────────────────────────────────────────────────────────────
// Output ports
// ───────────────────────────────────────────────────────────────

/// Queue-and-play notification sounds.
pub trait SoundPort {
    /// Append a clip to the play queue. Clips are identified by name
    /// (e.g. `head_moving_up`), not by path.
    fn queue(&mut self, clip: &str);

    /// Advance playback by one scheduler tick.
    fn tick(&mut self);
}

/// The core emits structured [`AppEvent`]s through this port. Adapters
/// decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Time
// ───────────────────────────────────────────────────────────────

/// Monotonic time source plus the tick-pacing sleep.
pub trait Clock {
    /// Current monotonic instant. Never goes backwards.
    fn now(&self) -> Instant;

    /// Block for `duration`. Only the scheduler calls this, between ticks.
    fn sleep(&mut self, duration: Duration);
}
