//! Fixed-rate control loop.
//!
//! One thread, one loop, 60 ticks per second. Every tick runs the same
//! sequence and never blocks until the pacing sleep at the end:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ 1. record tick start                                         │
//! │ 2. keyboard: ≤1 char → line buffer → (line) tokenize/parse   │
//! │ 3. speech:   ≤1 utterance        → tokenize/parse            │
//! │ 4. advance every actuator (timeouts, cooldowns, outputs)     │
//! │ 5. advance the sound queue                                   │
//! │ 6. sleep off whatever is left of the tick period             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keyboard directives land before speech directives, and both land before
//! the time-based advance, so a Stop issued this tick always beats an
//! automatic timeout in the same tick.
//!
//! The loop ends on the keyboard `quit` command or on a recognizer
//! failure. Either way [`Scheduler::run`] performs the orderly shutdown
//! (controls disabled, outputs released) before returning.

use std::time::{Duration, Instant};

use embedded_hal::digital::OutputPin;
use log::{debug, error, info, warn};

use crate::app::events::{AppEvent, InputSource};
use crate::app::ports::{Clock, EventSink, KeyboardPort, SoundPort, SpeechPort};
use crate::app::service::ControllerService;
use crate::error::RecognizerError;
use crate::input::{self, LineBuffer, LineEvent};

/// Target tick rate.
pub const TICK_RATE_HZ: u32 = 60;

/// Target duration of one tick.
pub const TICK_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE_HZ as u64);

/// What the loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Quit,
}

/// The control loop and everything it polls.
///
/// Sole owner of the [`ControllerService`] (and therefore of every
/// actuator). `keyboard` is `None` when running non-interactively.
pub struct Scheduler<P, K, R, S, C>
where
    P: OutputPin,
{
    service: ControllerService<P>,
    keyboard: Option<K>,
    recognizer: R,
    sound: S,
    clock: C,
    line: LineBuffer,
    period: Duration,
    tick_count: u64,
    /// Ticks that ran longer than the period.
    overruns: u64,
}

impl<P, K, R, S, C> Scheduler<P, K, R, S, C>
where
    P: OutputPin,
    K: KeyboardPort,
    R: SpeechPort,
    S: SoundPort,
    C: Clock,
{
    pub fn new(
        service: ControllerService<P>,
        keyboard: Option<K>,
        recognizer: R,
        sound: S,
        clock: C,
    ) -> Self {
        Self {
            service,
            keyboard,
            recognizer,
            sound,
            clock,
            line: LineBuffer::new(),
            period: TICK_PERIOD,
            tick_count: 0,
            overruns: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enable the controls. Call once before the first [`tick`](Self::tick).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.service.start(sink, &mut self.sound);
        info!(
            "Control loop ready at {} Hz ({})",
            TICK_RATE_HZ,
            if self.keyboard.is_some() {
                "interactive"
            } else {
                "non-interactive"
            }
        );
    }

    /// Start, loop until quit or failure, then shut down.
    ///
    /// Returns `Ok` after `quit`, or the recognizer error that ended the
    /// loop. Outputs are released in both cases.
    pub fn run(&mut self, sink: &mut impl EventSink) -> Result<(), RecognizerError> {
        self.start(sink);

        let result = loop {
            match self.tick(sink) {
                Ok(TickOutcome::Continue) => {}
                Ok(TickOutcome::Quit) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        self.shutdown(sink);
        info!(
            "Control loop exited after {} ticks ({} overruns)",
            self.tick_count, self.overruns
        );
        result
    }

    /// Disable all controls and release every output.
    pub fn shutdown(&mut self, sink: &mut impl EventSink) {
        let now = self.clock.now();
        self.service.shutdown(now, sink);
    }

    // ── Tick ──────────────────────────────────────────────────

    /// Run one full tick, including the pacing sleep.
    ///
    /// A recognizer failure aborts the tick before the actuators advance
    /// and is returned for the caller to shut down on.
    pub fn tick(&mut self, sink: &mut impl EventSink) -> Result<TickOutcome, RecognizerError> {
        let start = self.clock.now();

        let outcome = self.poll_keyboard(start, sink);

        match self.recognizer.poll_utterance() {
            Ok(Some(utterance)) => {
                self.service.handle_text(
                    InputSource::Speech,
                    &utterance,
                    start,
                    sink,
                    &mut self.sound,
                );
            }
            Ok(None) => {}
            Err(e) => {
                error!("Speech recognition failed: {e}");
                sink.emit(&AppEvent::RecognizerFailed(e));
                return Err(e);
            }
        }

        self.service.tick(start, sink, &mut self.sound);
        self.sound.tick();
        self.tick_count += 1;

        self.pace(start);
        Ok(outcome)
    }

    fn poll_keyboard(&mut self, now: Instant, sink: &mut impl EventSink) -> TickOutcome {
        let Some(c) = self.keyboard.as_mut().and_then(KeyboardPort::poll_char) else {
            return TickOutcome::Continue;
        };

        match self.line.push(c) {
            LineEvent::Pending => TickOutcome::Continue,
            LineEvent::Overflow => {
                warn!(
                    "Keyboard line longer than {} characters, discarded",
                    input::LINE_CAPACITY
                );
                sink.emit(&AppEvent::LineOverflow {
                    capacity: input::LINE_CAPACITY,
                });
                TickOutcome::Continue
            }
            LineEvent::Complete(line) if input::is_quit(&line) => {
                info!("Quit requested from keyboard");
                sink.emit(&AppEvent::QuitRequested);
                TickOutcome::Quit
            }
            LineEvent::Complete(line) => {
                self.service.handle_text(
                    InputSource::Keyboard,
                    &line,
                    now,
                    sink,
                    &mut self.sound,
                );
                TickOutcome::Continue
            }
        }
    }

    /// Sleep off the remainder of the tick period.
    fn pace(&mut self, start: Instant) {
        let elapsed = self.clock.now().saturating_duration_since(start);
        if let Some(remaining) = self.period.checked_sub(elapsed).filter(|d| !d.is_zero()) {
            self.clock.sleep(remaining);
        } else {
            self.overruns += 1;
            debug!("Tick {} overran: {:?}", self.tick_count, elapsed);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn service(&self) -> &ControllerService<P> {
        &self.service
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Characters typed so far on the current keyboard line.
    pub fn pending_line(&self) -> &str {
        self.line.as_str()
    }
}
