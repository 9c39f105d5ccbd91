//! Controller service: the core that owns the actuators.
//!
//! [`ControllerService`] holds one [`Actuator`] per [`Channel`] in a fixed
//! array and is the only thing that mutates them. It turns text into
//! directives (tokenizer → parser), applies them in order, and advances the
//! actuators once per tick.
//!
//! ```text
//!  text ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!           │       ControllerService       │
//!           │ tokenize · parse · actuators  │ ──▶ SoundPort
//!           └──────────────────────────────┘
//!                        │
//!                        ▼
//!                  OutputPin × 6
//! ```

use std::time::Instant;

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::actuator::{Actuator, ApplyOutcome, MotionState, OutputLevels, Timing, Transition};
use crate::command::{parser, tokenizer, Channel, CommandBuffer, Directive};

use super::events::{AppEvent, InputSource};
use super::ports::{EventSink, SoundPort};

/// Clip queued once the controller is up.
pub const STARTUP_CLIP: &str = "initialized";

/// Owns and drives every actuator.
pub struct ControllerService<P: OutputPin> {
    actuators: [Actuator<P>; Channel::COUNT],
    tokens: CommandBuffer,
    timing: Timing,
}

impl<P: OutputPin> ControllerService<P> {
    /// Build the service from per-channel `(up, down)` pins, in
    /// [`Channel::ALL`] order. Outputs are driven off; controls start
    /// disabled until [`start`](Self::start).
    pub fn new(timing: Timing, pins: [(P, P); Channel::COUNT], now: Instant) -> Self {
        let [head, knee, elevation] = pins;
        Self {
            actuators: [
                Actuator::new(Channel::Head, head.0, head.1, timing, now),
                Actuator::new(Channel::Knee, knee.0, knee.1, timing, now),
                Actuator::new(Channel::Elevation, elevation.0, elevation.1, timing, now),
            ],
            tokens: CommandBuffer::new(),
            timing,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enable all controls and announce readiness.
    pub fn start(&mut self, sink: &mut impl EventSink, sound: &mut impl SoundPort) {
        sink.emit(&AppEvent::Started(self.timing));
        self.set_enabled(true, sink);
        sound.queue(STARTUP_CLIP);
    }

    /// Disable all controls, force every actuator to `Stopped`, and drive
    /// all outputs off.
    pub fn shutdown(&mut self, now: Instant, sink: &mut impl EventSink) {
        for actuator in &mut self.actuators {
            actuator.release(now);
        }
        sink.emit(&AppEvent::ControlsEnabled(false));
        sink.emit(&AppEvent::Shutdown);
        info!("All controls released");
    }

    /// Gate output assertion on every actuator at once.
    pub fn set_enabled(&mut self, enabled: bool, sink: &mut impl EventSink) {
        for actuator in &mut self.actuators {
            actuator.set_enabled(enabled);
        }
        sink.emit(&AppEvent::ControlsEnabled(enabled));
    }

    // ── Command handling ──────────────────────────────────────

    /// Tokenize, parse, and apply one line of text.
    ///
    /// Returns the number of directives that were parsed.
    pub fn handle_text(
        &mut self,
        source: InputSource,
        text: &str,
        now: Instant,
        sink: &mut impl EventSink,
        sound: &mut impl SoundPort,
    ) -> usize {
        sink.emit(&AppEvent::CommandReceived {
            source,
            text: text.to_owned(),
        });

        if let Err(overflow) = tokenizer::tokenize(text, &mut self.tokens) {
            warn!(
                "Command from {} too long, {} trailing word(s) ignored",
                source, overflow.dropped
            );
            sink.emit(&AppEvent::TokenOverflow { source, overflow });
        }

        let directives = parser::parse(&mut self.tokens);
        for &directive in &directives {
            sink.emit(&AppEvent::DirectiveParsed { source, directive });
            self.apply(directive, now, sink, sound);
        }
        directives.len()
    }

    /// Apply one directive to its target actuator(s), in channel order.
    pub fn apply(
        &mut self,
        directive: Directive,
        now: Instant,
        sink: &mut impl EventSink,
        sound: &mut impl SoundPort,
    ) {
        for (channel, action) in directive.fan_out() {
            match self.actuators[channel.index()].apply(action, now) {
                ApplyOutcome::Transitioned(t) => announce(channel, t, sink, sound),
                ApplyOutcome::Rejected(reason) => sink.emit(&AppEvent::DirectiveRejected {
                    channel,
                    action,
                    reason,
                }),
                ApplyOutcome::Unchanged => {}
            }
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Advance every actuator's timers and rewrite its outputs.
    pub fn tick(&mut self, now: Instant, sink: &mut impl EventSink, sound: &mut impl SoundPort) {
        for actuator in &mut self.actuators {
            if let Some(t) = actuator.advance(now) {
                announce(actuator.channel(), t, sink, sound);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self, channel: Channel) -> MotionState {
        self.actuators[channel.index()].state()
    }

    pub fn outputs(&self, channel: Channel) -> OutputLevels {
        self.actuators[channel.index()].outputs()
    }

    pub fn actuator(&self, channel: Channel) -> &Actuator<P> {
        &self.actuators[channel.index()]
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }
}

/// Report a transition and queue its spoken notification.
fn announce(
    channel: Channel,
    t: Transition,
    sink: &mut impl EventSink,
    sound: &mut impl SoundPort,
) {
    sink.emit(&AppEvent::StateChanged {
        channel,
        from: t.from,
        to: t.to,
    });
    if let Some(clip) = notification_clip(channel, t.to) {
        sound.queue(&clip);
    }
}

/// Clip announcing entry into `state`, e.g. `knee_moving_down`.
///
/// Returning to `Stopped` after cooldown is silent.
pub fn notification_clip(channel: Channel, state: MotionState) -> Option<String> {
    let suffix = match state {
        MotionState::MovingUp => "moving_up",
        MotionState::MovingDown => "moving_down",
        MotionState::CoolingDown => "stop",
        MotionState::Stopped => return None,
    };
    Some(format!("{}_{}", channel.name(), suffix))
}
