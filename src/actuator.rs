//! Linear actuator safety state machine.
//!
//! One [`Actuator`] per physical channel. It owns the channel's two relay
//! outputs (extend/retract) and guarantees two things regardless of what
//! the command layer asks for:
//!
//! 1. The two outputs are never asserted at the same time.
//! 2. Direction never reverses without a full cooldown in between.
//!
//! ```text
//!             MoveUp                 timeout / Stop
//!   Stopped ─────────▶ MovingUp   ─────────────────┐
//!      ▲   ─────────▶ MovingDown ─────────────────┤
//!      │    MoveDown                               ▼
//!      └───────────── cooldown elapsed ──────── CoolingDown
//! ```
//!
//! Each scheduler tick first applies directives ([`Actuator::apply`]), then
//! advances time ([`Actuator::advance`]). Rejected directives are not
//! errors: rejection *is* the protection mechanism.
//!
//! ## Output writes
//!
//! Outputs are recomputed from state and written on every advance rather
//! than diffed. The relay lines tolerate repeated writes of the same level.
//! The de-asserted line is always written before the asserted one so that
//! even a half-finished write sequence cannot leave both lines on.

use core::fmt;
use std::time::{Duration, Instant};

use embedded_hal::digital::OutputPin;
use log::{debug, error, info};

use crate::command::{Action, Channel};

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Movement and cooldown durations, shared by every actuator.
///
/// Set once at startup from configuration; never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Maximum travel time before power is cut automatically.
    pub moving: Duration,
    /// Mandatory idle time after power is cut.
    pub cool_down: Duration,
}

impl Timing {
    pub fn from_millis(moving_ms: u32, cool_down_ms: u32) -> Self {
        Self {
            moving: Duration::from_millis(u64::from(moving_ms)),
            cool_down: Duration::from_millis(u64::from(cool_down_ms)),
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Motion state of one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionState {
    Stopped,
    MovingUp,
    MovingDown,
    CoolingDown,
}

impl MotionState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::MovingUp => "moving up",
            Self::MovingDown => "moving down",
            Self::CoolingDown => "cool down",
        }
    }

    pub const fn is_moving(self) -> bool {
        matches!(self, Self::MovingUp | Self::MovingDown)
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A completed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: MotionState,
    pub to: MotionState,
}

/// Why a directive was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Opposite direction requested while moving.
    Reversal,
    /// Cooldown has not finished yet.
    CoolingDown,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reversal => write!(f, "direction reversal without cooldown"),
            Self::CoolingDown => write!(f, "cooldown still active"),
        }
    }
}

/// Result of [`Actuator::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The directive caused a state change.
    Transitioned(Transition),
    /// The directive was accepted but changes nothing (e.g. stop while stopped).
    Unchanged,
    /// The directive was refused by the safety rules.
    Rejected(Rejection),
}

/// Last levels confirmed on the two outputs (`true` = asserted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputLevels {
    pub up: bool,
    pub down: bool,
}

// ---------------------------------------------------------------------------
// Actuator
// ---------------------------------------------------------------------------

/// Direction-control state machine for one channel.
pub struct Actuator<P: OutputPin> {
    channel: Channel,
    up_pin: P,
    down_pin: P,
    timing: Timing,
    state: MotionState,
    /// When the current state was entered.
    since: Instant,
    /// Gates every output assertion.
    enabled: bool,
    /// Whether the current movement was started while enabled. Cleared on
    /// disable; re-enabling never powers a movement retroactively.
    energized: bool,
    levels: OutputLevels,
}

impl<P: OutputPin> Actuator<P> {
    /// Take ownership of the channel's outputs and drive both de-asserted.
    ///
    /// The actuator starts `Stopped` and disabled.
    pub fn new(channel: Channel, up_pin: P, down_pin: P, timing: Timing, now: Instant) -> Self {
        let mut actuator = Self {
            channel,
            up_pin,
            down_pin,
            timing,
            state: MotionState::Stopped,
            since: now,
            enabled: false,
            energized: false,
            // Unknown until the first release succeeds.
            levels: OutputLevels { up: true, down: true },
        };
        actuator.write_outputs();
        actuator
    }

    // ── Directives ────────────────────────────────────────────

    /// Apply one directive at time `now`.
    pub fn apply(&mut self, action: Action, now: Instant) -> ApplyOutcome {
        let outcome = match (self.state, action) {
            (MotionState::Stopped, Action::MoveUp) => {
                ApplyOutcome::Transitioned(self.enter(MotionState::MovingUp, now))
            }
            (MotionState::Stopped, Action::MoveDown) => {
                ApplyOutcome::Transitioned(self.enter(MotionState::MovingDown, now))
            }
            (MotionState::Stopped, Action::Stop)
            | (MotionState::MovingUp, Action::MoveUp)
            | (MotionState::MovingDown, Action::MoveDown) => ApplyOutcome::Unchanged,
            (MotionState::MovingUp, Action::MoveDown)
            | (MotionState::MovingDown, Action::MoveUp) => {
                ApplyOutcome::Rejected(Rejection::Reversal)
            }
            (MotionState::MovingUp | MotionState::MovingDown, Action::Stop) => {
                ApplyOutcome::Transitioned(self.enter(MotionState::CoolingDown, now))
            }
            (MotionState::CoolingDown, _) => ApplyOutcome::Rejected(Rejection::CoolingDown),
        };

        match outcome {
            ApplyOutcome::Rejected(reason) => {
                debug!(
                    "Actuator '{}': {} rejected in '{}' ({})",
                    self.channel, action, self.state, reason
                );
            }
            ApplyOutcome::Transitioned(_) => self.write_outputs(),
            ApplyOutcome::Unchanged => {}
        }
        outcome
    }

    // ── Per-tick advance ──────────────────────────────────────

    /// Advance time-based transitions and rewrite the outputs.
    ///
    /// Returns the transition taken this tick, if any.
    pub fn advance(&mut self, now: Instant) -> Option<Transition> {
        let elapsed = now.saturating_duration_since(self.since);

        let transition = match self.state {
            MotionState::MovingUp | MotionState::MovingDown
                if elapsed >= self.timing.moving =>
            {
                Some(self.enter(MotionState::CoolingDown, now))
            }
            MotionState::CoolingDown if elapsed >= self.timing.cool_down => {
                Some(self.enter(MotionState::Stopped, now))
            }
            _ => None,
        };

        self.write_outputs();
        transition
    }

    // ── Enable / release ──────────────────────────────────────

    /// Gate all output assertion.
    ///
    /// Disabling de-asserts immediately. Enabling does not re-assert a
    /// movement already in progress; a fresh directive is needed.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.energized = false;
        }
        self.write_outputs();
    }

    /// Force `Stopped`, disable, and de-assert both outputs.
    ///
    /// Call before dropping the actuator at shutdown.
    pub fn release(&mut self, now: Instant) {
        if self.state != MotionState::Stopped {
            info!(
                "Actuator '{}': released while '{}'",
                self.channel, self.state
            );
        }
        self.state = MotionState::Stopped;
        self.since = now;
        self.enabled = false;
        self.energized = false;
        self.write_outputs();
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Levels most recently written to the outputs.
    pub fn outputs(&self) -> OutputLevels {
        self.levels
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    // ── Internal ──────────────────────────────────────────────

    fn enter(&mut self, next: MotionState, now: Instant) -> Transition {
        let transition = Transition {
            from: self.state,
            to: next,
        };
        info!(
            "Actuator '{}': {} -> {}",
            self.channel, transition.from, transition.to
        );
        self.state = next;
        self.since = now;
        if next.is_moving() {
            self.energized = self.enabled;
        }
        transition
    }

    /// Desired levels for the current state.
    fn desired_levels(&self) -> OutputLevels {
        let powered = self.enabled && self.energized;
        OutputLevels {
            up: powered && self.state == MotionState::MovingUp,
            down: powered && self.state == MotionState::MovingDown,
        }
    }

    fn write_outputs(&mut self) {
        let want = self.desired_levels();

        // Release before assert: never both high, even mid-sequence.
        if !want.up {
            self.drive_up(false);
        }
        if !want.down {
            self.drive_down(false);
        }
        // Assert only against a confirmed release of the opposite output.
        if (want.up && self.levels.down) || (want.down && self.levels.up) {
            error!(
                "Actuator '{}': opposite output still asserted, '{}' left unpowered",
                self.channel, self.state
            );
            self.energized = false;
            return;
        }
        if want.up {
            self.drive_up(true);
        }
        if want.down {
            self.drive_down(true);
        }
    }

    fn drive_up(&mut self, asserted: bool) {
        let result = if asserted {
            self.up_pin.set_high()
        } else {
            self.up_pin.set_low()
        };
        match result {
            Ok(()) => self.levels.up = asserted,
            Err(e) => error!("Actuator '{}': up output write failed: {:?}", self.channel, e),
        }
    }

    fn drive_down(&mut self, asserted: bool) {
        let result = if asserted {
            self.down_pin.set_high()
        } else {
            self.down_pin.set_low()
        };
        match result {
            Ok(()) => self.levels.down = asserted,
            Err(e) => error!("Actuator '{}': down output write failed: {:?}", self.channel, e),
        }
    }
}
