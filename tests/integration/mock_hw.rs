//! Mock adapters for integration tests.
//!
//! Pins record every level written so tests can assert on the full output
//! history without touching real GPIO. Input mocks share their queues
//! through `Rc<RefCell<..>>` so a test can keep feeding them after the
//! scheduler has taken ownership.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;
use std::time::{Duration, Instant};

use embedded_hal::digital::{ErrorType, OutputPin};
use sandman::actuator::{MotionState, Timing};
use sandman::app::events::AppEvent;
use sandman::app::ports::{Clock, EventSink, KeyboardPort, SoundPort, SpeechPort};
use sandman::app::service::ControllerService;
use sandman::command::Channel;
use sandman::error::RecognizerError;

/// Timing used throughout the integration suite.
pub fn test_timing() -> Timing {
    Timing::from_millis(1000, 500)
}

// ── Pins ──────────────────────────────────────────────────────

/// Write log shared by every pin on one board, in true write order.
type WriteLog = Rc<RefCell<Vec<(usize, bool)>>>;

/// Output pin that records every level written to it.
#[derive(Clone, Default)]
pub struct MockPin {
    id: usize,
    log: WriteLog,
}

#[allow(dead_code)]
impl MockPin {
    /// Levels written to this pin, oldest first.
    pub fn history(&self) -> Vec<bool> {
        self.log
            .borrow()
            .iter()
            .filter(|(id, _)| *id == self.id)
            .map(|&(_, level)| level)
            .collect()
    }

    /// Last level written; `false` before any write.
    pub fn level(&self) -> bool {
        self.history().last().copied().unwrap_or(false)
    }

    /// Number of low→high edges seen.
    pub fn rising_edges(&self) -> usize {
        let mut prev = false;
        self.history()
            .into_iter()
            .filter(|&level| {
                let rising = level && !prev;
                prev = level;
                rising
            })
            .count()
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push((self.id, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push((self.id, true));
        Ok(())
    }
}

/// Six mock pins on one write log, plus handles to observe them after
/// they are moved into the service.
pub struct MockBoard {
    log: WriteLog,
    pairs: [(MockPin, MockPin); Channel::COUNT],
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        let log = WriteLog::default();
        let pin = |id| MockPin {
            id,
            log: Rc::clone(&log),
        };
        let pairs = [(pin(0), pin(1)), (pin(2), pin(3)), (pin(4), pin(5))];
        Self { log, pairs }
    }

    pub fn pins(&self) -> [(MockPin, MockPin); Channel::COUNT] {
        self.pairs.clone()
    }

    pub fn up(&self, channel: Channel) -> &MockPin {
        &self.pairs[channel.index()].0
    }

    pub fn down(&self, channel: Channel) -> &MockPin {
        &self.pairs[channel.index()].1
    }

    /// Any output currently asserted.
    pub fn any_asserted(&self) -> bool {
        self.pairs.iter().any(|(u, d)| u.level() || d.level())
    }

    /// Replay the write log and report whether both outputs of `channel`
    /// were ever high at the same moment.
    pub fn ever_both_asserted(&self, channel: Channel) -> bool {
        let (up_id, down_id) = (self.up(channel).id, self.down(channel).id);
        let (mut up, mut down) = (false, false);
        for &(id, level) in self.log.borrow().iter() {
            if id == up_id {
                up = level;
            } else if id == down_id {
                down = level;
            }
            if up && down {
                return true;
            }
        }
        false
    }

    pub fn service(&self, now: Instant) -> ControllerService<MockPin> {
        ControllerService::new(test_timing(), self.pins(), now)
    }
}

// ── Inputs ────────────────────────────────────────────────────

/// Keyboard fed from a shared character queue.
#[derive(Clone, Default)]
pub struct ScriptedKeyboard {
    chars: Rc<RefCell<VecDeque<char>>>,
}

#[allow(dead_code)]
impl ScriptedKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `text` followed by the line terminator.
    pub fn type_line(&self, text: &str) {
        self.type_raw(text);
        self.chars.borrow_mut().push_back('\r');
    }

    pub fn type_raw(&self, text: &str) {
        self.chars.borrow_mut().extend(text.chars());
    }

    pub fn pending(&self) -> usize {
        self.chars.borrow().len()
    }
}

impl KeyboardPort for ScriptedKeyboard {
    fn poll_char(&mut self) -> Option<char> {
        self.chars.borrow_mut().pop_front()
    }
}

/// Recognizer that replays one scripted result per poll, then idles.
#[derive(Clone, Default)]
pub struct ScriptedSpeech {
    script: Rc<RefCell<VecDeque<Result<Option<String>, RecognizerError>>>>,
}

#[allow(dead_code)]
impl ScriptedSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing recognized for the next `polls` polls.
    pub fn idle(&self, polls: usize) {
        let mut script = self.script.borrow_mut();
        for _ in 0..polls {
            script.push_back(Ok(None));
        }
    }

    pub fn say(&self, text: &str) {
        self.script.borrow_mut().push_back(Ok(Some(text.to_owned())));
    }

    pub fn fail(&self, error: RecognizerError) {
        self.script.borrow_mut().push_back(Err(error));
    }
}

impl SpeechPort for ScriptedSpeech {
    fn poll_utterance(&mut self) -> Result<Option<String>, RecognizerError> {
        self.script.borrow_mut().pop_front().unwrap_or(Ok(None))
    }
}

// ── Outputs ───────────────────────────────────────────────────

/// Sound port that records queued clips and tick count.
#[derive(Default)]
pub struct RecordingSound {
    pub clips: Vec<String>,
    pub ticks: usize,
}

impl SoundPort for RecordingSound {
    fn queue(&mut self, clip: &str) {
        self.clips.push(clip.to_owned());
    }

    fn tick(&mut self) {
        self.ticks += 1;
    }
}

/// Sink that keeps every event.
#[derive(Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(from, to)` of every state change on `channel`, in order.
    pub fn transitions(&self, channel: Channel) -> Vec<(MotionState, MotionState)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { channel: c, from, to } if *c == channel => {
                    Some((*from, *to))
                }
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Time ──────────────────────────────────────────────────────

/// Clock that only moves when slept on, plus an optional fixed cost per
/// `now()` call to simulate slow ticks.
pub struct ManualClock {
    now: Cell<Instant>,
    cost_per_read: Duration,
    pub sleeps: Vec<Duration>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Cell::new(start),
            cost_per_read: Duration::ZERO,
            sleeps: Vec::new(),
        }
    }

    pub fn with_cost_per_read(mut self, cost: Duration) -> Self {
        self.cost_per_read = cost;
        self
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let now = self.now.get();
        self.now.set(now + self.cost_per_read);
        now
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
        self.advance(duration);
    }
}
