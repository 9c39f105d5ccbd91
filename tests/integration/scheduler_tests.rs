//! Scheduler end to end: per-tick ordering, keyboard line handling,
//! timeouts, pacing, and both shutdown paths.

use std::time::{Duration, Instant};

use sandman::actuator::{MotionState, Rejection};
use sandman::app::events::{AppEvent, InputSource};
use sandman::app::ports::Clock;
use sandman::app::service::STARTUP_CLIP;
use sandman::command::{Action, Channel};
use sandman::error::RecognizerError;
use sandman::input::LINE_CAPACITY;
use sandman::scheduler::{Scheduler, TICK_PERIOD, TickOutcome};

use crate::mock_hw::{
    EventLog, ManualClock, MockBoard, MockPin, RecordingSound, ScriptedKeyboard, ScriptedSpeech,
};

type TestScheduler =
    Scheduler<MockPin, ScriptedKeyboard, ScriptedSpeech, RecordingSound, ManualClock>;

struct Harness {
    board: MockBoard,
    keyboard: ScriptedKeyboard,
    speech: ScriptedSpeech,
    log: EventLog,
    sched: TestScheduler,
}

impl Harness {
    fn new() -> Self {
        Self::with_clock(ManualClock::new(Instant::now()))
    }

    fn with_clock(clock: ManualClock) -> Self {
        let board = MockBoard::new();
        let keyboard = ScriptedKeyboard::new();
        let speech = ScriptedSpeech::new();
        let service = board.service(clock.now());
        let sched = Scheduler::new(
            service,
            Some(keyboard.clone()),
            speech.clone(),
            RecordingSound::default(),
            clock,
        );
        Self {
            board,
            keyboard,
            speech,
            log: EventLog::new(),
            sched,
        }
    }

    fn started() -> Self {
        let mut h = Self::new();
        h.sched.start(&mut h.log);
        h
    }

    fn tick(&mut self) -> TickOutcome {
        self.sched.tick(&mut self.log).unwrap()
    }

    fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            assert_eq!(self.tick(), TickOutcome::Continue);
        }
    }

    fn state(&self, channel: Channel) -> MotionState {
        self.sched.service().state(channel)
    }
}

#[test]
fn keyboard_line_applies_on_terminator() {
    let mut h = Harness::started();
    h.keyboard.type_line("sand man head up");

    h.ticks(16);
    assert_eq!(h.sched.pending_line(), "sand man head up");
    assert_eq!(h.state(Channel::Head), MotionState::Stopped);

    h.ticks(1);
    assert_eq!(h.sched.pending_line(), "");
    assert_eq!(h.state(Channel::Head), MotionState::MovingUp);
    assert!(h.board.up(Channel::Head).level());
    assert!(h.log.contains(&AppEvent::CommandReceived {
        source: InputSource::Keyboard,
        text: "sand man head up".to_owned(),
    }));
}

#[test]
fn movement_times_out_then_cools_down() {
    let mut h = Harness::started();
    h.speech.say("sand man elevation down");

    h.ticks(1);
    assert_eq!(h.state(Channel::Elevation), MotionState::MovingDown);
    h.ticks(55);
    assert_eq!(h.state(Channel::Elevation), MotionState::MovingDown);
    assert!(h.board.down(Channel::Elevation).level());

    h.ticks(10);
    assert_eq!(h.state(Channel::Elevation), MotionState::CoolingDown);
    assert!(!h.board.any_asserted());

    h.ticks(40);
    assert_eq!(h.state(Channel::Elevation), MotionState::Stopped);
    assert!(!h.board.ever_both_asserted(Channel::Elevation));
}

#[test]
fn stop_beats_timeout_in_the_same_tick() {
    let mut h = Harness::started();
    h.speech.say("sand man head up");
    h.speech.idle(60);
    h.speech.say("sand man stop");

    // Tick 61 is the last before the timeout; tick 62 would time out.
    h.ticks(61);
    assert_eq!(h.state(Channel::Head), MotionState::MovingUp);
    h.ticks(1);

    assert_eq!(h.state(Channel::Head), MotionState::CoolingDown);
    assert_eq!(
        h.log.transitions(Channel::Head),
        vec![
            (MotionState::Stopped, MotionState::MovingUp),
            (MotionState::MovingUp, MotionState::CoolingDown),
        ]
    );
    assert_eq!(
        h.log
            .count(|e| matches!(e, AppEvent::DirectiveRejected { .. })),
        0
    );
}

#[test]
fn keyboard_lands_before_speech_within_a_tick() {
    let mut h = Harness::started();
    h.keyboard.type_line("sand man knee up");
    h.speech.idle(16);
    h.speech.say("sand man knee down");

    h.ticks(17);

    assert_eq!(h.state(Channel::Knee), MotionState::MovingUp);
    assert!(h.log.contains(&AppEvent::DirectiveRejected {
        channel: Channel::Knee,
        action: Action::MoveDown,
        reason: Rejection::Reversal,
    }));
    let sources: Vec<InputSource> = h
        .log
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CommandReceived { source, .. } => Some(*source),
            _ => None,
        })
        .collect();
    assert_eq!(sources, vec![InputSource::Keyboard, InputSource::Speech]);
}

#[test]
fn quit_ends_the_loop_and_releases_outputs() {
    let mut h = Harness::new();
    h.speech.say("sand man head down");
    h.keyboard.type_line("  QUIT ");

    assert_eq!(h.sched.run(&mut h.log), Ok(()));

    assert_eq!(h.sched.tick_count(), 8);
    assert_eq!(h.state(Channel::Head), MotionState::Stopped);
    assert!(!h.board.any_asserted());
    assert_eq!(h.board.down(Channel::Head).rising_edges(), 1);
    assert!(h.log.contains(&AppEvent::QuitRequested));
    assert_eq!(h.log.events.last(), Some(&AppEvent::Shutdown));
}

#[test]
fn recognizer_failure_is_fatal_but_orderly() {
    let mut h = Harness::new();
    h.speech.say("sand man knee down");
    h.speech.fail(RecognizerError::Closed);

    assert_eq!(h.sched.run(&mut h.log), Err(RecognizerError::Closed));

    // The failing tick is abandoned before the actuators advance.
    assert_eq!(h.sched.tick_count(), 1);
    assert!(h.log.contains(&AppEvent::RecognizerFailed(RecognizerError::Closed)));
    assert_eq!(h.state(Channel::Knee), MotionState::Stopped);
    assert!(!h.board.any_asserted());
    assert_eq!(h.log.events.last(), Some(&AppEvent::Shutdown));
}

#[test]
fn daemon_mode_runs_on_speech_alone() {
    let board = MockBoard::new();
    let speech = ScriptedSpeech::new();
    let clock = ManualClock::new(Instant::now());
    let mut sched = Scheduler::new(
        board.service(clock.now()),
        None::<ScriptedKeyboard>,
        speech.clone(),
        RecordingSound::default(),
        clock,
    );
    let mut log = EventLog::new();
    sched.start(&mut log);

    speech.say("sand man elevation up");
    assert_eq!(sched.tick(&mut log), Ok(TickOutcome::Continue));
    assert_eq!(sched.service().state(Channel::Elevation), MotionState::MovingUp);
    assert!(board.up(Channel::Elevation).level());
}

#[test]
fn overlong_keyboard_line_is_discarded() {
    let mut h = Harness::started();
    h.keyboard.type_raw(&"a".repeat(LINE_CAPACITY + 1));
    h.keyboard.type_line("sand man elevation up");

    h.ticks(LINE_CAPACITY + 1);
    assert_eq!(
        h.log.count(|e| matches!(e, AppEvent::LineOverflow { .. })),
        1
    );
    assert_eq!(h.sched.pending_line(), "");

    // The rest of the same line never runs.
    h.ticks(22);
    assert_eq!(h.state(Channel::Elevation), MotionState::Stopped);
    assert_eq!(h.sched.pending_line(), "");
    assert!(!h.log.events.iter().any(|e| matches!(
        e,
        AppEvent::CommandReceived {
            source: InputSource::Keyboard,
            ..
        }
    )));

    h.keyboard.type_line("sand man knee up");
    h.ticks(17);
    assert_eq!(h.state(Channel::Knee), MotionState::MovingUp);
}

#[test]
fn every_tick_sleeps_off_the_period() {
    let mut h = Harness::started();
    h.ticks(5);
    assert_eq!(h.sched.clock().sleeps, vec![TICK_PERIOD; 5]);
    assert_eq!(h.sched.overruns(), 0);
    assert_eq!(h.sched.tick_count(), 5);
}

#[test]
fn slow_ticks_shorten_the_sleep_or_overrun() {
    let cost = Duration::from_millis(10);
    let mut h = Harness::with_clock(ManualClock::new(Instant::now()).with_cost_per_read(cost));
    h.sched.start(&mut h.log);
    h.ticks(1);
    assert_eq!(h.sched.clock().sleeps, vec![TICK_PERIOD - cost]);

    let cost = Duration::from_millis(20);
    let mut h = Harness::with_clock(ManualClock::new(Instant::now()).with_cost_per_read(cost));
    h.sched.start(&mut h.log);
    h.ticks(1);
    assert!(h.sched.clock().sleeps.is_empty());
    assert_eq!(h.sched.overruns(), 1);
}

#[test]
fn sound_queue_advances_once_per_tick() {
    let mut h = Harness::started();
    h.ticks(3);
    assert_eq!(h.sched.sound().ticks, 3);
    assert_eq!(h.sched.sound().clips, vec![STARTUP_CLIP.to_owned()]);
}
