//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each [`AppEvent`] as one tagged
//! line through the `log` facade. The tag leads so the journal can be
//! grepped by kind (`grep 'STATE |'`).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(timing) => {
                info!(
                    "START | moving={:?} cool_down={:?}",
                    timing.moving, timing.cool_down
                );
            }
            AppEvent::CommandReceived { source, text } => {
                info!("INPUT | {source} | \"{text}\"");
            }
            AppEvent::TokenOverflow { source, overflow } => {
                warn!(
                    "OVERFLOW | {source} | {} words kept, {} dropped",
                    overflow.capacity, overflow.dropped
                );
            }
            AppEvent::LineOverflow { capacity } => {
                warn!("OVERFLOW | keyboard | line exceeded {capacity} characters");
            }
            AppEvent::DirectiveParsed { source, directive } => {
                info!("DIRECTIVE | {source} | {directive}");
            }
            AppEvent::DirectiveRejected {
                channel,
                action,
                reason,
            } => {
                info!("REJECT | {channel} {action} | {reason}");
            }
            AppEvent::StateChanged { channel, from, to } => {
                info!("STATE | {channel} | {from} -> {to}");
            }
            AppEvent::ControlsEnabled(enabled) => {
                info!(
                    "CONTROLS | {}",
                    if *enabled { "enabled" } else { "disabled" }
                );
            }
            AppEvent::QuitRequested => {
                info!("QUIT | requested from keyboard");
            }
            AppEvent::RecognizerFailed(e) => {
                error!("RECOGNIZER | {e}");
            }
            AppEvent::Shutdown => {
                info!("SHUTDOWN | all outputs released");
            }
        }
    }
}
