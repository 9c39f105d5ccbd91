//! Keyboard line accumulation.
//!
//! The terminal is polled one character per tick. [`LineBuffer`]
//! collects characters until a carriage return, then hands back the
//! completed line. A line that outgrows the buffer is reported once and
//! discarded up to and including its terminator, so no part of it is ever
//! run as a command.

/// Characters kept per keyboard line.
pub const LINE_CAPACITY: usize = 128;

/// Line terminator delivered by the terminal.
pub const LINE_TERMINATOR: char = '\r';

/// Reserved line that ends the process instead of being parsed.
pub const QUIT_COMMAND: &str = "quit";

/// Result of feeding one character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Still accumulating.
    Pending,
    /// A terminator arrived; carries the line without it.
    Complete(heapless::String<LINE_CAPACITY>),
    /// The buffer was full. The line is dropped through its terminator.
    Overflow,
}

/// Bounded keyboard line buffer.
#[derive(Debug, Default)]
pub struct LineBuffer {
    line: heapless::String<LINE_CAPACITY>,
    /// Skipping the rest of an overflowed line.
    discarding: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one character.
    ///
    /// Non-ASCII characters are ignored.
    pub fn push(&mut self, c: char) -> LineEvent {
        if self.discarding {
            self.discarding = c != LINE_TERMINATOR;
            return LineEvent::Pending;
        }
        if c == LINE_TERMINATOR {
            return LineEvent::Complete(core::mem::take(&mut self.line));
        }
        if !c.is_ascii() {
            return LineEvent::Pending;
        }
        if self.line.push(c).is_err() {
            self.line.clear();
            self.discarding = true;
            return LineEvent::Overflow;
        }
        LineEvent::Pending
    }

    /// Characters accumulated so far.
    pub fn as_str(&self) -> &str {
        self.line.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }
}

/// Whether a completed line is the reserved quit command.
pub fn is_quit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(QUIT_COMMAND)
}
