//! Keyboard input from a terminal or any byte stream.
//!
//! A reader thread forwards characters over a channel so
//! [`KeyboardPort::poll_char`] never blocks. Newlines are delivered as
//! [`LINE_TERMINATOR`](crate::input::LINE_TERMINATOR) so piped input and
//! a cooked terminal both end lines the same way.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{debug, warn};

use crate::app::ports::KeyboardPort;
use crate::input::LINE_TERMINATOR;

/// Keyboard fed by a background reader thread.
pub struct TerminalKeyboard {
    rx: Receiver<char>,
    closed: bool,
}

impl TerminalKeyboard {
    /// Read from the process's standard input.
    pub fn stdin() -> io::Result<Self> {
        Self::spawn(io::stdin())
    }

    /// Read from any byte source.
    pub fn spawn<R>(reader: R) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("keyboard".into())
            .spawn(move || {
                let mut reader = BufReader::new(reader);
                let mut line = String::new();
                loop {
                    line.clear();
                    match reader.read_line(&mut line) {
                        Ok(0) => break,
                        Ok(_) => {
                            let chars = line
                                .chars()
                                .map(|c| if c == '\n' { LINE_TERMINATOR } else { c });
                            for c in chars {
                                if tx.send(c).is_err() {
                                    return;
                                }
                            }
                        }
                        Err(e) => {
                            warn!("Keyboard read failed: {e}");
                            break;
                        }
                    }
                }
                debug!("Keyboard input closed");
            })?;
        Ok(Self { rx, closed: false })
    }

    /// The reader has hit end of input and every character was delivered.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl KeyboardPort for TerminalKeyboard {
    fn poll_char(&mut self) -> Option<char> {
        match self.rx.try_recv() {
            Ok(c) => Some(c),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }
}
