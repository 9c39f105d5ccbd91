//! Speech recognizer adapters.
//!
//! Recognition itself runs out of process. [`LineRecognizer`] consumes its
//! output: one recognized utterance per line, from a file, FIFO, or any
//! reader. End of stream and read errors are fatal and surface as
//! [`RecognizerError`].
//!
//! [`SilentRecognizer`] stands in when no utterance source is configured.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{debug, info};

use crate::app::ports::SpeechPort;
use crate::error::RecognizerError;

type Utterance = Result<String, RecognizerError>;

/// Utterances read line by line on a background thread.
pub struct LineRecognizer {
    rx: Receiver<Utterance>,
}

impl LineRecognizer {
    /// Read utterances from `path`.
    ///
    /// The file is opened on the reader thread because opening a FIFO
    /// blocks until the recognizer process connects.
    pub fn open(path: PathBuf) -> io::Result<Self> {
        Self::start(move || {
            info!("Listening for utterances on {}", path.display());
            File::open(&path).map(BufReader::new)
        })
    }

    /// Read utterances from an already-open reader.
    pub fn spawn<R>(reader: R) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        Self::start(move || Ok(reader))
    }

    fn start<R, F>(open: F) -> io::Result<Self>
    where
        R: BufRead,
        F: FnOnce() -> io::Result<R> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("recognizer".into())
            .spawn(move || {
                let reader = match open() {
                    Ok(reader) => reader,
                    Err(e) => {
                        let _ = tx.send(Err(RecognizerError::Io(e.kind())));
                        return;
                    }
                };
                for line in reader.lines() {
                    let utterance = line.map_err(|e| RecognizerError::Io(e.kind()));
                    let failed = utterance.is_err();
                    if tx.send(utterance).is_err() || failed {
                        return;
                    }
                }
                debug!("Utterance stream reached end");
                let _ = tx.send(Err(RecognizerError::Closed));
            })?;
        Ok(Self { rx })
    }
}

impl SpeechPort for LineRecognizer {
    fn poll_utterance(&mut self) -> Result<Option<String>, RecognizerError> {
        match self.rx.try_recv() {
            Ok(Ok(text)) => Ok(Some(text)),
            Ok(Err(e)) => Err(e),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(RecognizerError::Closed),
        }
    }
}

/// Recognizer that never hears anything.
#[derive(Debug, Default)]
pub struct SilentRecognizer;

impl SpeechPort for SilentRecognizer {
    fn poll_utterance(&mut self) -> Result<Option<String>, RecognizerError> {
        Ok(None)
    }
}
