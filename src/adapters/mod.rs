//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements     | Connects to                     |
//! |--------------|----------------|---------------------------------|
//! | `gpio`       | OutputPin      | Linux sysfs GPIO / log only     |
//! | `terminal`   | KeyboardPort   | stdin (reader thread)           |
//! | `recognizer` | SpeechPort     | utterance file or FIFO          |
//! | `sound`      | SoundPort      | external audio player           |
//! | `log_sink`   | EventSink      | `log` facade                    |
//! | `time`       | Clock          | `std::time::Instant`            |

pub mod gpio;
pub mod log_sink;
pub mod recognizer;
pub mod sound;
pub mod terminal;
pub mod time;
