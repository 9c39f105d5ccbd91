//! Fuzz target: keyboard `LineBuffer`
//!
//! Drives arbitrary character streams into the line buffer and checks:
//! - No panics
//! - Accumulated and completed lines stay within `LINE_CAPACITY`
//! - Only ASCII is ever kept
//!
//! cargo fuzz run fuzz_line_buffer

#![no_main]

use libfuzzer_sys::fuzz_target;
use sandman::input::{LineBuffer, LineEvent, LINE_CAPACITY};

fuzz_target!(|data: &[u8]| {
    let mut line = LineBuffer::new();
    for c in String::from_utf8_lossy(data).chars() {
        if let LineEvent::Complete(text) = line.push(c) {
            assert!(text.len() <= LINE_CAPACITY);
            assert!(text.is_ascii());
        }
        assert!(line.as_str().len() <= LINE_CAPACITY);
    }
});
