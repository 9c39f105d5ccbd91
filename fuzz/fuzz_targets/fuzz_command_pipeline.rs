//! Fuzz target: tokenizer → parser
//!
//! Feeds arbitrary bytes (lossily decoded) through the command pipeline.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - The token buffer never exceeds `TOKEN_CAPACITY`
//! - The parser always leaves the token buffer empty
//! - Every directive needs at least three tokens
//!
//! cargo fuzz run fuzz_command_pipeline

#![no_main]

use libfuzzer_sys::fuzz_target;
use sandman::command::{parser, tokenizer, CommandBuffer, TOKEN_CAPACITY};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut tokens = CommandBuffer::new();

    if let Err(overflow) = tokenizer::tokenize(&text, &mut tokens) {
        assert_eq!(overflow.capacity, TOKEN_CAPACITY);
        assert!(overflow.dropped > 0);
    }
    assert!(tokens.len() <= TOKEN_CAPACITY);

    let count = tokens.len();
    let directives = parser::parse(&mut tokens);
    assert!(tokens.is_empty());
    assert!(directives.len() * 3 <= count);
});
