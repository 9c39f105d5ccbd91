//! Splits a command line into vocabulary tokens.
//!
//! Pure: the only side effect is the returned [`Overflow`] report, which the
//! caller forwards to its event sink.

use super::Token;

/// Words that did not fit in the token buffer.
///
/// Produced at most once per call, however many words were dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    /// Buffer capacity that was reached.
    pub capacity: usize,
    /// Number of trailing words discarded.
    pub dropped: usize,
}

/// Tokenize `text` into `buffer`, one token per whitespace-delimited word.
///
/// `buffer` is cleared first. Words beyond its capacity are dropped and
/// reported through the `Err` variant; the tokens that fit are kept.
pub fn tokenize<const N: usize>(
    text: &str,
    buffer: &mut heapless::Vec<Token, N>,
) -> Result<(), Overflow> {
    buffer.clear();
    let mut dropped = 0;

    for word in text.split_whitespace() {
        if buffer.push(Token::from_word(word)).is_err() {
            dropped += 1;
        }
    }

    if dropped == 0 {
        Ok(())
    } else {
        Err(Overflow {
            capacity: N,
            dropped,
        })
    }
}
