//! Grammar matcher: token sequence → directives.
//!
//! ```text
//! command      := SAND MAN channel_word verb
//!               | SAND MAN STOP
//! channel_word := HEAD | KNEE | ELEVATION
//! verb         := UP | DOWN
//! ```
//!
//! Matching is best-effort. A failed attempt at a `SAND` moves the scan
//! forward by a single token, so "sand sand man stop" still matches at the
//! second `sand`. A successful match resumes scanning after its last token.
//! Anything left unmatched is dropped without complaint.

use super::{Directive, Token};

/// Parse and consume every token in `tokens`.
///
/// Returns the matched directives in left-to-right order. `tokens` is
/// always empty afterwards, matched or not.
pub fn parse<const N: usize>(tokens: &mut heapless::Vec<Token, N>) -> heapless::Vec<Directive, N> {
    let mut directives = heapless::Vec::new();
    let mut index = 0;

    while index < tokens.len() {
        match match_at(&tokens[index..]) {
            Some((directive, used)) => {
                // At most one directive per three tokens, so this never fills.
                let _ = directives.push(directive);
                index += used;
            }
            None => index += 1,
        }
    }

    tokens.clear();
    directives
}

/// Try to match one command at the head of `rest`.
///
/// Returns the directive and how many tokens it spans.
fn match_at(rest: &[Token]) -> Option<(Directive, usize)> {
    match rest {
        [Token::Sand, Token::Man, Token::Stop, ..] => Some((Directive::StopAll, 3)),
        [Token::Sand, Token::Man, channel, verb, ..] => {
            let channel = channel.channel()?;
            let action = verb.movement()?;
            Directive::movement(channel, action).map(|d| (d, 4))
        }
        _ => None,
    }
}
