//! Voice/keyboard command vocabulary.
//!
//! ```text
//!   "sand man head up"
//!          │
//!          ▼
//!   ┌────────────┐   [Sand, Man, Head, Up]   ┌──────────┐
//!   │ tokenizer  │ ────────────────────────▶ │  parser  │ ──▶ Directive::MoveUp(Head)
//!   └────────────┘                           └──────────┘
//! ```
//!
//! The tokenizer fills a bounded [`CommandBuffer`]; the parser drains it
//! and yields zero or more [`Directive`]s in utterance order.

pub mod parser;
pub mod tokenizer;

use core::fmt;

/// Maximum number of tokens kept from one input line.
pub const TOKEN_CAPACITY: usize = 32;

/// Fixed-capacity token sequence built from one input line.
pub type CommandBuffer = heapless::Vec<Token, TOKEN_CAPACITY>;

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// One recognized (or unrecognized) word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Sand,
    Man,
    Head,
    Knee,
    Elevation,
    Up,
    Down,
    Stop,
    /// A word outside the vocabulary. Still occupies a slot so that
    /// positional matching lines up with the input words.
    Invalid,
}

/// Lower-case spelling of every vocabulary token.
const VOCABULARY: [(&str, Token); 8] = [
    ("sand", Token::Sand),
    ("man", Token::Man),
    ("head", Token::Head),
    ("knee", Token::Knee),
    ("elevation", Token::Elevation),
    ("up", Token::Up),
    ("down", Token::Down),
    ("stop", Token::Stop),
];

impl Token {
    /// Case-insensitive exact lookup of a single word.
    pub fn from_word(word: &str) -> Self {
        VOCABULARY
            .iter()
            .find(|(name, _)| word.eq_ignore_ascii_case(name))
            .map_or(Self::Invalid, |&(_, token)| token)
    }

    /// The channel this token names, if any.
    pub fn channel(self) -> Option<Channel> {
        match self {
            Self::Head => Some(Channel::Head),
            Self::Knee => Some(Channel::Knee),
            Self::Elevation => Some(Channel::Elevation),
            _ => None,
        }
    }

    /// The movement this token names, if any.
    pub fn movement(self) -> Option<Action> {
        match self {
            Self::Up => Some(Action::MoveUp),
            Self::Down => Some(Action::MoveDown),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// Physical actuator channel. Fixed at startup, never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    Head = 0,
    Knee = 1,
    Elevation = 2,
}

impl Channel {
    /// Number of channels. Sizes the actuator array.
    pub const COUNT: usize = 3;

    /// Every channel in index order.
    pub const ALL: [Channel; Self::COUNT] = [Self::Head, Self::Knee, Self::Elevation];

    /// Array index for this channel.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Knee => "knee",
            Self::Elevation => "elevation",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Directives
// ---------------------------------------------------------------------------

/// What a single actuator is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    Stop,
}

impl Action {
    pub const fn name(self) -> &'static str {
        match self {
            Self::MoveUp => "move up",
            Self::MoveDown => "move down",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed user intent.
///
/// Movement always targets one channel; stop always targets every channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    MoveUp(Channel),
    MoveDown(Channel),
    StopAll,
}

impl Directive {
    /// Build a movement directive from a parsed channel and verb.
    pub fn movement(channel: Channel, action: Action) -> Option<Self> {
        match action {
            Action::MoveUp => Some(Self::MoveUp(channel)),
            Action::MoveDown => Some(Self::MoveDown(channel)),
            Action::Stop => None,
        }
    }

    /// Expand into per-actuator actions, in channel order.
    pub fn fan_out(self) -> impl Iterator<Item = (Channel, Action)> {
        let (targets, action): (&'static [Channel], Action) = match self {
            Self::MoveUp(ch) => (single(ch), Action::MoveUp),
            Self::MoveDown(ch) => (single(ch), Action::MoveDown),
            Self::StopAll => (&CHANNELS[..], Action::Stop),
        };
        targets.iter().map(move |&ch| (ch, action))
    }
}

static CHANNELS: [Channel; Channel::COUNT] = Channel::ALL;

fn single(channel: Channel) -> &'static [Channel] {
    let i = channel.index();
    &CHANNELS[i..=i]
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoveUp(ch) => write!(f, "{ch} up"),
            Self::MoveDown(ch) => write!(f, "{ch} down"),
            Self::StopAll => f.write_str("stop all"),
        }
    }
}
