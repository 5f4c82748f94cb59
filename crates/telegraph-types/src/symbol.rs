//! The two-symbol alphabet that sequences are built from.

use serde::{Deserialize, Serialize};

/// A single unit within an encoded sequence: a dot or a dash.
///
/// Symbols are produced transiently by the encoder and carried on spawn
/// events so the placement system can pick the matching candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// A short signal, rendered as `.`.
    Dot,
    /// A long signal, rendered as `-`.
    Dash,
}

impl Symbol {
    /// Return the wire character for this symbol (`.` or `-`).
    pub const fn as_char(self) -> char {
        match self {
            Self::Dot => '.',
            Self::Dash => '-',
        }
    }

    /// Parse a wire character into a symbol, if it is one.
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Self::Dot),
            '-' => Some(Self::Dash),
            _ => None,
        }
    }
}

impl core::fmt::Display for Symbol {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
