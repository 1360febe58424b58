//! Compile-time error type for pattern parsing.
//!
//! Matching itself never fails: a compiled [`crate::Pattern`] answers `full_match`/
//! `partial_match` with a plain `bool`. Every possible failure happens while building that
//! `Pattern`, so there is a single error enum instead of separate lex/parse error types.

use thiserror::Error;

/// Everything that can go wrong while compiling a pattern.
///
/// Every variant carries the byte position in the source pattern where the problem was
/// detected, so callers can point a user at the offending character.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The pattern ends with an unescaped `\`.
    #[error("pattern ends with a trailing backslash at position {position}")]
    TrailingBackslash {
        /// Byte position of the trailing backslash.
        position: usize,
    },

    /// A `(` was never closed.
    #[error("unterminated group starting at position {position}")]
    UnterminatedGroup {
        /// Position of the opening `(`.
        position: usize,
    },

    /// A `[` was never closed.
    #[error("unterminated character class starting at position {position}")]
    UnterminatedClass {
        /// Position of the opening `[`.
        position: usize,
    },

    /// A `{` was opened for a variable reference but never closed with `}`.
    #[error("unterminated variable reference starting at position {position}")]
    UnterminatedVariable {
        /// Position of the opening `{`.
        position: usize,
    },

    /// A `{m` or `{m,n` repetition was never closed with `}`.
    #[error("unterminated repetition starting at position {position}")]
    UnterminatedRepetition {
        /// Position of the opening `{`.
        position: usize,
    },

    /// `[]` with no members.
    #[error("empty character class at position {position}")]
    EmptyClass {
        /// Position of the opening `[`.
        position: usize,
    },

    /// `{m,n}` with `m > n`.
    #[error("invalid repetition bound at position {position}: {min} is greater than {max}")]
    InvalidRepetitionBound {
        /// Position of the opening `{`.
        position: usize,
        /// The lower bound.
        min: u32,
        /// The upper bound.
        max: u32,
    },

    /// `{name}` where `name` starts with something other than a letter.
    #[error("variable names must start with a letter, at position {position}")]
    InvalidVariableStart {
        /// Position of the offending character.
        position: usize,
    },

    /// `{name}` where `name` contains a character other than letters, digits, or `_`.
    #[error("invalid character {found:?} in variable name at position {position}")]
    InvalidVariableChar {
        /// Position of the offending character.
        position: usize,
        /// The offending character.
        found: char,
    },

    /// `{name}` where `name` is not present in the supplied variable environment.
    #[error("undefined variable {name:?} referenced at position {position}")]
    UndefinedVariable {
        /// Position of the opening `{`.
        position: usize,
        /// The referenced name.
        name: String,
    },

    /// `^` or `$` appearing somewhere other than the very start/end of the pattern.
    #[error("anchor at position {position} is only allowed at the start or end of the pattern")]
    MisplacedAnchor {
        /// Position of the anchor token.
        position: usize,
    },

    /// The parser stopped before consuming every token (e.g. a stray `)`).
    #[error("unexpected token at position {position}: could not parse the remainder of the pattern")]
    TrailingTokens {
        /// Position of the first unconsumed token.
        position: usize,
    },
}

/// Convenience alias for fallible compilation results.
pub type Result<T> = std::result::Result<T, Error>;
