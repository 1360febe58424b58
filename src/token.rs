//! Lexer: turns a pattern string into a flat sequence of [`Token`]s.
//!
//! The lexer is context-free. It never looks at what the parser is doing. Bracket expressions
//! are re-interpreted as raw character data by the *parser*, not by a lexer mode switch; see
//! `parser::Parser::parse_bracket`.

use crate::error::{Error, Result};

/// The closed set of token kinds this dialect recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Literal,
    Dot,
    Star,
    Plus,
    Questionmark,
    Pipe,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Caret,
    Dollar,
    Digit,
    Word,
    Whitespace,
}

/// A single lexed token.
///
/// `ch` holds the literal source character that produced this token regardless of `kind`. The
/// grammar only treats `Literal`-kind tokens as carrying a meaningful payload, but the bracket
/// production needs the raw character behind every token kind (so that e.g. `[a*bc]` sees `*`
/// as the character `*`, not as a `Star` token). `position` is the byte offset of that character
/// in the original pattern, used only for error messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub ch: char,
    pub position: usize,
}

/// Lex `pattern` into a flat token sequence.
///
/// Fails only on a trailing unescaped backslash; every other character, escaped or not, maps to
/// some token.
pub(crate) fn lex(pattern: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        let (kind, ch) = match c {
            '(' => (TokenKind::OpenParen, c),
            ')' => (TokenKind::CloseParen, c),
            '{' => (TokenKind::OpenBrace, c),
            '}' => (TokenKind::CloseBrace, c),
            '[' => (TokenKind::OpenBracket, c),
            ']' => (TokenKind::CloseBracket, c),
            '.' => (TokenKind::Dot, c),
            '*' => (TokenKind::Star, c),
            '+' => (TokenKind::Plus, c),
            '?' => (TokenKind::Questionmark, c),
            '|' => (TokenKind::Pipe, c),
            '^' => (TokenKind::Caret, c),
            '$' => (TokenKind::Dollar, c),
            '\\' => match chars.next() {
                None => return Err(Error::TrailingBackslash { position }),
                Some((_, 'd')) => (TokenKind::Digit, 'd'),
                Some((_, 'w')) => (TokenKind::Word, 'w'),
                Some((_, 's')) => (TokenKind::Whitespace, 's'),
                Some((_, escaped)) => (TokenKind::Literal, escaped),
            },
            _ => (TokenKind::Literal, c),
        };

        log::trace!("lexed {:?} {:?} at {}", kind, ch, position);
        tokens.push(Token { kind, ch, position });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_literals() {
        assert_eq!(kinds("abc"), vec![TokenKind::Literal; 3]);
    }

    #[test]
    fn lexes_metacharacters() {
        assert_eq!(
            kinds("a.b*c+d?e|f"),
            vec![
                TokenKind::Literal,
                TokenKind::Dot,
                TokenKind::Literal,
                TokenKind::Star,
                TokenKind::Literal,
                TokenKind::Plus,
                TokenKind::Literal,
                TokenKind::Questionmark,
                TokenKind::Literal,
                TokenKind::Pipe,
                TokenKind::Literal,
            ]
        );
    }

    #[test]
    fn lexes_shorthand_classes() {
        assert_eq!(
            kinds(r"\d\w\s"),
            vec![TokenKind::Digit, TokenKind::Word, TokenKind::Whitespace]
        );
    }

    #[test]
    fn uppercase_shorthand_escapes_are_literal() {
        // Source lexer quirk, kept intentionally: \D \W \S are literal D/W/S.
        let tokens = lex(r"\D\W\S").unwrap();
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Literal));
        assert_eq!(tokens.iter().map(|t| t.ch).collect::<Vec<_>>(), vec!['D', 'W', 'S']);
    }

    #[test]
    fn escaped_backslash_is_a_literal_backslash() {
        let tokens = lex(r"\\").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Literal);
        assert_eq!(tokens[0].ch, '\\');
    }

    #[test]
    fn trailing_backslash_is_an_error() {
        let err = lex("a\\").unwrap_err();
        assert_eq!(err, Error::TrailingBackslash { position: 1 });
    }

    #[test]
    fn positions_are_byte_offsets() {
        let tokens = lex("ab").unwrap();
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[1].position, 1);
    }
}
