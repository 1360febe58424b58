//! Recursive-descent parser: turns a [`Token`] stream into an [`Automaton`] built directly in an
//! [`Arena`], one production per precedence level (§4.3 of `SPEC_FULL.md`), tightest-binding
//! last. There is no separate AST. Each production returns the automaton fragment it parsed,
//! and the grammar *is* the compiler.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::node::{Arena, Automaton};
use crate::pattern::Pattern;
use crate::token::{Token, TokenKind};

/// One token lookahead over a fixed token slice, building into a caller-owned [`Arena`].
pub(crate) struct Parser<'p> {
    tokens: Vec<Token>,
    idx: usize,
    arena: &'p mut Arena,
    variables: &'p HashMap<String, Pattern>,
}

/// Token kinds that can start an atom, used by `parse_concat` to decide whether another
/// factor follows. Includes `Caret`/`Dollar`, so an embedded anchor is parsed as an atom and
/// rejected by `parse_literal` with a precise position.
const ATOM_START: &[TokenKind] = &[
    TokenKind::Literal,
    TokenKind::Dot,
    TokenKind::OpenParen,
    TokenKind::OpenBracket,
    TokenKind::OpenBrace,
    TokenKind::Digit,
    TokenKind::Word,
    TokenKind::Whitespace,
    TokenKind::Caret,
    TokenKind::Dollar,
];

impl<'p> Parser<'p> {
    pub fn new(
        tokens: Vec<Token>,
        arena: &'p mut Arena,
        variables: &'p HashMap<String, Pattern>,
    ) -> Self {
        Parser { tokens, idx: 0, arena, variables }
    }

    /// Parse the full token stream as a single pattern body.
    pub fn parse(mut self) -> Result<Automaton> {
        log::debug!("parsing {} tokens", self.tokens.len());
        let result = self.parse_choice()?;
        if self.idx != self.tokens.len() {
            return Err(Error::TrailingTokens { position: self.tokens[self.idx].position });
        }
        Ok(result)
    }

    // -- cursor helpers --------------------------------------------------------------------

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.idx).copied()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.idx += 1;
            true
        } else {
            false
        }
    }

    fn consume_literal_char(&mut self, c: char) -> bool {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Literal && t.ch == c => {
                self.idx += 1;
                true
            }
            _ => false,
        }
    }

    fn skip_brace_whitespace(&mut self) {
        while matches!(self.peek(), Some(t) if t.kind == TokenKind::Literal && t.ch.is_whitespace())
        {
            self.idx += 1;
        }
    }

    fn consume_number(&mut self) -> u32 {
        let mut value: u32 = 0;
        while let Some(t) = self.peek() {
            if t.kind == TokenKind::Literal && t.ch.is_ascii_digit() {
                value = value.saturating_mul(10).saturating_add(t.ch.to_digit(10).unwrap());
                self.idx += 1;
            } else {
                break;
            }
        }
        value
    }

    // -- grammar, loosest-binding first -----------------------------------------------------

    /// `choice := concat ('|' concat)*`
    fn parse_choice(&mut self) -> Result<Automaton> {
        let first = self.parse_concat()?;
        let mut alternatives = vec![first];
        while self.consume(TokenKind::Pipe) {
            alternatives.push(self.parse_concat()?);
        }
        if alternatives.len() == 1 {
            Ok(alternatives.pop().unwrap())
        } else {
            Ok(self.arena.choice(&alternatives))
        }
    }

    /// `concat := clojure*` (an empty concat is `empty()`, produced by `parse_literal`'s base
    /// case falling through with no atom consumed).
    fn parse_concat(&mut self) -> Result<Automaton> {
        let mut left = self.parse_clojure()?;
        while matches!(self.peek_kind(), Some(k) if ATOM_START.contains(&k)) {
            let next = self.parse_clojure()?;
            left = self.arena.concat(left, next);
        }
        Ok(left)
    }

    /// `clojure := optional '*'?`
    fn parse_clojure(&mut self) -> Result<Automaton> {
        let left = self.parse_optional()?;
        if self.consume(TokenKind::Star) {
            Ok(self.arena.kleene(left))
        } else {
            Ok(left)
        }
    }

    /// `optional := one_or_more '?'?`
    fn parse_optional(&mut self) -> Result<Automaton> {
        let left = self.parse_one_or_more()?;
        if self.consume(TokenKind::Questionmark) {
            let empty = self.arena.empty();
            Ok(self.arena.choice(&[left, empty]))
        } else {
            Ok(left)
        }
    }

    /// `one_or_more := range '+'?`, desugared to `range . range*` via a clone.
    fn parse_one_or_more(&mut self) -> Result<Automaton> {
        let left = self.parse_range()?;
        if self.consume(TokenKind::Plus) {
            let tail = self.arena.clone_automaton(left);
            let tail = self.arena.kleene(tail);
            Ok(self.arena.concat(left, tail))
        } else {
            Ok(left)
        }
    }

    /// `range := variable ('{' digit+ (',' digit+)? '}')?`
    ///
    /// A `{` is only a range suffix if a digit immediately follows (after optional whitespace);
    /// otherwise it belongs to the *next* atom (a `{Name}` variable reference) and the cursor is
    /// rewound to before the `{`.
    fn parse_range(&mut self) -> Result<Automaton> {
        let left = self.parse_variable()?;

        let Some(brace) = self.peek() else { return Ok(left) };
        if brace.kind != TokenKind::OpenBrace {
            return Ok(left);
        }

        let save = self.idx;
        self.idx += 1;
        self.skip_brace_whitespace();
        if !matches!(self.peek(), Some(t) if t.kind == TokenKind::Literal && t.ch.is_ascii_digit())
        {
            self.idx = save;
            return Ok(left);
        }

        let min = self.consume_number();
        self.skip_brace_whitespace();
        let mut max = min;
        if self.consume_literal_char(',') {
            self.skip_brace_whitespace();
            max = self.consume_number();
            self.skip_brace_whitespace();
        }

        if !self.consume(TokenKind::CloseBrace) {
            return Err(Error::UnterminatedRepetition { position: brace.position });
        }
        if min > max {
            return Err(Error::InvalidRepetitionBound { position: brace.position, min, max });
        }

        let mut result = self.arena.empty();
        for _ in 0..min {
            let copy = self.arena.clone_automaton(left);
            result = self.arena.concat(result, copy);
        }
        for _ in 0..(max - min) {
            let copy = self.arena.clone_automaton(left);
            let empty = self.arena.empty();
            let optional = self.arena.choice(&[empty, copy]);
            result = self.arena.concat(result, optional);
        }
        Ok(result)
    }

    /// `variable := '{' letter (letter | digit | '_')* '}' | bracket`
    fn parse_variable(&mut self) -> Result<Automaton> {
        let Some(brace) = self.peek() else { return self.parse_bracket() };
        if brace.kind != TokenKind::OpenBrace {
            return self.parse_bracket();
        }

        match self.tokens.get(self.idx + 1) {
            Some(t) if t.kind == TokenKind::Literal && t.ch.is_alphabetic() => {}
            _ => return Err(Error::InvalidVariableStart { position: brace.position }),
        }
        self.idx += 1;

        let mut name = String::new();
        loop {
            let Some(t) = self.peek() else {
                return Err(Error::UnterminatedVariable { position: brace.position });
            };
            if t.kind == TokenKind::CloseBrace {
                self.idx += 1;
                break;
            }
            if t.kind == TokenKind::Literal && (t.ch.is_alphanumeric() || t.ch == '_') {
                name.push(t.ch);
                self.idx += 1;
                continue;
            }
            return Err(Error::InvalidVariableChar { position: t.position, found: t.ch });
        }

        let referenced = self
            .variables
            .get(&name)
            .ok_or_else(|| Error::UndefinedVariable { position: brace.position, name: name.clone() })?;
        Ok(self.arena.import(referenced.arena(), referenced.full_automaton()))
    }

    /// `bracket := '[' '^'? item+ ']' | whitespace`
    fn parse_bracket(&mut self) -> Result<Automaton> {
        let Some(open) = self.peek() else { return self.parse_whitespace() };
        if open.kind != TokenKind::OpenBracket {
            return self.parse_whitespace();
        }
        self.idx += 1;
        let negated = self.consume(TokenKind::Caret);

        let mut items: Vec<char> = Vec::new();
        loop {
            match self.peek() {
                Some(t) if t.kind == TokenKind::CloseBracket => {
                    self.idx += 1;
                    break;
                }
                Some(t) => {
                    items.push(t.ch);
                    self.idx += 1;
                }
                None => return Err(Error::UnterminatedClass { position: open.position }),
            }
        }

        if items.is_empty() {
            return Err(Error::EmptyClass { position: open.position });
        }

        let mut chars: HashSet<char> = HashSet::new();
        for (i, &c) in items.iter().enumerate() {
            if c == '-' && i > 0 && i + 1 < items.len() {
                let (start, end) = (items[i - 1], items[i + 1]);
                for code in (start as u32)..=(end as u32) {
                    if let Some(expanded) = char::from_u32(code) {
                        chars.insert(expanded);
                    }
                }
            } else {
                chars.insert(c);
            }
        }

        if negated {
            Ok(self.arena.negated_class(chars))
        } else {
            Ok(self.arena.class(chars))
        }
    }

    /// `whitespace := '\s' | word`
    fn parse_whitespace(&mut self) -> Result<Automaton> {
        if self.consume(TokenKind::Whitespace) {
            Ok(self.arena.class(" \t\r\n\x0c".chars()))
        } else {
            self.parse_word()
        }
    }

    /// `word := '\w' | digit`
    fn parse_word(&mut self) -> Result<Automaton> {
        if self.consume(TokenKind::Word) {
            let chars = ('a'..='z').chain('A'..='Z').chain('0'..='9').chain(std::iter::once('_'));
            Ok(self.arena.class(chars))
        } else {
            self.parse_digit()
        }
    }

    /// `digit := '\d' | group`
    fn parse_digit(&mut self) -> Result<Automaton> {
        if self.consume(TokenKind::Digit) {
            Ok(self.arena.class('0'..='9'))
        } else {
            self.parse_group()
        }
    }

    /// `group := '(' choice ')' | literal`
    fn parse_group(&mut self) -> Result<Automaton> {
        let Some(open) = self.peek() else { return self.parse_literal() };
        if open.kind != TokenKind::OpenParen {
            return self.parse_literal();
        }
        self.idx += 1;
        let inner = self.parse_choice()?;
        if !self.consume(TokenKind::CloseParen) {
            return Err(Error::UnterminatedGroup { position: open.position });
        }
        Ok(inner)
    }

    /// `literal := <any Literal token> | '.' | <nothing>`
    ///
    /// The base case of every higher production. An unrecognized lookahead (end of input, a
    /// closing delimiter, a `|`) falls through to `empty()` here.
    fn parse_literal(&mut self) -> Result<Automaton> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Dot => {
                self.idx += 1;
                Ok(self.arena.dot())
            }
            Some(t) if t.kind == TokenKind::Literal => {
                self.idx += 1;
                Ok(self.arena.literal(t.ch))
            }
            Some(t) if t.kind == TokenKind::Caret || t.kind == TokenKind::Dollar => {
                Err(Error::MisplacedAnchor { position: t.position })
            }
            _ => Ok(self.arena.empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::lex;

    fn compile(source: &str) -> Result<(Arena, Automaton)> {
        let mut arena = Arena::new();
        let vars = HashMap::new();
        let tokens = lex(source).unwrap();
        let automaton = Parser::new(tokens, &mut arena, &vars).parse()?;
        Ok((arena, automaton))
    }

    #[test]
    fn literal_concat_compiles() {
        let (arena, a) = compile("abc").unwrap();
        assert!(crate::matcher::run(&arena, a, "abc"));
        assert!(!crate::matcher::run(&arena, a, "ab"));
    }

    #[test]
    fn alternation_and_star_compile() {
        let (arena, a) = compile("(a|b)*c").unwrap();
        assert!(crate::matcher::run(&arena, a, "ababc"));
        assert!(crate::matcher::run(&arena, a, "c"));
        assert!(!crate::matcher::run(&arena, a, "abc d"));
    }

    #[test]
    fn optional_and_plus_compile() {
        let (arena, a) = compile("ab?c+").unwrap();
        assert!(crate::matcher::run(&arena, a, "ac"));
        assert!(crate::matcher::run(&arena, a, "abc"));
        assert!(crate::matcher::run(&arena, a, "abccc"));
        assert!(!crate::matcher::run(&arena, a, "ab"));
    }

    #[test]
    fn exact_repetition_range() {
        let (arena, a) = compile("a{3}").unwrap();
        assert!(crate::matcher::run(&arena, a, "aaa"));
        assert!(!crate::matcher::run(&arena, a, "aa"));
        assert!(!crate::matcher::run(&arena, a, "aaaa"));
    }

    #[test]
    fn bounded_repetition_range_tolerates_whitespace() {
        let (arena, a) = compile("a{1, 3}").unwrap();
        assert!(crate::matcher::run(&arena, a, "a"));
        assert!(crate::matcher::run(&arena, a, "aaa"));
        assert!(!crate::matcher::run(&arena, a, ""));
        assert!(!crate::matcher::run(&arena, a, "aaaa"));
    }

    #[test]
    fn invalid_repetition_bound_is_rejected() {
        let err = compile("a{5,2}").unwrap_err();
        assert_eq!(err, Error::InvalidRepetitionBound { position: 1, min: 5, max: 2 });
    }

    #[test]
    fn bracket_class_with_range_and_negation() {
        let (arena, digits) = compile("[0-9]+").unwrap();
        assert!(crate::matcher::run(&arena, digits, "42"));
        assert!(!crate::matcher::run(&arena, digits, "4a"));

        let (arena, not_digits) = compile("[^0-9]+").unwrap();
        assert!(crate::matcher::run(&arena, not_digits, "abc"));
        assert!(!crate::matcher::run(&arena, not_digits, "a1"));
    }

    #[test]
    fn empty_bracket_class_is_an_error() {
        let err = compile("[]").unwrap_err();
        assert_eq!(err, Error::EmptyClass { position: 0 });
    }

    #[test]
    fn shorthand_classes_compile() {
        let (arena, a) = compile(r"\d+\w*\s?").unwrap();
        assert!(crate::matcher::run(&arena, a, "42abc "));
        assert!(crate::matcher::run(&arena, a, "0"));
    }

    #[test]
    fn variable_reference_substitutes_full_automaton() {
        let greeting = Pattern::new("hi|hello").unwrap();
        let mut vars = HashMap::new();
        vars.insert("greeting".to_string(), greeting);

        let mut arena = Arena::new();
        let tokens = lex("{greeting} there").unwrap();
        let automaton = Parser::new(tokens, &mut arena, &vars).parse().unwrap();
        assert!(crate::matcher::run(&arena, automaton, "hi there"));
        assert!(crate::matcher::run(&arena, automaton, "hello there"));
        assert!(!crate::matcher::run(&arena, automaton, "hey there"));
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let mut arena = Arena::new();
        let vars = HashMap::new();
        let tokens = lex("{missing}").unwrap();
        let err = Parser::new(tokens, &mut arena, &vars).parse().unwrap_err();
        assert_eq!(err, Error::UndefinedVariable { position: 0, name: "missing".to_string() });
    }

    #[test]
    fn variable_name_must_start_with_a_letter() {
        let err = compile("{3}").unwrap_err();
        assert_eq!(err, Error::InvalidVariableStart { position: 0 });
    }

    #[test]
    fn stray_closing_paren_is_a_trailing_tokens_error() {
        let err = compile("a)").unwrap_err();
        assert_eq!(err, Error::TrailingTokens { position: 1 });
    }

    #[test]
    fn embedded_anchor_is_rejected_wherever_it_appears() {
        assert_eq!(compile("a^b").unwrap_err(), Error::MisplacedAnchor { position: 1 });
        assert_eq!(compile("a$b").unwrap_err(), Error::MisplacedAnchor { position: 1 });
    }

    #[test]
    fn empty_alternative_compiles_to_empty() {
        let (arena, a) = compile("a|").unwrap();
        assert!(crate::matcher::run(&arena, a, "a"));
        assert!(crate::matcher::run(&arena, a, ""));
    }
}
