//! [`Pattern`]: the compiled, immutable, `Send + Sync` façade over a lexed-and-parsed automaton
//! pair (§4.5, §5 of `SPEC_FULL.md`).
//!
//! A `Pattern` holds two genuinely independent compiles of the same source: one for
//! [`Pattern::full_match`], one for [`Pattern::partial_match`], rather than one automaton
//! reused for both. Anchors (`^`, `$`) are stripped from the token stream once and control which
//! end, if any, gets a synthetic `.*` wrapper on the partial compile.

use std::collections::HashMap;

use crate::error::Result;
use crate::matcher;
use crate::node::{Arena, Automaton};
use crate::parser::Parser;
use crate::token::{lex, Token, TokenKind};

/// A compiled pattern, ready to test input strings against.
///
/// Building a `Pattern` is the only fallible operation in this crate: once constructed, matching
/// always terminates and always returns a plain `bool` (§2, §8 of `SPEC_FULL.md`). The underlying
/// arenas are plain owned `Vec`s with no interior mutability, so a `Pattern` is `Send + Sync` and
/// may be shared across threads and matched concurrently.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    full_arena: Arena,
    full: Automaton,
    partial_arena: Arena,
    partial: Automaton,
}

impl Pattern {
    /// Compile `source` with no named variables available.
    pub fn new(source: &str) -> Result<Pattern> {
        Pattern::with_variables(source, &HashMap::new())
    }

    /// Compile `source`, resolving any `{Name}` reference against `variables`.
    ///
    /// Each referenced pattern's automaton is deep-copied into the new pattern's arena (see
    /// [`Arena::import`]). The two patterns never share nodes afterwards.
    pub fn with_variables(source: &str, variables: &HashMap<String, Pattern>) -> Result<Pattern> {
        let tokens = lex(source)?;
        let (anchored_start, anchored_end, body) = strip_anchors(tokens);

        let mut full_arena = Arena::new();
        let full = Parser::new(body.clone(), &mut full_arena, variables).parse()?;

        let partial_tokens = wrap_for_partial_match(body, anchored_start, anchored_end);
        let mut partial_arena = Arena::new();
        let partial = Parser::new(partial_tokens, &mut partial_arena, variables).parse()?;

        Ok(Pattern { source: source.to_string(), full_arena, full, partial_arena, partial })
    }

    /// Does the pattern match `text` in its entirety?
    pub fn full_match(&self, text: &str) -> bool {
        matcher::run(&self.full_arena, self.full, text)
    }

    /// Does the pattern match somewhere within `text` (any prefix/suffix of unanchored ends is
    /// free)?
    pub fn partial_match(&self, text: &str) -> bool {
        matcher::run(&self.partial_arena, self.partial, text)
    }

    /// The original source this pattern was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Crate-internal: the arena backing this pattern's full-match automaton, exposed so another
    /// pattern's parser can import it for `{Name}` substitution.
    pub(crate) fn arena(&self) -> &Arena {
        &self.full_arena
    }

    /// Crate-internal: the full-match automaton itself, paired with [`Pattern::arena`].
    pub(crate) fn full_automaton(&self) -> Automaton {
        self.full
    }

    /// Crate-internal: the arena backing this pattern's partial-match automaton.
    pub(crate) fn partial_arena(&self) -> &Arena {
        &self.partial_arena
    }

    /// Crate-internal: the partial-match automaton itself, paired with [`Pattern::partial_arena`].
    pub(crate) fn partial_automaton(&self) -> Automaton {
        self.partial
    }
}

/// Strip a leading `^` and/or trailing `$` from `tokens`, reporting which were present.
fn strip_anchors(mut tokens: Vec<Token>) -> (bool, bool, Vec<Token>) {
    let anchored_start = matches!(tokens.first(), Some(t) if t.kind == TokenKind::Caret);
    if anchored_start {
        tokens.remove(0);
    }
    let anchored_end = matches!(tokens.last(), Some(t) if t.kind == TokenKind::Dollar);
    if anchored_end {
        tokens.pop();
    }
    (anchored_start, anchored_end, tokens)
}

/// Build the token stream for the partial-match compile: `body` wrapped in a synthetic `.*` on
/// whichever end was not pinned by an anchor. The synthetic tokens carry `position: usize::MAX`
/// since they never correspond to a byte in the original source and can never be the subject of
/// an error.
fn wrap_for_partial_match(body: Vec<Token>, anchored_start: bool, anchored_end: bool) -> Vec<Token> {
    let wildcard_star = || {
        vec![
            Token { kind: TokenKind::Dot, ch: '.', position: usize::MAX },
            Token { kind: TokenKind::Star, ch: '*', position: usize::MAX },
        ]
    };

    let mut tokens = Vec::new();
    if !anchored_start {
        tokens.extend(wildcard_star());
    }
    tokens.extend(body);
    if !anchored_end {
        tokens.extend(wildcard_star());
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_match_requires_the_whole_string() {
        let p = Pattern::new("ab+c").unwrap();
        assert!(p.full_match("abc"));
        assert!(p.full_match("abbbc"));
        assert!(!p.full_match("xabc"));
        assert!(!p.full_match("abcx"));
    }

    #[test]
    fn partial_match_allows_surrounding_text() {
        let p = Pattern::new("ab+c").unwrap();
        assert!(p.partial_match("xxabcxx"));
        assert!(p.partial_match("abc"));
        assert!(!p.partial_match("xyz"));
    }

    #[test]
    fn leading_anchor_pins_only_the_start() {
        let p = Pattern::new("^ab").unwrap();
        assert!(p.partial_match("abxyz"));
        assert!(!p.partial_match("xyzab"));
    }

    #[test]
    fn trailing_anchor_pins_only_the_end() {
        let p = Pattern::new("ab$").unwrap();
        assert!(p.partial_match("xyzab"));
        assert!(!p.partial_match("abxyz"));
    }

    #[test]
    fn both_anchors_make_partial_match_equal_full_match() {
        let p = Pattern::new("^ab$").unwrap();
        assert!(p.partial_match("ab"));
        assert!(!p.partial_match("xab"));
        assert!(!p.partial_match("abx"));
    }

    #[test]
    fn source_is_preserved_verbatim() {
        let p = Pattern::new(r"a\d+").unwrap();
        assert_eq!(p.source(), r"a\d+");
    }

    #[test]
    fn variables_compose_across_patterns() {
        let digit_run = Pattern::new(r"\d+").unwrap();
        let mut variables = HashMap::new();
        variables.insert("n".to_string(), digit_run);

        let p = Pattern::with_variables("id-{n}", &variables).unwrap();
        assert!(p.full_match("id-42"));
        assert!(!p.full_match("id-"));
    }
}
