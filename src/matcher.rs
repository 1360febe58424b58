//! Subset-simulation matcher: epsilon-closure plus a one-character step, repeated across the
//! input. No backtracking, no exponential blowup: the active set is bounded by the number of
//! nodes in the automaton, so total work is `O(|pattern| * |input|)`.

use std::collections::HashSet;

use crate::node::{Arena, Automaton, NodeId};

/// Does `automaton` (living in `arena`) accept `input` in its entirety?
pub(crate) fn run(arena: &Arena, automaton: Automaton, input: &str) -> bool {
    let mut active = epsilon_closure(arena, std::iter::once(automaton.start));

    for c in input.chars() {
        let next: HashSet<NodeId> = active.iter().flat_map(|&n| arena.step_one(n, c)).collect();
        if next.is_empty() {
            log::trace!("matcher: no live states left, rejecting early");
            return false;
        }
        active = epsilon_closure(arena, next.into_iter());
        log::trace!("matcher: active set size {}", active.len());
    }

    active.contains(&automaton.end)
}

/// The least fixed point of `seed` under epsilon transitions, found with a worklist so every
/// node enters the result at most once regardless of how many cycles the graph has.
fn epsilon_closure(arena: &Arena, seed: impl Iterator<Item = NodeId>) -> HashSet<NodeId> {
    let mut closure = HashSet::new();
    let mut worklist = Vec::new();

    for node in seed {
        if closure.insert(node) {
            worklist.push(node);
        }
    }

    while let Some(node) = worklist.pop() {
        for neighbour in arena.epsilon_neighbours(node) {
            if closure.insert(neighbour) {
                worklist.push(neighbour);
            }
        }
    }

    closure
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_automaton_accepts_only_empty_string() {
        let mut arena = Arena::new();
        let a = arena.empty();
        assert!(run(&arena, a, ""));
        assert!(!run(&arena, a, "x"));
    }

    #[test]
    fn literal_matches_exactly_itself() {
        let mut arena = Arena::new();
        let a = arena.literal('x');
        assert!(run(&arena, a, "x"));
        assert!(!run(&arena, a, ""));
        assert!(!run(&arena, a, "xx"));
    }

    #[test]
    fn kleene_accepts_any_repeat_count() {
        let mut arena = Arena::new();
        let lit = arena.literal('a');
        let star = arena.kleene(lit);
        assert!(run(&arena, star, ""));
        assert!(run(&arena, star, "a"));
        assert!(run(&arena, star, "aaaaa"));
        assert!(!run(&arena, star, "aaab"));
    }

    #[test]
    fn choice_of_literals_matches_unshared_characters() {
        let mut arena = Arena::new();
        let a = arena.literal('a');
        let dup_a = arena.literal('a');
        let ab = arena.choice(&[a, dup_a]);
        assert!(run(&arena, ab, "a"));
        assert!(!run(&arena, ab, "aa"));
    }

    #[test]
    fn rejects_early_on_empty_active_set() {
        let mut arena = Arena::new();
        let a = arena.literal('a');
        let b = arena.literal('b');
        let ab = arena.concat(a, b);
        // "ac" should die after the first character already diverges from 'b'.
        assert!(!run(&arena, ab, "ac"));
    }

    #[test]
    fn linear_time_on_pathological_alternation() {
        // (a|a)*b against a long run of 'a' with no trailing 'b': this is the classic
        // backtracking trap for naive engines, must terminate immediately here.
        let mut arena = Arena::new();
        let a1 = arena.literal('a');
        let a2 = arena.literal('a');
        let choice = arena.choice(&[a1, a2]);
        let star = arena.kleene(choice);
        let b = arena.literal('b');
        let pattern = arena.concat(star, b);

        let input: String = std::iter::repeat('a').take(10_000).collect();
        assert!(!run(&arena, pattern, &input));
    }
}
