//! The NFA primitive: a node arena plus the five automaton combinators.
//!
//! Nodes never move once allocated and are never mutated except by the combinators operating on
//! the fragment that currently owns them (§3, §4.2 of `SPEC_FULL.md`). A node's identity is its
//! [`NodeId`]. Content equality is never consulted, only id equality, which is exactly what
//! epsilon-closure correctness depends on.

use std::collections::{HashMap, HashSet, VecDeque};

/// A stable handle to a node within some [`Arena`].
///
/// Two `NodeId`s compare equal iff they name the same vertex; nothing about a node's edges
/// participates in equality or hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    /// The node's position in its arena, exposed only for `dot`-file rendering.
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// The outgoing edges of one node.
#[derive(Debug, Clone, Default)]
struct NodeData {
    /// Labeled transitions. A character may map to more than one successor (alternation can
    /// produce that), so the value is a set, never a single `NodeId`.
    transitions: HashMap<char, HashSet<NodeId>>,

    /// Epsilon (no-input) neighbours.
    epsilons: HashSet<NodeId>,

    /// Negative-class edges: traversable by any character not in the paired exclusion set.
    /// `.` is the special case of an empty exclusion set. Kept as an ordered `Vec` per the data
    /// model, even though traversal treats it as a union and so is itself order-independent.
    negative: Vec<(HashSet<char>, NodeId)>,
}

/// An NFA fragment: a single entry and single exit node.
///
/// An `Automaton` is a lightweight pair of ids into some `Arena`; it owns nothing by itself; the
/// `Arena` that allocated its nodes is the actual owner.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Automaton {
    pub start: NodeId,
    pub end: NodeId,
}

/// The node storage backing every automaton built for a single compiled pattern.
///
/// There is no tracing GC and no reference counting: the arena is a plain `Vec`, dropped en
/// bloc with the `Pattern` that owns it. Cyclic graphs (Kleene back-edges) are unremarkable here
/// because nothing is reference-counted in the first place.
#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    nodes: Vec<NodeData>,
}

impl Arena {
    pub fn new() -> Self {
        Arena { nodes: Vec::new() }
    }

    pub fn new_node(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::default());
        id
    }

    pub fn connect_epsilon(&mut self, from: NodeId, to: NodeId) {
        self.nodes[from.0].epsilons.insert(to);
    }

    pub fn connect_literal(&mut self, from: NodeId, ch: char, to: NodeId) {
        self.nodes[from.0].transitions.entry(ch).or_default().insert(to);
    }

    pub fn connect_negative(&mut self, from: NodeId, excluded: HashSet<char>, to: NodeId) {
        self.nodes[from.0].negative.push((excluded, to));
    }

    /// All nodes directly reachable from `from` on input `c`: the direct labeled transitions
    /// plus every negative-class edge whose exclusion set doesn't contain `c`.
    pub fn step_one(&self, from: NodeId, c: char) -> impl Iterator<Item = NodeId> + '_ {
        let data = &self.nodes[from.0];
        let direct = data.transitions.get(&c).into_iter().flatten().copied();
        let negative = data
            .negative
            .iter()
            .filter(move |(excluded, _)| !excluded.contains(&c))
            .map(|(_, target)| *target);
        direct.chain(negative)
    }

    pub fn epsilon_neighbours(&self, from: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[from.0].epsilons.iter().copied()
    }

    /// Every node currently allocated, for rendering or introspection.
    pub(crate) fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Every labeled edge as `(from, char, to)`, for `dot`-file rendering.
    pub(crate) fn labeled_edges(&self) -> impl Iterator<Item = (NodeId, char, NodeId)> + '_ {
        self.nodes.iter().enumerate().flat_map(|(i, data)| {
            data.transitions.iter().flat_map(move |(&c, targets)| {
                targets.iter().map(move |&to| (NodeId(i), c, to))
            })
        })
    }

    /// Every epsilon edge as `(from, to)`, for `dot`-file rendering.
    pub(crate) fn epsilon_edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(i, data)| data.epsilons.iter().map(move |&to| (NodeId(i), to)))
    }

    /// Every negative-class edge as `(from, excluded, to)`, for `dot`-file rendering.
    pub(crate) fn negative_edges(
        &self,
    ) -> impl Iterator<Item = (NodeId, &HashSet<char>, NodeId)> + '_ {
        self.nodes.iter().enumerate().flat_map(|(i, data)| {
            data.negative.iter().map(move |(excluded, to)| (NodeId(i), excluded, *to))
        })
    }

    // -- combinators ---------------------------------------------------------------------

    /// Accepts only the empty string.
    pub fn empty(&mut self) -> Automaton {
        let n = self.new_node();
        Automaton { start: n, end: n }
    }

    /// Accepts exactly the one-character string `c`.
    pub fn literal(&mut self, c: char) -> Automaton {
        let start = self.new_node();
        let end = self.new_node();
        self.connect_literal(start, c, end);
        Automaton { start, end }
    }

    /// Accepts any single character (the negative-class edge with an empty exclusion set).
    pub fn dot(&mut self) -> Automaton {
        let start = self.new_node();
        let end = self.new_node();
        self.connect_negative(start, HashSet::new(), end);
        Automaton { start, end }
    }

    /// A single labeled edge guarded by "not in `excluded`", the general form behind both `.`
    /// and `[^...]`.
    pub fn negated_class(&mut self, excluded: HashSet<char>) -> Automaton {
        let start = self.new_node();
        let end = self.new_node();
        self.connect_negative(start, excluded, end);
        Automaton { start, end }
    }

    /// A single node pair with one labeled edge per character in `chars`, the positive
    /// character-class shape shared by `[abc]`, `\d`, `\w`, and `\s`.
    pub fn class(&mut self, chars: impl IntoIterator<Item = char>) -> Automaton {
        let start = self.new_node();
        let end = self.new_node();
        for c in chars {
            self.connect_literal(start, c, end);
        }
        Automaton { start, end }
    }

    /// `a` followed by `b`. Mutates `a.end`; `a` must not be reused afterwards unless it was
    /// cloned first.
    pub fn concat(&mut self, a: Automaton, b: Automaton) -> Automaton {
        self.connect_epsilon(a.end, b.start);
        Automaton { start: a.start, end: b.end }
    }

    /// Union of every automaton in `alternatives`, via fresh start/end nodes so each alternative
    /// stays a self-contained fragment.
    pub fn choice(&mut self, alternatives: &[Automaton]) -> Automaton {
        let start = self.new_node();
        let end = self.new_node();
        for alt in alternatives {
            self.connect_epsilon(start, alt.start);
            self.connect_epsilon(alt.end, end);
        }
        Automaton { start, end }
    }

    /// Zero-or-more repetitions of `a`, in place.
    pub fn kleene(&mut self, a: Automaton) -> Automaton {
        self.connect_epsilon(a.end, a.start);
        self.connect_epsilon(a.start, a.end);
        a
    }

    /// Deep-clone `automaton` within this same arena: a fresh node per reachable original node,
    /// with every labeled, epsilon, and negative-class edge rewired into the copy.
    pub fn clone_automaton(&mut self, automaton: Automaton) -> Automaton {
        let snapshot = self.nodes.clone();
        Self::copy_into(self, &snapshot, automaton)
    }

    /// Deep-clone `automaton`, which lives in `source`, into `self`. This is how `{Name}`
    /// variable substitution pulls a previously compiled pattern's automaton into the
    /// referencing pattern's arena without ever sharing nodes between the two.
    pub fn import(&mut self, source: &Arena, automaton: Automaton) -> Automaton {
        Self::copy_into(self, &source.nodes, automaton)
    }

    fn copy_into(dest: &mut Arena, source: &[NodeData], automaton: Automaton) -> Automaton {
        let mut mapping: HashMap<NodeId, NodeId> = HashMap::new();
        let mut worklist: VecDeque<NodeId> = VecDeque::new();

        let new_start = dest.new_node();
        mapping.insert(automaton.start, new_start);
        worklist.push_back(automaton.start);

        while let Some(old_id) = worklist.pop_front() {
            let new_id = mapping[&old_id];
            let data = &source[old_id.0];

            for (&c, targets) in &data.transitions {
                for &target in targets {
                    let new_target = *mapping.entry(target).or_insert_with(|| {
                        worklist.push_back(target);
                        dest.new_node()
                    });
                    dest.connect_literal(new_id, c, new_target);
                }
            }

            for &target in &data.epsilons {
                let new_target = *mapping.entry(target).or_insert_with(|| {
                    worklist.push_back(target);
                    dest.new_node()
                });
                dest.connect_epsilon(new_id, new_target);
            }

            for (excluded, target) in &data.negative {
                let new_target = *mapping.entry(*target).or_insert_with(|| {
                    worklist.push_back(*target);
                    dest.new_node()
                });
                dest.connect_negative(new_id, excluded.clone(), new_target);
            }
        }

        let new_end = mapping[&automaton.end];
        Automaton { start: new_start, end: new_end }
    }
}
