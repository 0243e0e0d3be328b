//! core-keymap: stroke-sequence binding resolution.
//!
//! Design principles:
//! - Pure and deterministic: resolution depends only on the trie and the
//!   stroke buffer handed in; no hidden session state.
//! - Bindings compiled into a compressed trie for cache locality.
//! - Ambiguity surfaced in the result type: a strict prefix of one or more
//!   bindings yields [`Lookup::Partial`]; a complete match that a longer
//!   binding could still extend is reported with `extensible = true` so the
//!   caller decides whether to fire now or keep buffering.
//! - No side effects: logging only at TRACE for traversal steps.
//!
//! The payload is generic. Veneer binds stroke sequences to command trait
//! objects, but the trie neither executes nor clones them; `resolve` hands
//! back a borrow.

use core_keys::KeyStroke;
use smallvec::SmallVec;
use tracing::trace;

/// An ordered stroke sequence bound to a payload.
#[derive(Debug, Clone)]
pub struct Binding<T> {
    pub sequence: Vec<KeyStroke>,
    pub value: T,
}

impl<T> Binding<T> {
    pub fn new(sequence: Vec<KeyStroke>, value: T) -> Self {
        Self { sequence, value }
    }

    /// Single-stroke binding, the common case for insert-mode chords.
    pub fn single(stroke: KeyStroke, value: T) -> Self {
        Self {
            sequence: vec![stroke],
            value,
        }
    }
}

#[derive(Debug, Clone)]
struct Edge {
    stroke: KeyStroke,
    next: usize,
}

#[derive(Debug, Clone)]
struct Node {
    terminal: Option<usize>, // index into bindings vec
    edges: SmallVec<[Edge; 4]>,
}

impl Node {
    fn new() -> Self {
        Self {
            terminal: None,
            edges: SmallVec::new(),
        }
    }
}

/// Longest-match resolution result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    /// No binding starts with the supplied strokes.
    NoMatch,
    /// The strokes form a strict prefix of at least one binding; feeding more
    /// strokes may still complete a match. Also returned for an empty buffer.
    Partial,
    /// The longest recognized binding. `consumed` counts strokes from the
    /// front of the buffer; `extensible` is true when the entire buffer was
    /// walked and a longer binding could still match from here.
    Bound {
        consumed: usize,
        value: &'a T,
        extensible: bool,
    },
}

/// Prefix tree over stroke sequences. Empty-sequence bindings are ignored at
/// build time (the root carries no terminal).
#[derive(Debug)]
pub struct KeyStrokeTrie<T> {
    nodes: Vec<Node>,
    bindings: Vec<Binding<T>>,
}

impl<T> KeyStrokeTrie<T> {
    /// Compile bindings into a trie. On an exact-sequence conflict the later
    /// binding overrides the earlier one (trace-logged), which is what lets
    /// host-supplied bindings shadow stock ones.
    pub fn build(bindings: Vec<Binding<T>>) -> Self {
        let mut trie = KeyStrokeTrie {
            nodes: vec![Node::new()],
            bindings,
        };
        for (idx, b) in trie.bindings.iter().enumerate() {
            if b.sequence.is_empty() {
                trace!(target: "input.map", binding_index = idx, "empty_sequence_skipped");
                continue;
            }
            let mut cur = 0usize;
            for stroke in &b.sequence {
                // find or create edge
                let next = if let Some(e) =
                    trie.nodes[cur].edges.iter().find(|e| e.stroke == *stroke)
                {
                    e.next
                } else {
                    let new_idx = trie.nodes.len();
                    trie.nodes.push(Node::new());
                    trie.nodes[cur].edges.push(Edge {
                        stroke: *stroke,
                        next: new_idx,
                    });
                    new_idx
                };
                cur = next;
            }
            if trie.nodes[cur].terminal.is_some() {
                trace!(
                    target: "input.map",
                    binding_index = idx,
                    node = cur,
                    "terminal_override"
                );
            }
            trie.nodes[cur].terminal = Some(idx);
        }
        trie
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].terminal.is_none()
    }

    /// Walk the buffer from the root, remembering the last terminal passed.
    pub fn resolve(&self, buffer: &[KeyStroke]) -> Lookup<'_, T> {
        let mut node_idx = 0usize;
        let mut walked = 0usize;
        let mut last_terminal: Option<(usize, usize)> = None; // (consumed, binding index)
        for (i, stroke) in buffer.iter().enumerate() {
            let mut advanced = false;
            for edge in &self.nodes[node_idx].edges {
                if edge.stroke == *stroke {
                    node_idx = edge.next;
                    trace!(target: "input.map", step = i, stroke = %stroke, node = node_idx, "advance");
                    if let Some(bi) = self.nodes[node_idx].terminal {
                        last_terminal = Some((i + 1, bi));
                    }
                    advanced = true;
                    break;
                }
            }
            if !advanced {
                break;
            }
            walked = i + 1;
        }
        if let Some((consumed, bi)) = last_terminal {
            Lookup::Bound {
                consumed,
                value: &self.bindings[bi].value,
                // Extension is only on the table while the whole buffer sits
                // on a node with outgoing edges; a stalled walk cannot grow.
                extensible: walked == buffer.len() && !self.nodes[node_idx].edges.is_empty(),
            }
        } else if walked == buffer.len() && walked > 0 {
            Lookup::Partial
        } else if buffer.is_empty() {
            Lookup::Partial
        } else {
            Lookup::NoMatch
        }
    }
}
