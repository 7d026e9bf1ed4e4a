//! The tree graph, the active-point table, unresolved leaves, and the
//! symbol-at-a-time Ukkonen driver that keeps all three consistent across
//! any number of concurrently-growing sequences.
//!
//! This module plays the role of the teacher's `SuffixTree` +
//! `SuffixTreeBuilder` combined: one type owns the node/edge arenas *and*
//! drives construction, because here construction never finishes — there
//! is no separate "build, then query" phase to split into two types.
//! Grounded on `examples/original_source/TreeBuilder.py`
//! (`OnlineGeneralizedSuffixTree`), which this module follows method for
//! method; see `DESIGN.md` for the handful of points where this
//! implementation departs from that source in favor of `spec.md`'s prose.

use crate::alphabet::Symbol;
use crate::error::QueryError;
use crate::sequence::{EdgeEnd, SequenceId, SequenceStore};
use log::trace;
use smallvec::SmallVec;
use std::collections::HashMap;

type NodeId = usize;
type EdgeId = usize;
type LeafId = usize;

const ROOT: NodeId = 0;

/// An edge rarely has more than one unresolved leaf parked on it at once
/// (the "online" half of this tree creates them, but `solve_unresolved_leaves`
/// drains them again on the very next extension of their owning sequence),
/// so this stays on the stack for the common case instead of allocating.
type LeafQueue = SmallVec<[LeafId; 2]>;

struct Edge {
    from: NodeId,
    to: NodeId,
    seq_id: SequenceId,
    start: usize,
    end: EdgeEnd,
    unresolved_leaves: LeafQueue,
}

impl Edge {
    fn length<Sym: Symbol>(&self, sequences: &SequenceStore<Sym>) -> usize {
        sequences.edge_length(&self.seq_id, self.start, self.end)
    }
}

struct Node<Sym> {
    depth: usize,
    incoming_edge: Option<EdgeId>,
    suffix_link: Option<NodeId>,
    children: HashMap<Sym, EdgeId>,
    starting_positions: HashMap<SequenceId, Vec<usize>>,
}

impl<Sym: Symbol> Node<Sym> {
    fn new(depth: usize) -> Self {
        Node {
            depth,
            incoming_edge: None,
            suffix_link: None,
            children: HashMap::new(),
            starting_positions: HashMap::new(),
        }
    }

    fn add_starting_position(&mut self, seq_id: &str, position: usize) {
        self.starting_positions.entry(seq_id.to_owned()).or_insert_with(Vec::new).push(position);
    }

    fn occurrence_count(&self) -> usize {
        self.starting_positions.values().map(Vec::len).sum()
    }
}

/// `(node, outgoing edge or none, length along edge, scan cursor, remainder)`
/// for one indexed sequence. Every field here is `Copy`; the per-sequence
/// unresolved-leaf queue lives separately in [`SuffixTree::unresolved_leaves`]
/// so that draining it doesn't require holding a live borrow of this table
/// across the recursive drive in [`SuffixTree::insert_suffix`].
#[derive(Debug, Clone, Copy)]
struct ActivePoint {
    node: NodeId,
    edge: Option<EdgeId>,
    length: usize,
    current_point: usize,
    remainder: usize,
}

impl ActivePoint {
    fn at_root() -> Self {
        ActivePoint { node: ROOT, edge: None, length: 0, current_point: 0, remainder: 0 }
    }
}

#[derive(Debug, Clone)]
struct UnresolvedLeaf {
    edge: EdgeId,
    length: usize,
    current_point: usize,
    sequence: SequenceId,
}

/// Result of [`SuffixTree::contains`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Occurrences {
    pub present: bool,
    pub positions: HashMap<SequenceId, Vec<usize>>,
}

/// One entry of [`SuffixTree::patterns_with_count_at_least`] /
/// [`SuffixTree::patterns_with_length_and_count_at_least`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternOccurrence<Sym> {
    pub pattern: Vec<Sym>,
    pub occurrences: usize,
    pub positions: HashMap<SequenceId, Vec<usize>>,
}

/// The read-only view [`SuffixTree::debug_walk`] hands its visitor for
/// every edge, in the order the recursive descent visits them.
#[derive(Debug)]
pub struct EdgeView<'a, Sym> {
    pub label: &'a [Sym],
    pub destination_depth: usize,
    pub starting_positions: &'a HashMap<SequenceId, Vec<usize>>,
}

enum DescendOutcome {
    Found(NodeId),
    NotFound,
}

/// A single suffix tree indexing any number of independently-growing
/// sequences of `Sym`.
pub struct SuffixTree<Sym> {
    sequences: SequenceStore<Sym>,
    nodes: Vec<Node<Sym>>,
    edges: Vec<Edge>,
    leaves: Vec<Option<UnresolvedLeaf>>,
    active_points: HashMap<SequenceId, ActivePoint>,
    unresolved_leaves: HashMap<SequenceId, Vec<LeafId>>,
    active_sequence: SequenceId,
    created_nodes_during_step: SmallVec<[NodeId; 2]>,
}

impl<Sym: Symbol> SuffixTree<Sym> {
    pub fn new() -> Self {
        SuffixTree {
            sequences: SequenceStore::new(),
            nodes: vec![Node::new(0)],
            edges: Vec::new(),
            leaves: Vec::new(),
            active_points: HashMap::new(),
            unresolved_leaves: HashMap::new(),
            active_sequence: String::new(),
            created_nodes_during_step: SmallVec::new(),
        }
    }

    // -- external interface (spec.md §6) ---------------------------------

    /// Appends `symbol` to `seq_id`, creating the sequence (and its active
    /// point, at the root) on first use, and runs one Ukkonen phase.
    pub fn extend(&mut self, seq_id: &str, symbol: Sym) {
        self.active_sequence = seq_id.to_owned();
        if !self.active_points.contains_key(seq_id) {
            self.active_points.insert(seq_id.to_owned(), ActivePoint::at_root());
        }
        if !self.unresolved_leaves.contains_key(seq_id) {
            self.unresolved_leaves.insert(seq_id.to_owned(), Vec::new());
        }

        self.sequences.append(seq_id, symbol);
        self.created_nodes_during_step.clear();
        self.active_points.get_mut(seq_id).unwrap().remainder += 1;
        self.insert_suffix();
    }

    /// Convenience wrapper over [`Self::extend`] for a whole run of symbols.
    pub fn extend_all<I: IntoIterator<Item = Sym>>(&mut self, seq_id: &str, symbols: I) {
        for symbol in symbols {
            self.extend(seq_id, symbol);
        }
    }

    /// Walks `pattern` from the root. The empty pattern is a special case
    /// (spec.md §8/§9, open question resolved): it is always present, with
    /// `positions` equal to the union, per sequence, of every non-empty
    /// sequence's own position 0 (the empty string is a prefix of every
    /// suffix, including the one starting at the very first symbol).
    pub fn contains(&self, pattern: &[Sym]) -> Occurrences {
        if pattern.is_empty() {
            let mut positions = HashMap::new();
            for (seq_id, len) in self.sequences.lengths() {
                if len >= 1 {
                    positions.entry(seq_id.clone()).or_insert_with(Vec::new).push(0);
                }
            }
            return Occurrences { present: true, positions };
        }

        match self.descend(pattern) {
            Ok(DescendOutcome::Found(node)) => Occurrences {
                present: true,
                positions: self.nodes[node].starting_positions.clone(),
            },
            Ok(DescendOutcome::NotFound) | Err(_) => Occurrences::default(),
        }
    }

    /// One entry per internal node whose total occurrence count (summed
    /// over every sequence's starting positions) is at least `k`.
    pub fn patterns_with_count_at_least(&self, k: usize) -> Vec<PatternOccurrence<Sym>> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        self.collect_patterns(ROOT, &mut prefix, k, None, &mut out);
        out
    }

    /// As [`Self::patterns_with_count_at_least`], additionally filtered to
    /// patterns of length at least `len`.
    pub fn patterns_with_length_and_count_at_least(&self, len: usize, k: usize) -> Vec<PatternOccurrence<Sym>> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        self.collect_patterns(ROOT, &mut prefix, k, Some(len), &mut out);
        out
    }

    /// Read-only pre-order traversal of every edge, deepest structure last.
    /// `visitor` receives the edge's label, the depth of its destination,
    /// and that destination's recorded starting positions.
    pub fn debug_walk<F: FnMut(EdgeView<Sym>)>(&self, mut visitor: F) {
        self.walk_edges(ROOT, &mut visitor);
    }

    fn collect_patterns(
        &self,
        node: NodeId,
        prefix: &mut Vec<Sym>,
        k: usize,
        min_len: Option<usize>,
        out: &mut Vec<PatternOccurrence<Sym>>,
    ) {
        let children: Vec<EdgeId> = self.nodes[node].children.values().copied().collect();
        for edge_id in children {
            let edge = &self.edges[edge_id];
            let to = edge.to;
            let occurrences = self.nodes[to].occurrence_count();
            if occurrences < k {
                continue;
            }

            let before = prefix.len();
            // `to`'s own stored depth is only accurate for internal nodes: a
            // leaf's incoming edge is open and keeps growing, so its depth
            // is computed fresh from the edge's current length instead.
            let depth = self.nodes[node].depth + edge.length(&self.sequences);
            prefix.extend_from_slice(self.edge_label(edge));

            if min_len.map_or(true, |len| depth >= len) {
                out.push(PatternOccurrence {
                    pattern: prefix.clone(),
                    occurrences,
                    positions: self.nodes[to].starting_positions.clone(),
                });
            }

            self.collect_patterns(to, prefix, k, min_len, out);
            prefix.truncate(before);
        }
    }

    fn walk_edges<F: FnMut(EdgeView<Sym>)>(&self, node: NodeId, visitor: &mut F) {
        let mut children: Vec<EdgeId> = self.nodes[node].children.values().copied().collect();
        children.sort_unstable();
        for edge_id in children {
            let edge = &self.edges[edge_id];
            visitor(EdgeView {
                label: self.edge_label(edge),
                destination_depth: self.nodes[node].depth + edge.length(&self.sequences),
                starting_positions: &self.nodes[edge.to].starting_positions,
            });
            self.walk_edges(edge.to, visitor);
        }
    }

    /// A plain multi-line rendering of the tree, in the spirit of the
    /// teacher's own `pretty_print`, built on top of [`Self::debug_walk`].
    pub fn pretty_print(&self) -> String
    where
        Sym: std::fmt::Debug,
    {
        fn render<Sym: Symbol>(tree: &SuffixTree<Sym>, node: NodeId) -> Vec<String> {
            let mut children: Vec<EdgeId> = tree.nodes[node].children.values().copied().collect();
            children.sort_unstable();

            if children.is_empty() {
                return vec![String::new()];
            }

            let mut lines = Vec::new();
            for (i, &edge_id) in children.iter().enumerate() {
                let edge = &tree.edges[edge_id];
                let text = format!("{:?}", tree.edge_label(edge));
                let indent = " ".repeat(text.len());
                let last = i == children.len() - 1;

                for (j, line) in render(tree, edge.to).into_iter().enumerate() {
                    let rendered = match (j == 0, last) {
                        (true, false) => format!("{}┳{}", text, line),
                        (false, false) => format!("{}┃{}", indent, line),
                        (true, true) => format!("{}┗{}", text, line),
                        (false, true) => format!("{} {}", indent, line),
                    };
                    lines.push(rendered);
                }
            }
            lines
        }

        render(self, ROOT).join("\n")
    }

    // -- query plumbing ----------------------------------------------------

    fn edge_label(&self, edge: &Edge) -> &[Sym] {
        self.sequences.slice(&edge.seq_id, edge.start, edge.end)
    }

    fn edge_first_symbol(&self, edge_id: EdgeId) -> Sym {
        let edge = &self.edges[edge_id];
        self.sequences.symbol_at(&edge.seq_id, edge.start).clone()
    }

    /// Descends from the root matching `pattern` symbol by symbol. Returns
    /// [`QueryError::EmptyPattern`] for the empty pattern: callers that want
    /// the documented empty-pattern convention (see [`Self::contains`])
    /// handle it before reaching this helper.
    fn descend(&self, pattern: &[Sym]) -> Result<DescendOutcome, QueryError> {
        if pattern.is_empty() {
            return Err(QueryError::EmptyPattern);
        }

        let mut node = ROOT;
        let mut i = 0;
        while i < pattern.len() {
            let edge_id = match self.nodes[node].children.get(&pattern[i]) {
                Some(&e) => e,
                None => return Ok(DescendOutcome::NotFound),
            };
            let edge = &self.edges[edge_id];
            let label = self.edge_label(edge);
            let take = (pattern.len() - i).min(label.len());

            if pattern[i..i + take] != label[..take] {
                return Ok(DescendOutcome::NotFound);
            }

            i += take;
            node = edge.to;
        }
        Ok(DescendOutcome::Found(node))
    }

    // -- the Ukkonen driver (spec.md §4.3-§4.6) -----------------------------

    fn insert_suffix(&mut self) {
        loop {
            let seq = self.active_sequence.clone();

            if self.active_points[&seq].edge.is_some() {
                self.walk_down();
            }
            if !self.unresolved_leaves[&seq].is_empty() {
                self.solve_unresolved_leaves();
            }

            let ap = self.active_points[&seq];
            let last_index = self.sequences.length(&seq) - 1;
            let last_symbol = self.sequences.symbol_at(&seq, last_index).clone();

            if ap.edge.is_none() {
                if let Some(&edge_id) = self.nodes[ap.node].children.get(&last_symbol) {
                    let ap = self.active_points.get_mut(&seq).unwrap();
                    ap.edge = Some(edge_id);
                    ap.length = 1;
                    return;
                }

                let starting_position = last_index - self.nodes[ap.node].depth;
                self.add_edge(ap.node, starting_position);
                self.active_points.get_mut(&seq).unwrap().remainder -= 1;
                self.update_after_split();

                if self.active_points[&seq].remainder == 0 {
                    return;
                }
            } else {
                let edge_id = ap.edge.unwrap();
                let edge = &self.edges[edge_id];
                let next_symbol = self.sequences.symbol_at(&edge.seq_id, edge.start + ap.length).clone();

                if next_symbol == last_symbol {
                    self.active_points.get_mut(&seq).unwrap().length += 1;
                    return;
                }

                self.split_edge(edge_id, ap.length);
                self.active_points.get_mut(&seq).unwrap().remainder -= 1;
                self.update_after_split();

                if self.active_points[&seq].remainder == 0 {
                    return;
                }
            }
        }
    }

    /// Creates a new leaf (and the open edge leading to it) from
    /// `node_from`, labelled with the active sequence's newest symbol, and
    /// threads the pending suffix-link queue (spec.md §4.2).
    fn add_edge(&mut self, node_from: NodeId, starting_position: usize) -> EdgeId {
        let seq = self.active_sequence.clone();
        let start = self.sequences.length(&seq) - 1;
        let depth = self.nodes[node_from].depth + 1;

        let mut leaf = Node::new(depth);
        leaf.add_starting_position(&seq, starting_position);
        let leaf_symbol = self.sequences.symbol_at(&seq, start).clone();

        let to = self.nodes.len();
        self.nodes.push(leaf);
        let edge_id = self.edges.len();
        self.edges.push(Edge { from: node_from, to, seq_id: seq, start, end: EdgeEnd::Open, unresolved_leaves: LeafQueue::new() });
        self.nodes[to].incoming_edge = Some(edge_id);
        self.nodes[node_from].children.insert(leaf_symbol, edge_id);

        if !self.created_nodes_during_step.is_empty() && node_from != ROOT {
            let pending = self.created_nodes_during_step.remove(0);
            self.nodes[pending].suffix_link = Some(node_from);
            trace!("suffix link: node {} -> node {}", pending, node_from);
        }
        self.created_nodes_during_step.push(node_from);

        edge_id
    }

    /// Splits `old_edge_id` at `length` symbols in, inserting a fresh
    /// internal node and reconciling every other sequence's active point
    /// and every unresolved leaf still standing on the old edge (spec.md
    /// §4.2). Returns the id of the new internal node.
    fn split_edge(&mut self, old_edge_id: EdgeId, length: usize) -> NodeId {
        let seq = self.active_sequence.clone();
        let old_from = self.edges[old_edge_id].from;
        let old_to = self.edges[old_edge_id].to;
        let old_seq_id = self.edges[old_edge_id].seq_id.clone();
        let old_start = self.edges[old_edge_id].start;
        let old_end = self.edges[old_edge_id].end;

        debug_assert!(length >= 1 && length < self.edges[old_edge_id].length(&self.sequences), "split length out of range");

        let mid_depth = self.nodes[old_from].depth + length;
        let mut mid = Node::new(mid_depth);
        mid.starting_positions = self.nodes[old_to].starting_positions.clone();
        let starting_position = self.sequences.length(&seq) - mid_depth - 1;
        mid.add_starting_position(&seq, starting_position);
        let mid_id = self.nodes.len();
        self.nodes.push(mid);

        // the branch for the suffix currently being inserted
        self.add_edge(mid_id, starting_position);

        // the tail of the old edge, now starting past the split point
        let tail_start = old_start + length;
        let new_edge_id = self.edges.len();
        self.edges.push(Edge { from: mid_id, to: old_to, seq_id: old_seq_id.clone(), start: tail_start, end: old_end, unresolved_leaves: LeafQueue::new() });
        let tail_symbol = self.sequences.symbol_at(&old_seq_id, tail_start).clone();
        self.nodes[mid_id].children.insert(tail_symbol, new_edge_id);
        self.nodes[old_to].incoming_edge = Some(new_edge_id);

        // migrate unresolved leaves standing past the split point
        let on_old_edge = std::mem::take(&mut self.edges[old_edge_id].unresolved_leaves);
        let mut still_on_old = LeafQueue::new();
        for leaf_id in on_old_edge {
            let (leaf_length, leaf_seq) = {
                let leaf = self.leaves[leaf_id].as_ref().expect("unresolved leaf already removed");
                (leaf.length, leaf.sequence.clone())
            };
            if leaf_length > length {
                let leaf = self.leaves[leaf_id].as_mut().unwrap();
                leaf.length -= length;
                leaf.edge = new_edge_id;
                let new_length = leaf.length;
                let pos = self.sequences.length(&leaf_seq) - mid_depth - new_length;
                self.nodes[mid_id].add_starting_position(&leaf_seq, pos);
                self.edges[new_edge_id].unresolved_leaves.push(leaf_id);
            } else {
                still_on_old.push(leaf_id);
            }
        }
        self.edges[old_edge_id].unresolved_leaves = still_on_old;

        // relocate any other sequence's active point still parked on old_edge
        let other_seqs: Vec<SequenceId> = self.active_points.keys().cloned().collect();
        let mut rebind_to_tail = Vec::new();
        for other in other_seqs {
            let ap = self.active_points[&other];
            if ap.edge != Some(old_edge_id) {
                continue;
            }
            if ap.length == length {
                let ap = self.active_points.get_mut(&other).unwrap();
                ap.node = mid_id;
                ap.edge = None;
                ap.length = 0;
            } else if ap.length > length {
                self.active_points.get_mut(&other).unwrap().length -= length;
                rebind_to_tail.push(other);
            }
        }
        for other in rebind_to_tail {
            self.active_points.get_mut(&other).unwrap().edge = Some(new_edge_id);
        }

        self.edges[old_edge_id].to = mid_id;
        self.edges[old_edge_id].end = EdgeEnd::Closed(old_start + length);
        self.nodes[mid_id].incoming_edge = Some(old_edge_id);

        trace!("split edge {} at length {} -> node {}", old_edge_id, length, mid_id);
        mid_id
    }

    /// `walk_down` (spec.md §4.4): canonizes the active point down through
    /// zero or more edges, reclaiming any open edge that belongs to a
    /// different sequence than the one currently being extended.
    fn walk_down(&mut self) {
        let seq = self.active_sequence.clone();
        loop {
            let ap = self.active_points[&seq];
            let edge_id = match ap.edge {
                Some(e) => e,
                None => break,
            };
            let edge_len = self.edges[edge_id].length(&self.sequences);
            if ap.length < edge_len {
                break;
            }

            let edge_seq = self.edges[edge_id].seq_id.clone();
            let is_open = matches!(self.edges[edge_id].end, EdgeEnd::Open);

            if is_open && edge_seq != seq {
                self.steal_edge(edge_id);
            } else {
                self.descend_active_edge(edge_id);
            }
        }

        if self.active_points[&seq].length == 0 {
            self.active_points.get_mut(&seq).unwrap().edge = None;
        }
    }

    fn descend_active_edge(&mut self, edge_id: EdgeId) {
        let seq = self.active_sequence.clone();
        let edge_len = self.edges[edge_id].length(&self.sequences);
        let from = self.edges[edge_id].from;
        let to = self.edges[edge_id].to;
        // Computed from `from`'s (always internal/root, so stable) depth
        // plus this edge's current length, rather than `to`'s own stored
        // depth: `to` may be a leaf whose open incoming edge keeps growing.
        let depth = (self.nodes[from].depth + edge_len) as isize;

        {
            let ap = self.active_points.get_mut(&seq).unwrap();
            ap.node = to;
            ap.length -= edge_len;
            ap.current_point += edge_len;
        }

        let ap = self.active_points[&seq];
        let seq_len = self.sequences.length(&seq) as isize;
        let position = std::cmp::min(
            seq_len - 1 - depth - ap.length as isize,
            ap.current_point as isize - 1,
        );
        debug_assert!(position >= 0, "negative starting position while walking down");
        self.nodes[to].add_starting_position(&seq, position as usize);

        if ap.length >= 1 {
            let sym = self.sequences.symbol_at(&seq, ap.current_point).clone();
            if let Some(&next_edge) = self.nodes[to].children.get(&sym) {
                self.active_points.get_mut(&seq).unwrap().edge = Some(next_edge);
            }
        }
    }

    /// Reclaims an open edge belonging to a different sequence than the one
    /// being extended (spec.md §4.4, the generalized-online case).
    fn steal_edge(&mut self, edge_id: EdgeId) {
        let seq = self.active_sequence.clone();
        let orig_seq = self.edges[edge_id].seq_id.clone();
        let edge_len = self.edges[edge_id].length(&self.sequences);
        let from = self.edges[edge_id].from;
        let to = self.edges[edge_id].to;

        let leaf_id = self.leaves.len();
        self.leaves.push(Some(UnresolvedLeaf {
            edge: edge_id,
            length: edge_len,
            current_point: self.sequences.length(&orig_seq),
            sequence: orig_seq.clone(),
        }));
        self.edges[edge_id].unresolved_leaves.push(leaf_id);
        self.unresolved_leaves.entry(orig_seq.clone()).or_insert_with(Vec::new).push(leaf_id);
        trace!("edge {} reclaimed from sequence {:?} for sequence {:?}", edge_id, orig_seq, seq);

        self.nodes[to].starting_positions.remove(&orig_seq);

        let ap = self.active_points[&seq];
        let new_start = self.sequences.length(&seq) - ap.remainder;
        self.nodes[to].add_starting_position(&seq, new_start);

        let current_point = ap.current_point;
        self.edges[edge_id].seq_id = seq.clone();
        self.edges[edge_id].start = current_point;

        self.active_points.get_mut(&seq).unwrap().remainder -= 1;

        if let Some(link) = self.nodes[from].suffix_link {
            self.active_points.get_mut(&seq).unwrap().node = link;
            let sym = self.sequences.symbol_at(&seq, current_point).clone();
            if let Some(&next_edge) = self.nodes[link].children.get(&sym) {
                self.active_points.get_mut(&seq).unwrap().edge = Some(next_edge);
            }
        } else {
            let remainder = self.active_points[&seq].remainder;
            let current_point = self.sequences.length(&seq) - remainder;
            {
                let ap = self.active_points.get_mut(&seq).unwrap();
                ap.node = ROOT;
                ap.length = remainder.saturating_sub(1);
                ap.current_point = current_point;
            }
            if remainder > 1 {
                let sym = self.sequences.symbol_at(&seq, current_point).clone();
                if let Some(&e) = self.nodes[ROOT].children.get(&sym) {
                    self.active_points.get_mut(&seq).unwrap().edge = Some(e);
                }
            }
        }
    }

    /// `update_after_split` (spec.md §4.6): repositions the active
    /// sequence's active point after a split or new-branch creation.
    fn update_after_split(&mut self) {
        let seq = self.active_sequence.clone();
        let node = self.active_points[&seq].node;

        if let Some(link) = self.nodes[node].suffix_link {
            self.active_points.get_mut(&seq).unwrap().node = link;

            let active_length = self.active_points[&seq].length;
            let link_depth = self.nodes[link].depth;
            let seq_len = self.sequences.length(&seq);
            let pos = (seq_len as isize - 1 - link_depth as isize - active_length as isize) as usize;

            let mut cursor = link;
            while cursor != ROOT {
                self.nodes[cursor].add_starting_position(&seq, pos);
                let incoming = self.nodes[cursor].incoming_edge.expect("non-root node missing incoming edge");
                cursor = self.edges[incoming].from;
            }

            self.active_points.get_mut(&seq).unwrap().node = link;

            if let Some(old_edge_id) = self.active_points[&seq].edge {
                let old_symbol = self.edge_first_symbol(old_edge_id);
                if let Some(&new_edge_id) = self.nodes[link].children.get(&old_symbol) {
                    self.active_points.get_mut(&seq).unwrap().edge = Some(new_edge_id);
                }
                self.walk_down();
            }
            return;
        }

        let remainder = self.active_points[&seq].remainder;
        let seq_len = self.sequences.length(&seq);
        let current_point = seq_len - remainder;
        {
            let ap = self.active_points.get_mut(&seq).unwrap();
            ap.node = ROOT;
            ap.current_point = current_point;
        }

        if remainder >= 1 {
            let sym = self.sequences.symbol_at(&seq, current_point).clone();
            if let Some(&e) = self.nodes[ROOT].children.get(&sym) {
                let ap = self.active_points.get_mut(&seq).unwrap();
                ap.edge = Some(e);
                ap.length = remainder - 1;
                return;
            }
        }
        self.active_points.get_mut(&seq).unwrap().edge = None;
    }

    /// `solve_unresolved_leaves` (spec.md §4.5): advances every unresolved
    /// leaf owned by the active sequence by its newest symbol, deepest
    /// leaf first so that a split never invalidates a shallower leaf's
    /// cached edge pointer.
    fn solve_unresolved_leaves(&mut self) {
        let seq = self.active_sequence.clone();
        let mut leaf_ids = self.unresolved_leaves.get(&seq).cloned().unwrap_or_default();
        if leaf_ids.is_empty() {
            return;
        }

        leaf_ids.sort_by_key(|&id| {
            let leaf = self.leaves[id].as_ref().unwrap();
            std::cmp::Reverse(self.nodes[self.edges[leaf.edge].from].depth + leaf.length)
        });

        let last_symbol = {
            let last_index = self.sequences.length(&seq) - 1;
            self.sequences.symbol_at(&seq, last_index).clone()
        };

        let mut to_remove = Vec::new();
        let mut pending_secondary_link: Option<NodeId> = None;

        for leaf_id in leaf_ids {
            let leaf = self.leaves[leaf_id].clone().expect("unresolved leaf already removed");
            let edge_len = self.edges[leaf.edge].length(&self.sequences);

            if edge_len > leaf.length {
                let sym = {
                    let edge = &self.edges[leaf.edge];
                    self.sequences.symbol_at(&edge.seq_id, edge.start + leaf.length).clone()
                };

                if sym == last_symbol {
                    self.leaves[leaf_id].as_mut().unwrap().length += 1;
                } else {
                    to_remove.push(leaf_id);
                    let mid = self.split_edge(leaf.edge, leaf.length);
                    let mid_depth = self.nodes[mid].depth;
                    match pending_secondary_link {
                        Some(prev) if self.nodes[prev].depth == mid_depth + 1 => {
                            self.nodes[prev].suffix_link = Some(mid);
                            trace!("secondary suffix link: node {} -> node {}", prev, mid);
                        }
                        _ => {}
                    }
                    pending_secondary_link = Some(mid);
                }
                continue;
            }

            // at an edge end
            let is_open = matches!(self.edges[leaf.edge].end, EdgeEnd::Open);

            if is_open {
                let edge_owner = self.edges[leaf.edge].seq_id.clone();
                let owner_len = self.sequences.length(&edge_owner);

                let new_leaf_id = self.leaves.len();
                self.leaves.push(Some(UnresolvedLeaf { edge: leaf.edge, length: edge_len, current_point: owner_len, sequence: edge_owner.clone() }));
                self.unresolved_leaves.entry(edge_owner.clone()).or_insert_with(Vec::new).push(new_leaf_id);
                self.edges[leaf.edge].unresolved_leaves.push(new_leaf_id);
                to_remove.push(leaf_id);

                let to_node = self.edges[leaf.edge].to;
                self.nodes[to_node].starting_positions.remove(&edge_owner);

                let from_depth = self.nodes[self.edges[leaf.edge].from].depth;
                self.edges[leaf.edge].seq_id = seq.clone();
                self.nodes[to_node].add_starting_position(&seq, self.sequences.length(&seq) - (from_depth + edge_len));
                self.edges[leaf.edge].start = self.sequences.length(&seq) - edge_len;
                self.edges[leaf.edge].end = EdgeEnd::Open;
            } else {
                let to_node = self.edges[leaf.edge].to;
                let pos = self.sequences.length(&seq) - self.nodes[to_node].depth - 1;
                self.nodes[to_node].add_starting_position(&leaf.sequence, pos);

                if let Some(&next_edge) = self.nodes[to_node].children.get(&last_symbol) {
                    self.leaves[leaf_id] = Some(UnresolvedLeaf {
                        edge: next_edge,
                        length: 1,
                        current_point: leaf.current_point + edge_len,
                        sequence: leaf.sequence,
                    });
                } else {
                    let depth = self.nodes[to_node].depth;
                    let starting_position = self.sequences.length(&seq) - depth - 1;
                    self.add_edge(to_node, starting_position);
                    to_remove.push(leaf_id);
                }
            }
        }

        let queue = self.unresolved_leaves.get_mut(&seq).unwrap();
        for leaf_id in to_remove {
            if let Some(pos) = queue.iter().position(|&id| id == leaf_id) {
                queue.remove(pos);
            }
            if let Some(leaf) = self.leaves[leaf_id].clone() {
                if let Some(pos) = self.edges[leaf.edge].unresolved_leaves.iter().position(|&id| id == leaf_id) {
                    self.edges[leaf.edge].unresolved_leaves.remove(pos);
                }
            }
            self.leaves[leaf_id] = None;
        }
    }
}

impl<Sym: Symbol> Default for SuffixTree<Sym> {
    fn default() -> Self {
        Self::new()
    }
}
