//! The graph store: append-only DFG nodes with per-node payload and edge lists.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Tags attached to a [`Node`]. These combine: a register write result is
    /// tagged `RESULT | VAR`, an operator that both produces and is pushed
    /// back on the stack is `RESULT | GENERATIVE`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeKind: u8 {
        /// A literal numeric value introduced on the stack.
        const CONST = 0b0000_0001;
        /// The current symbolic value of a register sub-range or memory-backed variable.
        const VAR = 0b0000_0010;
        /// Marks a node whose value is used as a memory address.
        const PTR = 0b0000_0100;
        /// An operator application; `content` is a postfix fragment.
        const GENERATIVE = 0b0000_1000;
        /// An intermediate produced by an operator and pushed back on the stack.
        const RESULT = 0b0001_0000;
    }
}

/// Stable identity for a node in the [`Graph`]. Never reused or invalidated;
/// `idx` order is creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The creation sequence number of this node (monotonic, unique per DFG).
    pub const fn idx(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single DFG node: creation index, mutable text content, and a kind tag.
#[derive(Debug, Clone)]
pub struct Node {
    idx: usize,
    content: String,
    kind: NodeKind,
    incoming: Vec<NodeId>,
    outgoing: Vec<NodeId>,
}

impl Node {
    fn new(idx: usize, content: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            idx,
            content: content.into(),
            kind,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Creation sequence number.
    pub const fn idx(&self) -> usize {
        self.idx
    }

    /// Current text content (literal operand or accumulated operator fragment).
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Append text to this node's content, matching the original's
    /// append-to-strbuf construction of generative-node fragments.
    pub(crate) fn append(&mut self, text: &str) {
        self.content.push_str(text);
    }

    /// The kind tag bitset.
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Nodes this node has an incoming edge from, in insertion order.
    pub fn incoming(&self) -> &[NodeId] {
        &self.incoming
    }

    /// Nodes this node has an outgoing edge to, in insertion order.
    pub fn outgoing(&self) -> &[NodeId] {
        &self.outgoing
    }
}

/// Append-only directed graph of [`Node`]s. Owns every node payload; nodes
/// are never removed, so `NodeId`s remain valid for the lifetime of the
/// `Graph`. Edges always run from an older `idx` to a newer one, so the
/// graph is a DAG by construction and needs no cycle detection.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    /// A fresh, empty graph.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Append a node with the given content and kind, returning its stable id.
    pub(crate) fn add_node(&mut self, idx: usize, content: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(idx, content, kind));
        id
    }

    /// Record an edge `from -> to`. Multi-edges are tolerated; semantics
    /// depend only on the presence of at least one edge.
    pub(crate) fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.nodes[to.0].incoming.push(from);
        self.nodes[from.0].outgoing.push(to);
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Mutable access to a node's content, used by handlers that build up a
    /// generative node's operator fragment incrementally.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Total number of nodes ever created.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no node has been created yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visit every node reachable from `root` by following incoming edges,
    /// each exactly once, depth-first. `visitor` is called post-order with
    /// respect to the traversal (a node's dependencies are visited before
    /// it returns control, but visitation order within `visitor` itself is
    /// whatever the visitor records) — callers needing creation-order
    /// output should key their own collection by [`Node::idx`].
    pub fn reverse_dfs(&self, root: NodeId, mut visitor: impl FnMut(NodeId, &Node)) {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if visited[id.0] {
                continue;
            }
            visited[id.0] = true;
            let node = &self.nodes[id.0];
            visitor(id, node);
            for &pred in node.incoming() {
                if !visited[pred.0] {
                    stack.push(pred);
                }
            }
        }
    }
}
