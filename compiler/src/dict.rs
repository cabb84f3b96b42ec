// dict.rs - Hash-consing node dictionary
//
// Owns the node arena while a DAG is being built. Every node the builder
// constructs goes through `lookup`, which either returns the already
// registered canonical node with the same structural key or registers the
// candidate itself. Entries are never removed.
//
// Structural keys are normalized so that derived `Eq`/`Hash` suffice:
// commutative operand pairs are put in arena order, and the GREATER/LESS
// mirror pair is rewritten to a single representative kind with swapped
// operands.

use std::collections::HashMap;

use tracing::trace;

use crate::dag::Dag;
use crate::id::{IdAllocator, NodeId, NodeRef};
use crate::node::{BinaryOp, Node, NodeKind, UnaryOp};

/// Normalized structural key of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Ident(String),
    /// Bit pattern of the literal's value, with `-0.0` folded into `0.0`.
    Number(u64),
    Unary(UnaryOp, NodeRef),
    Binary(BinaryOp, NodeRef, NodeRef),
}

impl NodeKey {
    pub fn of(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::Ident { name } => NodeKey::Ident(name.clone()),
            NodeKind::Number { value, .. } => NodeKey::Number(number_bits(*value)),
            NodeKind::Unary { op, operand } => NodeKey::Unary(*op, *operand),
            NodeKind::Binary { op, lhs, rhs } => normalize_binary(*op, *lhs, *rhs),
        }
    }
}

fn number_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

fn normalize_binary(op: BinaryOp, lhs: NodeRef, rhs: NodeRef) -> NodeKey {
    match op.symmetric_with() {
        Some(mirror) if mirror == op => {
            let (lo, hi) = if lhs <= rhs { (lhs, rhs) } else { (rhs, lhs) };
            NodeKey::Binary(op, lo, hi)
        }
        // `a > b` is the same fact as `b < a`; key both on the smaller kind.
        Some(mirror) if mirror < op => NodeKey::Binary(mirror, rhs, lhs),
        _ => NodeKey::Binary(op, lhs, rhs),
    }
}

/// The hash-consing dictionary and the arena it canonicalizes into.
#[derive(Debug, Default)]
pub struct NodeDictionary {
    nodes: Vec<Node>,
    index: HashMap<NodeKey, NodeRef>,
    ids: IdAllocator,
}

impl NodeDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a candidate node with a fresh serial. The candidate is not
    /// registered until it is passed to `lookup`.
    pub fn candidate(&mut self, kind: NodeKind) -> Node {
        Node::new(self.ids.alloc(), kind)
    }

    /// Return the canonical node structurally equal to `candidate`,
    /// registering `candidate` as canonical if there is none yet.
    pub fn lookup(&mut self, candidate: Node) -> NodeRef {
        let key = NodeKey::of(&candidate.kind);
        if let Some(&existing) = self.index.get(&key) {
            trace!(
                candidate = candidate.id.0,
                canonical = self.nodes[existing.index()].id.0,
                "dictionary hit"
            );
            return existing;
        }
        let node_ref = NodeRef(self.nodes.len() as u32);
        trace!(id = candidate.id.0, label = candidate.kind.label(), "dictionary miss");
        self.index.insert(key, node_ref);
        self.nodes.push(candidate);
        node_ref
    }

    /// Shorthand for `lookup(candidate(kind))`.
    pub fn intern(&mut self, kind: NodeKind) -> NodeRef {
        let candidate = self.candidate(kind);
        self.lookup(candidate)
    }

    pub fn ident(&mut self, name: &str) -> NodeRef {
        self.intern(NodeKind::Ident {
            name: name.to_string(),
        })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeRef) -> NodeRef {
        self.intern(NodeKind::Unary { op, operand })
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: NodeRef, rhs: NodeRef) -> NodeRef {
        self.intern(NodeKind::Binary { op, lhs, rhs })
    }

    pub fn get(&self, node: NodeRef) -> &Node {
        &self.nodes[node.index()]
    }

    /// Number of canonical nodes registered.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of serials handed out, including discarded candidates.
    pub fn constructed(&self) -> u32 {
        self.ids.allocated()
    }

    /// Freeze the arena into a DAG rooted at `root`. Parent counts are still
    /// zero; see `Dag::count_parents`.
    pub fn into_dag(self, root: NodeRef) -> Dag {
        Dag::new(self.nodes, root)
    }

    /// Serial of the canonical node, for diagnostics.
    pub fn id_of(&self, node: NodeRef) -> NodeId {
        self.get(node).id
    }
}
