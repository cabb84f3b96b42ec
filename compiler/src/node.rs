// node.rs - DAG node model
//
// A node is one of four variants: identifier, numeric literal, unary
// operator, binary operator. Operands are `NodeRef`s into the arena that
// owns all canonical nodes, so a node can have any number of parents.
//
// Structural equality is not defined here; it is the job of `dict::NodeKey`,
// which normalizes symmetric operators before hashing.

use std::fmt;

use crate::id::{NodeId, NodeRef};

// ── Operators ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnaryOp {
    Negate,
}

impl UnaryOp {
    /// Target-code spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Negate => "NEGATION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BinaryOp {
    Or,
    And,
    Add,
    Subtract,
    Multiply,
    Divide,
    Greater,
    Less,
    Equals,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 9] = [
        BinaryOp::Or,
        BinaryOp::And,
        BinaryOp::Add,
        BinaryOp::Subtract,
        BinaryOp::Multiply,
        BinaryOp::Divide,
        BinaryOp::Greater,
        BinaryOp::Less,
        BinaryOp::Equals,
    ];

    /// Target-code spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Greater => ">",
            BinaryOp::Less => "<",
            BinaryOp::Equals => "==",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Or => "OR",
            BinaryOp::And => "AND",
            BinaryOp::Add => "ADD",
            BinaryOp::Subtract => "SUBTRACT",
            BinaryOp::Multiply => "MULTIPLY",
            BinaryOp::Divide => "DIVIDE",
            BinaryOp::Greater => "GREATER",
            BinaryOp::Less => "LESS",
            BinaryOp::Equals => "EQUALS",
        }
    }

    /// The operator that computes the same value when the operands are
    /// swapped. `Some(self)` means commutative; `None` means the operand
    /// order is significant.
    pub fn symmetric_with(self) -> Option<BinaryOp> {
        match self {
            BinaryOp::Or | BinaryOp::And | BinaryOp::Add | BinaryOp::Multiply | BinaryOp::Equals => {
                Some(self)
            }
            BinaryOp::Greater => Some(BinaryOp::Less),
            BinaryOp::Less => Some(BinaryOp::Greater),
            BinaryOp::Subtract | BinaryOp::Divide => None,
        }
    }

    pub fn is_commutative(self) -> bool {
        self.symmetric_with() == Some(self)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ── Nodes ───────────────────────────────────────────────────────────────────

/// Variant payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Ident {
        name: String,
    },
    /// Numeric literal. `text` is reproduced verbatim in target code;
    /// `value` decides equality.
    Number {
        text: String,
        value: f64,
    },
    Unary {
        op: UnaryOp,
        operand: NodeRef,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeRef,
        rhs: NodeRef,
    },
}

impl NodeKind {
    /// Identifiers and numbers. Leaves are never shared under the default
    /// emission policy.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Ident { .. } | NodeKind::Number { .. })
    }

    /// Operand references in left-to-right order. A binary node whose
    /// operands are the same node yields that reference twice.
    pub fn operands(&self) -> impl Iterator<Item = NodeRef> {
        let (first, second) = match *self {
            NodeKind::Ident { .. } | NodeKind::Number { .. } => (None, None),
            NodeKind::Unary { operand, .. } => (Some(operand), None),
            NodeKind::Binary { lhs, rhs, .. } => (Some(lhs), Some(rhs)),
        };
        first.into_iter().chain(second)
    }

    /// Short human-readable label: the name, the literal text, or the
    /// operator symbol.
    pub fn label(&self) -> &str {
        match self {
            NodeKind::Ident { name } => name.as_str(),
            NodeKind::Number { text, .. } => text.as_str(),
            NodeKind::Unary { op, .. } => op.symbol(),
            NodeKind::Binary { op, .. } => op.symbol(),
        }
    }
}

/// A DAG node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Number of edges into this node, filled in by the parent-count pass.
    pub parent_count: u32,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            parent_count: 0,
            kind,
        }
    }
}
