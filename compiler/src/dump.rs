// dump.rs - Indented text dump of an expression DAG
//
// Prints the DAG as a tree. A node reached a second time prints as a
// one-line `ref to ...` marker instead of being expanded again, which is
// how shared nodes show up in the output. Each node line ends with
// `(id,parent_count)`.
//
// Preconditions: none; parent counts print as 0 before counting.
// Postconditions: the root's subtree is printed with every node expanded
//                 exactly once.
// Failure modes: none (pure string formatting).
// Side effects: none.

use std::fmt;

use crate::dag::Dag;
use crate::id::NodeRef;
use crate::node::{Node, NodeKind};

/// Render the DAG dump as a string.
pub fn dump(dag: &Dag) -> String {
    DagDump(dag).to_string()
}

/// `Display` adapter that writes the dump.
pub struct DagDump<'a>(pub &'a Dag);

impl fmt::Display for DagDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen = vec![false; self.0.len()];
        write_node(f, self.0, self.0.root(), 0, &mut seen)
    }
}

fn write_node(
    f: &mut fmt::Formatter<'_>,
    dag: &Dag,
    node_ref: NodeRef,
    level: usize,
    seen: &mut [bool],
) -> fmt::Result {
    let node = dag.get(node_ref);
    if seen[node_ref.index()] {
        return line(f, level, &format!("ref to {}", heading(node)));
    }
    seen[node_ref.index()] = true;
    line(f, level, &heading(node))?;
    match &node.kind {
        NodeKind::Ident { .. } | NodeKind::Number { .. } => Ok(()),
        NodeKind::Unary { operand, .. } => {
            line(f, level + 1, "operand:")?;
            write_node(f, dag, *operand, level + 2, seen)
        }
        NodeKind::Binary { lhs, rhs, .. } => {
            line(f, level + 1, "lhs:")?;
            write_node(f, dag, *lhs, level + 2, seen)?;
            line(f, level + 1, "rhs:")?;
            write_node(f, dag, *rhs, level + 2, seen)
        }
    }
}

fn heading(node: &Node) -> String {
    let what = match &node.kind {
        NodeKind::Ident { name } => format!("Id '{name}'"),
        NodeKind::Number { text, .. } => format!("Number {text}"),
        NodeKind::Unary { op, .. } => format!("Unary {}", op.name()),
        NodeKind::Binary { op, .. } => format!("Binary {}", op.name()),
    };
    format!("{what} ({},{})", node.id, node.parent_count)
}

fn line(f: &mut fmt::Formatter<'_>, level: usize, text: &str) -> fmt::Result {
    writeln!(f, "{:indent$}{text}", "", indent = level * 2)
}
