// dot.rs - Graphviz DOT output for expression DAGs
//
// Transforms a Dag into DOT format suitable for rendering with `dot`.
// Operators are drawn as circles, identifiers and numbers as boxes, and
// nodes with more than one parent are highlighted. Edges run from an
// operator to its operands and are labelled with the operand position.
//
// Preconditions: `dag` is a fully built Dag (parent counts are optional but
//                needed for highlighting).
// Postconditions: returns a valid DOT string representing the DAG.
// Failure modes: none (pure string formatting).
// Side effects: none.

use std::fmt;

use crate::dag::Dag;
use crate::node::{Node, NodeKind};

/// Emit the DAG as a Graphviz DOT string.
pub fn emit_dot(dag: &Dag) -> String {
    Dot(dag).to_string()
}

/// `Display` adapter that writes the DOT document.
pub struct Dot<'a>(pub &'a Dag);

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dag = self.0;
        writeln!(f, "digraph dag {{")?;
        writeln!(f, "    rankdir=TB;")?;
        writeln!(f, "    node [fontname=\"Helvetica\", fontsize=10];")?;
        writeln!(f, "    edge [fontname=\"Helvetica\", fontsize=9];")?;

        // Registration order, which is deterministic for a given source.
        writeln!(f)?;
        for (_, node) in dag.iter() {
            writeln!(f, "    n{} [{}];", node.id, node_attrs(node))?;
        }

        writeln!(f)?;
        for (_, node) in dag.iter() {
            match &node.kind {
                NodeKind::Ident { .. } | NodeKind::Number { .. } => {}
                NodeKind::Unary { operand, .. } => {
                    let target = dag.get(*operand).id;
                    writeln!(f, "    n{} -> n{target} [label=\"operand\"];", node.id)?;
                }
                NodeKind::Binary { lhs, rhs, .. } => {
                    let lhs = dag.get(*lhs).id;
                    let rhs = dag.get(*rhs).id;
                    writeln!(f, "    n{} -> n{lhs} [label=\"lhs\"];", node.id)?;
                    writeln!(f, "    n{} -> n{rhs} [label=\"rhs\"];", node.id)?;
                }
            }
        }

        writeln!(f, "}}")
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Escape a label for use inside a double-quoted DOT string.
fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Return the DOT attributes for a node.
fn node_attrs(node: &Node) -> String {
    let shape = if node.kind.is_leaf() { "box" } else { "circle" };
    let (color, extra) = if node.parent_count > 1 {
        ("lightsalmon", ", penwidth=2")
    } else if node.kind.is_leaf() {
        ("lightyellow", "")
    } else {
        ("lightblue", "")
    };
    let label = escape(node.kind.label());
    format!(
        "shape={shape}, style=filled, fillcolor={color}{extra}, label=\"{label}\", xlabel=\"{}/{}\"",
        node.id, node.parent_count
    )
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::parse;

    fn build_and_emit(source: &str) -> String {
        let dag = parse(source).unwrap_or_else(|e| panic!("{source}: {e}"));
        emit_dot(&dag)
    }

    #[test]
    fn valid_dot_structure() {
        let dot = build_and_emit("a + b");
        assert!(dot.starts_with("digraph dag {"));
        assert!(dot.trim_end().ends_with('}'));
        assert_eq!(dot.matches(" -> ").count(), 2);
    }

    #[test]
    fn shared_nodes_are_highlighted() {
        let dot = build_and_emit("(a+b)*(b+a)");
        let add_line = dot.lines().find(|l| l.contains("label=\"+\"")).unwrap();
        assert!(add_line.contains("fillcolor=lightsalmon"), "{add_line}");
        assert!(add_line.contains("penwidth=2"), "{add_line}");
        let mul_line = dot.lines().find(|l| l.contains("label=\"*\"")).unwrap();
        assert!(mul_line.contains("fillcolor=lightblue"), "{mul_line}");
    }

    #[test]
    fn shared_operand_gets_two_edges() {
        let dot = build_and_emit("(a+b)*(b+a)");
        assert!(dot.contains("n7 -> n3 [label=\"lhs\"];"), "{dot}");
        assert!(dot.contains("n7 -> n3 [label=\"rhs\"];"), "{dot}");
    }

    #[test]
    fn leaves_are_boxes() {
        let dot = build_and_emit("-x");
        let x_line = dot.lines().find(|l| l.contains("label=\"x\"")).unwrap();
        assert!(x_line.contains("shape=box"));
        assert!(dot.contains("label=\"operand\""));
    }

    #[test]
    fn labels_are_escaped() {
        assert_eq!(escape("a\"b"), "a\\\"b");
    }
}
