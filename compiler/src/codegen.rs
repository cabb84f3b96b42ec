// codegen.rs - Straight-line code generation for expression DAGs
//
// Walks the DAG once in operand-before-operator order and produces a list
// of temporary assignments plus a final result expression. A node reached
// through more than one edge is computed into a temporary the first time it
// is reached; every later reach reads the temporary instead of descending
// again. A node with a single parent is inlined into its parent's text.
//
// Preconditions: `dag` has had its parent counts computed.
// Postconditions: every temporary is assigned exactly once, before any
//                 statement or the result reads it.
// Failure modes: none.
// Side effects: none.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::dag::Dag;
use crate::id::NodeRef;
use crate::node::{Node, NodeKind};

// ── Public types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// Treat identifiers and numbers as sharing candidates too. Off by
    /// default: reading a variable or a constant is assumed to be cheaper
    /// than reading a temporary.
    pub share_leaves: bool,
}

/// `temp = expr;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub temp: String,
    pub expr: String,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {};", self.temp, self.expr)
    }
}

/// Generated straight-line program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub result: String,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        writeln!(f, "return {};", self.result)
    }
}

// ── Public entry point ──────────────────────────────────────────────────────

pub fn emit(dag: &Dag, options: &EmitOptions) -> Program {
    debug_assert!(dag.is_counted(), "emit called before count_parents");
    let mut ctx = CodeGenerator::new(dag, options);
    let result = ctx.expr_for(dag.root());
    debug!(statements = ctx.statements.len(), "code emitted");
    Program {
        statements: ctx.statements,
        result,
    }
}

// ── Internal context ────────────────────────────────────────────────────────

struct CodeGenerator<'a> {
    dag: &'a Dag,
    options: &'a EmitOptions,
    statements: Vec<Statement>,
    visited: Vec<bool>,
}

/// Work item for the explicit-stack walk.
enum Step {
    /// Produce the text for a node, descending into operands if needed.
    Enter(NodeRef),
    /// All operand texts for this node are on the value stack.
    Finish(NodeRef),
}

impl<'a> CodeGenerator<'a> {
    fn new(dag: &'a Dag, options: &'a EmitOptions) -> Self {
        Self {
            dag,
            options,
            statements: Vec::new(),
            visited: vec![false; dag.len()],
        }
    }

    fn is_candidate(&self, node: &Node) -> bool {
        !node.kind.is_leaf() || self.options.share_leaves
    }

    /// Text computing `root`'s value, appending statements for any shared
    /// node reached for the first time along the way.
    ///
    /// Equivalent to the obvious recursion, but with an explicit stack so
    /// long operator chains cannot exhaust the call stack.
    fn expr_for(&mut self, root: NodeRef) -> String {
        let dag = self.dag;
        let mut steps = vec![Step::Enter(root)];
        let mut values: Vec<String> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Enter(node_ref) => {
                    let node = dag.get(node_ref);
                    if !self.is_candidate(node) {
                        values.push(node.kind.label().to_string());
                        continue;
                    }
                    if self.visited[node_ref.index()] {
                        values.push(node.id.temp_name());
                        continue;
                    }
                    self.visited[node_ref.index()] = true;
                    steps.push(Step::Finish(node_ref));
                    let operands: Vec<NodeRef> = node.kind.operands().collect();
                    steps.extend(operands.into_iter().rev().map(Step::Enter));
                }
                Step::Finish(node_ref) => {
                    let node = dag.get(node_ref);
                    let expr = match &node.kind {
                        NodeKind::Ident { name } => name.clone(),
                        NodeKind::Number { text, .. } => text.clone(),
                        NodeKind::Unary { op, .. } => {
                            let operand = pop(&mut values);
                            format!("{}({})", op.symbol(), operand)
                        }
                        NodeKind::Binary { op, .. } => {
                            let rhs = pop(&mut values);
                            let lhs = pop(&mut values);
                            format!("({}) {} ({})", lhs, op.symbol(), rhs)
                        }
                    };
                    values.push(self.bind(node, expr));
                }
            }
        }
        pop(&mut values)
    }

    /// Either assign `expr` to the node's temporary and return the
    /// temporary's name, or hand back `expr` for inlining.
    fn bind(&mut self, node: &Node, expr: String) -> String {
        if node.parent_count > 1 {
            let temp = node.id.temp_name();
            self.statements.push(Statement {
                temp: temp.clone(),
                expr,
            });
            temp
        } else {
            expr
        }
    }
}

fn pop(values: &mut Vec<String>) -> String {
    values.pop().unwrap_or_default()
}
