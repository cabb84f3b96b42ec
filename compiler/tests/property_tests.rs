// Property-based tests for compiler invariants.
//
// Three categories:
// 1. Hash-consing: no two canonical nodes are structurally equal
// 2. Temporaries: each shared operator is bound once, before use, and read
//    once per parent edge
// 3. Meaning: substituting temporaries back reproduces the fully expanded
//    expression, and compilation is deterministic
//
// Uses proptest with explicit configuration to prevent CI flakiness.

use std::collections::HashSet;

use dagc::codegen::{emit, EmitOptions, Program};
use dagc::dag::Dag;
use dagc::dict::NodeKey;
use dagc::id::NodeRef;
use dagc::node::NodeKind;
use dagc::pipeline::{compile, CompileOptions};
use proptest::prelude::*;

// ── Expression generator ────────────────────────────────────────────────────

/// Generate a fully parenthesized expression over a small pool of leaves so
/// that repeated and mirrored subexpressions are common.
fn arb_expr() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(str::to_string),
        prop::sample::select(vec!["0", "1", "2", "2.0"]).prop_map(str::to_string),
    ];
    let op = prop::sample::select(vec!["||", "&&", "+", "-", "*", "/", ">", "<", "=="]);
    leaf.prop_recursive(6, 64, 2, move |inner| {
        prop_oneof![
            3 => (inner.clone(), op.clone(), inner.clone())
                .prop_map(|(lhs, op, rhs)| format!("({lhs} {op} {rhs})")),
            1 => inner.prop_map(|operand| format!("-({operand})")),
        ]
    })
}

// ── Test helpers ────────────────────────────────────────────────────────────

/// Render a node with every shared subexpression written out in place.
fn expand(dag: &Dag, node: NodeRef) -> String {
    match &dag.get(node).kind {
        NodeKind::Ident { name } => name.clone(),
        NodeKind::Number { text, .. } => text.clone(),
        NodeKind::Unary { op, operand } => format!("{}({})", op.symbol(), expand(dag, *operand)),
        NodeKind::Binary { op, lhs, rhs } => format!(
            "({}) {} ({})",
            expand(dag, *lhs),
            op.symbol(),
            expand(dag, *rhs)
        ),
    }
}

/// Substitute temporaries back into the result, last definition first.
fn inline_temporaries(program: &Program) -> String {
    let mut text = program.result.clone();
    for statement in program.statements.iter().rev() {
        text = text.replace(
            &format!("({})", statement.temp),
            &format!("({})", statement.expr),
        );
    }
    text
}

fn all_text(program: &Program) -> String {
    let mut text = String::new();
    for statement in &program.statements {
        text.push_str(&statement.expr);
        text.push('\n');
    }
    text.push_str(&program.result);
    text
}

// ── Properties ──────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 200,
        .. ProptestConfig::default()
    })]

    #[test]
    fn canonical_nodes_are_unique(source in arb_expr()) {
        let compilation = compile(&source, &CompileOptions::default()).unwrap();
        let mut keys = HashSet::new();
        for (_, node) in compilation.dag.iter() {
            prop_assert!(
                keys.insert(NodeKey::of(&node.kind)),
                "duplicate canonical node {} in {}", node.id, source
            );
        }
    }

    #[test]
    fn temporaries_defined_once_before_use(source in arb_expr()) {
        let program = compile(&source, &CompileOptions::default()).unwrap().program;
        let mut defined: Vec<&str> = Vec::new();
        for statement in &program.statements {
            prop_assert!(!defined.contains(&statement.temp.as_str()), "{} defined twice", statement.temp);
            for earlier in &program.statements {
                if earlier.temp == statement.temp {
                    break;
                }
                prop_assert!(
                    !earlier.expr.contains(&format!("({})", statement.temp)),
                    "{} read before its definition", statement.temp
                );
            }
            defined.push(&statement.temp);
        }
    }

    #[test]
    fn temporaries_read_once_per_parent(source in arb_expr()) {
        let compilation = compile(&source, &CompileOptions::default()).unwrap();
        let text = all_text(&compilation.program);
        let mut bound = 0;
        for (_, node) in compilation.dag.shared() {
            if node.kind.is_leaf() {
                continue;
            }
            bound += 1;
            let reads = text.matches(&format!("({})", node.id.temp_name())).count();
            prop_assert_eq!(reads, node.parent_count as usize, "temporary {}", node.id.temp_name());
        }
        prop_assert_eq!(bound, compilation.program.statements.len());
    }

    #[test]
    fn inlining_temporaries_restores_the_expression(source in arb_expr()) {
        let compilation = compile(&source, &CompileOptions::default()).unwrap();
        let expanded = expand(&compilation.dag, compilation.dag.root());
        prop_assert_eq!(inline_temporaries(&compilation.program), expanded);
    }

    #[test]
    fn sharing_leaves_keeps_the_meaning(source in arb_expr()) {
        let compilation = compile(&source, &CompileOptions::default()).unwrap();
        let program = emit(&compilation.dag, &EmitOptions { share_leaves: true });
        let expanded = expand(&compilation.dag, compilation.dag.root());
        prop_assert_eq!(inline_temporaries(&program), expanded);
    }

    #[test]
    fn compilation_is_deterministic(source in arb_expr()) {
        let first = compile(&source, &CompileOptions::default()).unwrap();
        let second = compile(&source, &CompileOptions::default()).unwrap();
        prop_assert_eq!(&first.program, &second.program);
        prop_assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }
}
