// pipeline.rs - Compilation orchestration
//
// Runs build (lex + parse + hash-consing + parent counting) and emission
// in order, timing each phase, and packages the artifacts together with
// provenance metadata for machine-readable output.
//
// Preconditions: none.
// Postconditions: on success, `Compilation` holds the counted DAG and the
//                 generated program; on failure nothing is emitted.
// Failure modes: the first lexical or syntax error in the source.
// Side effects: calls `on_phase_complete` after each phase.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info_span;

use crate::builder::{self, BuildOptions};
use crate::codegen::{self, EmitOptions, Program, Statement};
use crate::dag::Dag;
use crate::error::BuildError;
use crate::id::NodeId;
use crate::node::NodeKind;

// ── Options ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub build: BuildOptions,
    pub emit: EmitOptions,
}

// ── Phases ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Build,
    Emit,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Build => "build",
            Phase::Emit => "emit",
        }
    }
}

// ── Provenance ─────────────────────────────────────────────────────────────

/// Provenance metadata for reproducible output.
///
/// `source_hash`: SHA-256 of the raw source text.
/// `compiler_version`: crate version from `Cargo.toml`.
#[derive(Debug, Clone)]
pub struct Provenance {
    pub source_hash: [u8; 32],
    pub compiler_version: &'static str,
}

impl Provenance {
    /// Hex string of the source hash (64 characters).
    pub fn source_hash_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for b in &self.source_hash {
            use std::fmt::Write;
            let _ = write!(s, "{:02x}", b);
        }
        s
    }
}

pub fn compute_provenance(source: &str) -> Provenance {
    use sha2::{Digest, Sha256};

    let source_hash = {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    };
    Provenance {
        source_hash,
        compiler_version: env!("CARGO_PKG_VERSION"),
    }
}

// ── Artifacts ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Compilation {
    pub dag: Dag,
    pub program: Program,
    pub timings: Vec<(Phase, Duration)>,
    pub provenance: Provenance,
}

/// One DAG node in the JSON report.
#[derive(Debug, Serialize)]
struct NodeSummary {
    id: NodeId,
    kind: &'static str,
    label: String,
    parent_count: u32,
    operands: Vec<NodeId>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    compiler_version: &'static str,
    source_hash: String,
    nodes: Vec<NodeSummary>,
    statements: &'a [Statement],
    result: &'a str,
}

impl Compilation {
    /// Serialize the compilation as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let nodes = self
            .dag
            .iter()
            .map(|(_, node)| NodeSummary {
                id: node.id,
                kind: match node.kind {
                    NodeKind::Ident { .. } => "ident",
                    NodeKind::Number { .. } => "number",
                    NodeKind::Unary { .. } => "unary",
                    NodeKind::Binary { .. } => "binary",
                },
                label: node.kind.label().to_string(),
                parent_count: node.parent_count,
                operands: node
                    .kind
                    .operands()
                    .map(|operand| self.dag.get(operand).id)
                    .collect(),
            })
            .collect();
        let report = Report {
            compiler_version: self.provenance.compiler_version,
            source_hash: self.provenance.source_hash_hex(),
            nodes,
            statements: &self.program.statements,
            result: &self.program.result,
        };
        serde_json::to_string_pretty(&report)
    }
}

// ── Pipeline runner ────────────────────────────────────────────────────────

/// Compile `source` into a straight-line program.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Compilation, BuildError> {
    compile_with(source, options, |_, _| {})
}

/// Compile `source`, reporting each completed phase and its duration.
pub fn compile_with(
    source: &str,
    options: &CompileOptions,
    mut on_phase_complete: impl FnMut(Phase, Duration),
) -> Result<Compilation, BuildError> {
    let mut timings = Vec::with_capacity(2);

    let dag = {
        let _span = info_span!("build").entered();
        let t = Instant::now();
        let dag = builder::parse_with(source, options.build)?;
        let elapsed = t.elapsed();
        on_phase_complete(Phase::Build, elapsed);
        timings.push((Phase::Build, elapsed));
        dag
    };

    let program = {
        let _span = info_span!("emit").entered();
        let t = Instant::now();
        let program = codegen::emit(&dag, &options.emit);
        let elapsed = t.elapsed();
        on_phase_complete(Phase::Emit, elapsed);
        timings.push((Phase::Emit, elapsed));
        program
    };

    Ok(Compilation {
        dag,
        program,
        timings,
        provenance: compute_provenance(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_run_in_order() {
        let mut seen = Vec::new();
        let compilation =
            compile_with("a*b + b*a", &CompileOptions::default(), |phase, _| seen.push(phase))
                .unwrap();
        assert_eq!(seen, vec![Phase::Build, Phase::Emit]);
        assert_eq!(compilation.timings.len(), 2);
        assert_eq!(compilation.program.statements.len(), 1);
    }

    #[test]
    fn failed_build_skips_emission() {
        let mut seen = Vec::new();
        let result = compile_with("a + + b", &CompileOptions::default(), |phase, _| {
            seen.push(phase)
        });
        assert!(matches!(result, Err(BuildError::Syntax { .. })));
        assert!(seen.is_empty());
    }

    #[test]
    fn provenance_hash_is_sha256_of_source() {
        let p = compute_provenance("");
        assert_eq!(
            p.source_hash_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(p.compiler_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn json_report_lists_nodes_and_code() {
        let compilation = compile("(a+b)*(b+a)", &CompileOptions::default()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&compilation.to_json().unwrap()).unwrap();
        assert_eq!(json["result"], "(t3) * (t3)");
        assert_eq!(json["statements"][0]["temp"], "t3");
        assert_eq!(json["statements"][0]["expr"], "(a) + (b)");
        let nodes = json["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[2]["kind"], "binary");
        assert_eq!(nodes[2]["parent_count"], 2);
        assert_eq!(nodes[3]["operands"], serde_json::json!([3, 3]));
    }

    #[test]
    fn share_leaves_reaches_the_emitter() {
        let options = CompileOptions {
            emit: EmitOptions { share_leaves: true },
            ..CompileOptions::default()
        };
        let compilation = compile("x * x", &options).unwrap();
        assert_eq!(compilation.program.to_string(), "t1 = x;\nreturn (t1) * (t1);\n");
    }
}
