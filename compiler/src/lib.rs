// dagc - DAG Expression Compiler
//
// Library root. Source text flows through the phases in module order:
// lexer → builder (using dict) → dag (parent counts) → codegen.

pub mod builder;
pub mod codegen;
pub mod dag;
pub mod diag;
pub mod dict;
pub mod dot;
pub mod dump;
pub mod error;
pub mod id;
pub mod lexer;
pub mod node;
pub mod pipeline;
