use clap::Parser;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use dagc::builder::BuildOptions;
use dagc::codegen::EmitOptions;
use dagc::pipeline::{self, CompileOptions};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum EmitStage {
    /// Straight-line code with shared subexpressions bound to temporaries
    Code,
    /// Indented dump of the DAG
    Dag,
    /// Graphviz DOT
    Dot,
    /// JSON report with nodes, statements and provenance
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "dagc",
    version,
    about = "Compiles arithmetic and boolean expressions into straight-line code, computing each common subexpression once"
)]
struct Cli {
    /// Input source file (`-` reads standard input)
    source: PathBuf,

    /// Output file path (standard output when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output stage
    #[arg(long, value_enum, default_value_t = EmitStage::Code)]
    emit: EmitStage,

    /// Bind repeated identifiers and numbers to temporaries too
    #[arg(long)]
    share_leaves: bool,

    /// Maximum parenthesis nesting depth
    #[arg(long, default_value_t = BuildOptions::default().max_depth)]
    max_depth: usize,

    /// Print compiler phases and timing
    #[arg(long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("dagc=debug")
    } else {
        return;
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}

fn read_source(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        std::fs::read_to_string(path)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        eprintln!("dagc: source = {}", cli.source.display());
        if let Some(output) = &cli.output {
            eprintln!("dagc: output = {}", output.display());
        }
        eprintln!("dagc: emit   = {:?}", cli.emit);
    }

    // ── Read source ──
    let source = match read_source(&cli.source) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("dagc: error: {}: {}", cli.source.display(), e);
            std::process::exit(2);
        }
    };
    let file_name = if cli.source.as_os_str() == "-" {
        "<stdin>".to_string()
    } else {
        cli.source.display().to_string()
    };

    // ── Compile ──
    let options = CompileOptions {
        build: BuildOptions {
            max_depth: cli.max_depth,
        },
        emit: EmitOptions {
            share_leaves: cli.share_leaves,
        },
    };
    let verbose = cli.verbose;
    let compilation = match pipeline::compile_with(&source, &options, |phase, elapsed| {
        if verbose {
            eprintln!(
                "dagc: {} complete, {:.1}ms",
                phase.name(),
                elapsed.as_secs_f64() * 1000.0
            );
        }
    }) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("dagc: {}", e.to_diagnostic().render(&file_name, &source));
            std::process::exit(1);
        }
    };

    if cli.verbose {
        eprintln!(
            "dagc: {} nodes, {} shared, {} temporaries",
            compilation.dag.len(),
            compilation.dag.shared().count(),
            compilation.program.statements.len(),
        );
    }

    // ── Render requested stage ──
    let rendered = match cli.emit {
        EmitStage::Code => compilation.program.to_string(),
        EmitStage::Dag => dagc::dump::dump(&compilation.dag),
        EmitStage::Dot => dagc::dot::emit_dot(&compilation.dag),
        EmitStage::Json => match compilation.to_json() {
            Ok(mut json) => {
                json.push('\n');
                json
            }
            Err(e) => {
                eprintln!("dagc: error: {}", e);
                std::process::exit(2);
            }
        },
    };

    // ── Write output ──
    let written = match &cli.output {
        Some(path) => std::fs::write(path, rendered.as_bytes()),
        None => std::io::stdout().write_all(rendered.as_bytes()),
    };
    if let Err(e) = written {
        let target = cli
            .output
            .as_ref()
            .map_or_else(|| "<stdout>".to_string(), |p| p.display().to_string());
        eprintln!("dagc: error: {}: {}", target, e);
        std::process::exit(2);
    }
}
