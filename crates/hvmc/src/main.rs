//! The `hvmc` command: compile a regex into hendersonvm bytecode.
//!
//! ```text
//! hvmc '[a-z]+' --json
//! hvmc 'a|b*' --dot out.dot --pdf out.pdf
//! ```

mod pretty;

use std::path::PathBuf;
use std::process;

use ariadne::{Label, Report, ReportKind, Source};
use clap::Parser;
use hvm_codegen::{compile, compile_with_ast, CompileError};
use human_panic::{setup_panic, Metadata};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "hvmc", about = "Compile a regular expression into hendersonvm bytecode")]
#[command(disable_version_flag = true)]
struct Cli {
    /// The regular expression to compile.
    regex: String,

    /// Emit the program as a JSON array of `[CMDNAME, arg1, arg2]` triples.
    #[arg(short = 'j', long)]
    json: bool,

    /// Also write the AST as a directed-graph document to PATH.
    #[arg(short = 'd', long, value_name = "PATH")]
    dot: Option<PathBuf>,

    /// Additionally render PATH as a PDF via an external layout tool.
    #[arg(short = 'p', long, value_name = "PATH")]
    pdf: Option<PathBuf>,

    /// Raise the log level.
    #[arg(long)]
    verbose: bool,

    /// Print version and exit.
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,
}

fn main() {
    setup_panic!(Metadata::new("hvmc", env!("CARGO_PKG_VERSION")));

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        report_error(&cli.regex, &err);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    let _ = tracing_subscriber::fmt().with_max_level(level).with_target(false).try_init();
}

fn run(cli: &Cli) -> Result<(), CompileError> {
    if cli.dot.is_some() || cli.pdf.is_some() {
        let (ast, program) = compile_with_ast(&cli.regex, false)?;
        emit_diagram(&ast, cli.dot.as_deref(), cli.pdf.as_deref());
        print_program(&program, cli.json);
    } else {
        let program = compile(&cli.regex)?;
        print_program(&program, cli.json);
    }
    Ok(())
}

fn print_program(program: &[(u32, u32, u32)], json: bool) {
    if json {
        let named: Vec<(&str, u32, u32)> =
            program.iter().map(|&(cmd, a1, a2)| (opcode_cmd_name(cmd), a1, a2)).collect();
        println!("{}", serde_json::to_string(&named).expect("triples serialize infallibly"));
    } else {
        print!("{}", pretty::render_program(program));
    }
}

fn opcode_cmd_name(cmd: u32) -> &'static str {
    match cmd {
        0 => "MATCH",
        1 => "CHAR",
        2 => "SPLIT",
        3 => "JMP",
        4 => "NCHAR",
        other => unreachable!("unknown opcode {other}"),
    }
}

/// Write the AST diagram, and a PDF rendering via `dot` if requested.
/// Diagram/PDF emission never aborts compilation; failures go to the log.
fn emit_diagram(ast: &hvm_parser::Ast, dot: Option<&std::path::Path>, pdf: Option<&std::path::Path>) {
    let dot_path = match dot.map(PathBuf::from).or_else(|| pdf.map(default_dot_path)) {
        Some(p) => p,
        None => return,
    };

    let result = std::fs::File::create(&dot_path)
        .and_then(|mut f| hvm_diagram::render_ast(ast, &mut f, "AST"));

    match result {
        Ok(()) => info!(path = %dot_path.display(), "diagram written"),
        Err(e) => {
            warn!(path = %dot_path.display(), error = %e, "failed to write diagram");
            return;
        }
    }

    if let Some(pdf_path) = pdf {
        render_pdf(&dot_path, pdf_path);
    }
}

fn default_dot_path(pdf_path: &std::path::Path) -> PathBuf {
    pdf_path.with_extension("dot")
}

fn render_pdf(dot_path: &std::path::Path, pdf_path: &std::path::Path) {
    let result = process::Command::new("dot")
        .args(["-Tpdf", &dot_path.to_string_lossy(), "-o", &pdf_path.to_string_lossy()])
        .output();

    match result {
        Ok(output) if output.status.success() => info!(path = %pdf_path.display(), "PDF written"),
        Ok(output) => warn!(
            stderr = %String::from_utf8_lossy(&output.stderr),
            "dot exited with a failure status; PDF not written"
        ),
        Err(e) => warn!(error = %e, "could not invoke `dot`; is Graphviz installed?"),
    }
}

fn report_error(source: &str, err: &CompileError) {
    match err {
        CompileError::Lex(e) => {
            render_span_report(source, e.span.start as usize, e.span.end as usize, &e.to_string())
        }
        CompileError::Parse(e) => {
            render_span_report(source, e.span.start as usize, e.span.end as usize, &e.to_string())
        }
        CompileError::Codegen(e) => eprintln!("internal error: {e}"),
    }
}

fn render_span_report(source: &str, start: usize, end: usize, message: &str) {
    let end = end.max(start + 1).min(source.len().max(1));
    let _ = Report::<std::ops::Range<usize>>::build(ReportKind::Error, start..end)
        .with_message(message)
        .with_label(Label::new(start..end).with_message(message))
        .finish()
        .eprint(Source::from(source));
}
