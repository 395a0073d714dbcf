//! C- front end
//!
//! Usage: cminus [OPTIONS] [input]

use anyhow::Context;
use clap::Parser as ClapParser;
use cminus::common::{CompileError, DiagnosticReporter};
use cminus::driver::{self, Input, Pipeline};
use cminus::frontend::{CompileContext, FrontendConfig, ReturnCheck};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "cminus")]
#[command(author = "C- Toolchain Team")]
#[command(version)]
#[command(about = "Parser and semantic checker for the C- language", long_about = None)]
struct Args {
    /// Input source file; reads standard input up to a `$` line when omitted
    input: Option<PathBuf>,

    /// Output file for the annotated tree (default: input with .ast extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Count return statements nested in blocks, branches and loops
    #[arg(long)]
    nested_returns: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        // Compile errors have already been reported as diagnostics
        if e.downcast_ref::<CompileError>().is_none() {
            eprintln!("error: {:#}", e);
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let input = Input::from_arg(args.input.clone());
    let source = input
        .read_source()
        .with_context(|| format!("failed to read {}", input))?;
    let filename = input.to_string();

    // Set up diagnostic reporter
    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(&filename, &source);

    let output_path = args.output.clone().unwrap_or_else(|| input.default_output());

    tracing::debug!(input = %filename, output = %output_path.display(), "compiling");

    let config = FrontendConfig {
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        return_check: if args.nested_returns {
            ReturnCheck::Nested
        } else {
            ReturnCheck::Direct
        },
    };

    let ctx = CompileContext::new(filename, file_id, &reporter);
    Pipeline::new(config)
        .compile_to_file(&source, &ctx, &output_path)
        .map_err(|e| match e {
            CompileError::Io(io) => anyhow::Error::new(io)
                .context(format!("failed to write {}", output_path.display())),
            other => other.into(),
        })?;

    print!("{}", driver::banner(&output_path));
    Ok(())
}
