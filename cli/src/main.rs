use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use ipp_core::vm::codes;
use ippvm::{ExecutionOptions, render_error, run_source};
use miette::{Diagnostic, IntoDiagnostic, Result};
use thiserror::Error;
use tracing::debug;

/// ippvm - run IPPcode22 programs
#[derive(Parser, Debug)]
#[command(name = "ippvm")]
#[command(about = "Interpret an IPPcode22 program", long_about = None)]
struct Args {
    /// Program source file (stdin if omitted)
    #[arg(long, value_name = "FILE")]
    source: Option<PathBuf>,

    /// File that READ takes its lines from (stdin if omitted)
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Print the interpreter state to stderr after every instruction
    #[arg(long)]
    dump_state: bool,
}

#[derive(Debug, Error, Diagnostic)]
enum CliError {
    #[error("at least one of --source and --input must be given")]
    #[diagnostic(
        code(ippvm::arguments),
        help("the other one is read from standard input")
    )]
    NoFiles,

    #[error("cannot read {}", .path.display())]
    #[diagnostic(code(ippvm::io))]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::NoFiles => codes::BAD_ARGUMENTS,
            CliError::Unreadable { .. } => codes::INPUT_FILE,
        }
    }
}

fn unreadable(path: &Path, source: io::Error) -> CliError {
    CliError::Unreadable {
        path: path.to_path_buf(),
        source,
    }
}

fn read_source(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| unreadable(path, e)),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| unreadable(Path::new("<stdin>"), e))?;
            Ok(text)
        }
    }
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>, CliError> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|e| unreadable(path, e))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Runs the program and returns the process exit code.
fn execute(args: &Args) -> Result<i32, CliError> {
    if args.source.is_none() && args.input.is_none() {
        return Err(CliError::NoFiles);
    }
    let source = read_source(args.source.as_deref())?;
    let input = open_input(args.input.as_deref())?;

    let options = ExecutionOptions {
        dump_state: args.dump_state,
    };
    let output = BufWriter::new(io::stdout().lock());
    match run_source(&source, options, input, output, io::stderr()) {
        Ok(outcome) => {
            debug!(
                exit_code = outcome.exit_code,
                executed = outcome.executed,
                "program finished"
            );
            Ok(outcome.exit_code)
        }
        Err(err) => {
            render_error(&err, &source);
            Ok(err.exit_code())
        }
    }
}

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version are not failures.
            let code = if err.use_stderr() {
                codes::BAD_ARGUMENTS
            } else {
                0
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the log level, WARN if not set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match execute(&args) {
        Ok(code) => process::exit(code),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            process::exit(code);
        }
    }
}
