//! One-call entry points: decode and run a program with the given I/O.

use std::io::Write;

use tracing::debug;

use crate::api::{Error, ExecutionOptions};
use crate::parser;
use crate::program::Program;
use crate::vm::{InputSource, Interpreter, Outcome};

/// Run an already decoded program.
pub fn run_program<R, W, E>(
    program: &Program,
    options: ExecutionOptions,
    input: R,
    output: W,
    diagnostics: E,
) -> Result<Outcome, Error>
where
    R: InputSource,
    W: Write,
    E: Write,
{
    let mut interpreter = Interpreter::new(program, options, input, output, diagnostics)
        .map_err(|error| Error::runtime(error, None))?;
    interpreter
        .run()
        .map_err(|error| Error::runtime(error, interpreter.current()))
}

/// Decode `source` and run it.
pub fn run_source<R, W, E>(
    source: &str,
    options: ExecutionOptions,
    input: R,
    output: W,
    diagnostics: E,
) -> Result<Outcome, Error>
where
    R: InputSource,
    W: Write,
    E: Write,
{
    let program = parser::parse(source)?;
    debug!(instructions = program.len(), "running decoded source");
    run_program(&program, options, input, output, diagnostics)
}
