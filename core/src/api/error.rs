//! Public error type for running IPPcode22 programs.
//!
//! Decode and execution errors are kept apart so callers can tell a program
//! that never started from one that failed part-way, but both map onto the
//! same exit code table.

use core::fmt;

use crate::parser::ParseError;
use crate::program::{Instruction, Opcode, Span};
use crate::vm::FatalError;

#[derive(Debug)]
pub enum Error {
    /// The source text could not be decoded into a program.
    Decode(ParseError),

    /// Execution stopped with a fatal error.
    ///
    /// `order`, `opcode` and `span` describe the failing instruction when
    /// there is one; label-table errors are raised before any instruction
    /// runs.
    Runtime {
        error: FatalError,
        order: Option<usize>,
        opcode: Option<Opcode>,
        span: Option<Span>,
    },
}

impl Error {
    pub fn runtime(error: FatalError, at: Option<&Instruction>) -> Self {
        Error::Runtime {
            error,
            order: at.map(|ins| ins.order),
            opcode: at.map(|ins| ins.opcode),
            span: at.and_then(|ins| ins.span.clone()),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Decode(err) => err.exit_code(),
            Error::Runtime { error, .. } => error.exit_code(),
        }
    }

    /// Source location of the failure, if known.
    pub fn span(&self) -> Option<&Span> {
        match self {
            Error::Decode(err) => Some(&err.span),
            Error::Runtime { span, .. } => span.as_ref(),
        }
    }

    /// The message without location details.
    pub fn message(&self) -> String {
        match self {
            Error::Decode(err) => err.kind.to_string(),
            Error::Runtime { error, .. } => error.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(err) => write!(f, "Decode error: {}", err),
            Error::Runtime {
                error,
                order: Some(order),
                opcode: Some(opcode),
                ..
            } => write!(f, "Runtime error at instruction {} ({}): {}", order, opcode, error),
            Error::Runtime { error, .. } => write!(f, "Runtime error: {}", error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(err) => Some(err),
            Error::Runtime { error, .. } => Some(error),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Decode(err)
    }
}
