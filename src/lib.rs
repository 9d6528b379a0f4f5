//! ippvm - an interpreter for the IPPcode22 three-address code
//!
//! # Overview
//!
//! IPPcode22 programs are flat instruction lists working over three kinds of
//! variable frames (global, local and temporary), a data stack and a call
//! stack. This crate re-exports the engine from `ipp-core` and adds
//! source-annotated error rendering.
//!
//! # Quick Start
//!
//! ```
//! use ippvm::{ExecutionOptions, run_source};
//!
//! let source = "\
//! .IPPcode22
//! DEFVAR GF@n
//! MOVE GF@n int@6
//! MUL GF@n GF@n int@7
//! WRITE GF@n
//! ";
//! let mut output = Vec::new();
//! let outcome = run_source(
//!     source,
//!     ExecutionOptions::default(),
//!     std::io::empty(),
//!     &mut output,
//!     std::io::sink(),
//! )
//! .unwrap();
//! assert_eq!(outcome.exit_code, 0);
//! assert_eq!(String::from_utf8(output).unwrap(), "42");
//! ```
//!
//! # Errors
//!
//! Every failure maps to a process exit code through `exit_code()`:
//! 31 and 32 for decode errors, 52 to 58 for runtime errors. See
//! [`codes`] for the full table.

mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};

pub use ipp_core::api::{Error, ExecutionOptions, run_program, run_source};
pub use ipp_core::parser::{ParseError, ParseErrorKind, parse};
pub use ipp_core::program::{Instruction, Opcode, Operand, Program, VarRef};
pub use ipp_core::values::{Value, ValueType};
pub use ipp_core::vm::{FatalError, InputSource, Interpreter, Outcome, codes};

pub use ipp_core::{frames, program, values, vm};
