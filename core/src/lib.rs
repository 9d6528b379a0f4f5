//! Execution engine for IPPcode22 programs.
//!
//! The crate is split leaf to root:
//!
//! - [`values`]: typed runtime values and type sets
//! - [`program`]: opcodes, operands and the instruction sequence
//! - [`parser`]: decodes IPPcode22 source text into a [`program::Program`]
//! - [`frames`]: global/local/temporary frames and variable slots
//! - [`vm`]: stacks, label table, operand resolver and the execution loop
//! - [`api`]: options, the public error type and one-call helpers

pub mod api;
pub mod frames;
pub mod parser;
pub mod program;
pub mod values;
pub mod vm;
