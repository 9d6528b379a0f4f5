//! Fatal execution errors.
//!
//! Every failure in the engine is final: the first one stops the run and is
//! reported to the caller together with the process exit code it maps to.
//!
//! # Error Categories
//!
//! - **Structural** (32): operand count does not match the opcode.
//! - **Semantic** (52): redefinition, duplicate or unknown label.
//! - **Type** (53): operand of the wrong type or kind.
//! - **Variable** (54): the slot does not exist.
//! - **Frame** (55): no such frame, or an empty call/frame stack.
//! - **Value** (56): the slot holds no value, or the data stack is empty.
//! - **Runtime value** (57): division by zero, EXIT out of range.
//! - **String** (58): bad index or character code.

use thiserror::Error;

use crate::frames::Scope;
use crate::program::{Opcode, OperandKind, VarRef};
use crate::values::{TypeSet, ValueType};

/// Process exit codes.
pub mod codes {
    pub const BAD_ARGUMENTS: i32 = 10;
    pub const INPUT_FILE: i32 = 11;
    pub const OUTPUT_FILE: i32 = 12;
    pub const MALFORMED_PROGRAM: i32 = 31;
    pub const STRUCTURE: i32 = 32;
    pub const SEMANTIC: i32 = 52;
    pub const OPERAND_TYPE: i32 = 53;
    pub const UNDEFINED_VARIABLE: i32 = 54;
    pub const MISSING_FRAME: i32 = 55;
    pub const MISSING_VALUE: i32 = 56;
    pub const BAD_VALUE: i32 = 57;
    pub const STRING: i32 = 58;
}

#[derive(Debug, Error)]
pub enum FatalError {
    #[error("{opcode} takes {expected} operand(s), found {found}")]
    Arity {
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    #[error("label '{0}' is defined more than once")]
    DuplicateLabel(String),

    #[error("label '{0}' is not defined")]
    UndefinedLabel(String),

    #[error("variable {0} is already defined")]
    Redefinition(VarRef),

    #[error("expected an operand of type {expected}, found {found}")]
    OperandType { expected: TypeSet, found: ValueType },

    #[error("operands have different types: {left} and {right}")]
    TypeMismatch { left: ValueType, right: ValueType },

    #[error("operand {position} must be a {expected}, found {found}")]
    WrongOperandKind {
        position: usize,
        expected: OperandKind,
        found: &'static str,
    },

    #[error("variable {0} is not defined")]
    UndefinedVariable(VarRef),

    #[error("frame {0} does not exist")]
    MissingFrame(Scope),

    #[error("return with an empty call stack")]
    EmptyCallStack,

    #[error("variable {0} has no value")]
    MissingValue(VarRef),

    #[error("data stack is empty")]
    EmptyDataStack,

    #[error("division by zero")]
    DivisionByZero,

    #[error("exit code {0} is outside 0..=49")]
    InvalidExitCode(i64),

    #[error("{0} is not a valid character code")]
    InvalidCodePoint(i64),

    #[error("index {index} is out of range for a string of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("SETCHAR needs a non-empty replacement string")]
    EmptyReplacement,

    #[error("reading program input failed: {0}")]
    Input(std::io::Error),

    #[error("writing output failed: {0}")]
    Output(std::io::Error),
}

impl FatalError {
    pub fn exit_code(&self) -> i32 {
        use FatalError::*;
        match self {
            Arity { .. } => codes::STRUCTURE,
            DuplicateLabel(_) | UndefinedLabel(_) | Redefinition(_) => codes::SEMANTIC,
            OperandType { .. } | TypeMismatch { .. } | WrongOperandKind { .. } => codes::OPERAND_TYPE,
            UndefinedVariable(_) => codes::UNDEFINED_VARIABLE,
            MissingFrame(_) | EmptyCallStack => codes::MISSING_FRAME,
            MissingValue(_) | EmptyDataStack => codes::MISSING_VALUE,
            DivisionByZero | InvalidExitCode(_) => codes::BAD_VALUE,
            InvalidCodePoint(_) | IndexOutOfRange { .. } | EmptyReplacement => codes::STRING,
            Input(_) => codes::INPUT_FILE,
            Output(_) => codes::OUTPUT_FILE,
        }
    }
}

impl From<std::io::Error> for FatalError {
    fn from(e: std::io::Error) -> Self {
        FatalError::Output(e)
    }
}
