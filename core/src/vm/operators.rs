//! Instruction semantics shared by the operand and stack forms.
//!
//! Inputs are already resolved and type-checked against each opcode's allowed
//! set, so these functions only enforce the rules that involve both operands
//! or the operand values themselves.

use core::cmp::Ordering;

use ecow::EcoString;

use crate::values::{Value, ValueType};
use crate::vm::FatalError;
use crate::vm::resolver::require_same_type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    IDiv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Lt,
    Gt,
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// Integer arithmetic.
///
/// Uses wrapping arithmetic to prevent panics on overflow. `IDiv` rounds
/// toward negative infinity; a zero divisor is an error.
pub fn arithmetic(op: ArithOp, left: i64, right: i64) -> Result<i64, FatalError> {
    match op {
        ArithOp::Add => Ok(left.wrapping_add(right)),
        ArithOp::Sub => Ok(left.wrapping_sub(right)),
        ArithOp::Mul => Ok(left.wrapping_mul(right)),
        ArithOp::IDiv => {
            if right == 0 {
                return Err(FatalError::DivisionByZero);
            }
            let quotient = left.wrapping_div(right);
            if left.wrapping_rem(right) != 0 && ((left < 0) != (right < 0)) {
                Ok(quotient - 1)
            } else {
                Ok(quotient)
            }
        }
    }
}

/// `LT`, `GT` and `EQ`.
///
/// Ordering needs two values of the same ordered type. Equality follows
/// [`Value::loose_eq`]: nil against anything else is `false`, other mixes
/// are a type error.
pub fn relational(op: RelOp, left: &Value, right: &Value) -> Result<bool, FatalError> {
    match op {
        RelOp::Eq => equals(left, right),
        RelOp::Lt | RelOp::Gt => {
            require_same_type(left, right)?;
            let ordering = left
                .compare(right)
                .ok_or(FatalError::TypeMismatch {
                    left: left.ty(),
                    right: right.ty(),
                })?;
            Ok(match op {
                RelOp::Lt => ordering == Ordering::Less,
                _ => ordering == Ordering::Greater,
            })
        }
    }
}

pub fn equals(left: &Value, right: &Value) -> Result<bool, FatalError> {
    left.loose_eq(right).ok_or(FatalError::TypeMismatch {
        left: left.ty(),
        right: right.ty(),
    })
}

pub fn logic(op: BoolOp, left: bool, right: bool) -> bool {
    match op {
        BoolOp::And => left && right,
        BoolOp::Or => left || right,
    }
}

pub fn int_to_char(code: i64) -> Result<EcoString, FatalError> {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(|ch| {
            let mut text = EcoString::new();
            text.push(ch);
            text
        })
        .ok_or(FatalError::InvalidCodePoint(code))
}

/// Character at `index`, counting Unicode scalar values.
pub fn char_at(text: &str, index: i64) -> Result<char, FatalError> {
    let out_of_range = || FatalError::IndexOutOfRange {
        index,
        len: text.chars().count(),
    };
    let position = usize::try_from(index).map_err(|_| out_of_range())?;
    text.chars().nth(position).ok_or_else(out_of_range)
}

pub fn string_to_int(text: &str, index: i64) -> Result<i64, FatalError> {
    char_at(text, index).map(|ch| ch as i64)
}

pub fn concat(left: &str, right: &str) -> EcoString {
    let mut joined = EcoString::from(left);
    joined.push_str(right);
    joined
}

pub fn str_len(text: &str) -> i64 {
    text.chars().count() as i64
}

/// Replace the character at `index` with the first character of `with`.
pub fn set_char(text: &str, index: i64, with: &str) -> Result<EcoString, FatalError> {
    char_at(text, index)?;
    let replacement = with.chars().next().ok_or(FatalError::EmptyReplacement)?;
    // `char_at` proved that `index` is a valid, non-negative position.
    let position = index as usize;
    Ok(text
        .chars()
        .enumerate()
        .map(|(i, ch)| if i == position { replacement } else { ch })
        .collect())
}

/// `EXIT` accepts 0 through 49.
pub fn exit_code(code: i64) -> Result<i32, FatalError> {
    if (0..=49).contains(&code) {
        Ok(code as i32)
    } else {
        Err(FatalError::InvalidExitCode(code))
    }
}

/// Convert a line read by `READ` into a value of the requested type.
///
/// Unparsable integers become nil; booleans are `true` only for a
/// case-insensitive "true".
pub fn parse_input(ty: ValueType, line: &str) -> Value {
    match ty {
        ValueType::Int => line.trim().parse::<i64>().map(Value::Int).unwrap_or(Value::Nil),
        ValueType::Bool => Value::Bool(line.trim().eq_ignore_ascii_case("true")),
        ValueType::String => Value::str(line),
        ValueType::Nil => Value::Nil,
    }
}
