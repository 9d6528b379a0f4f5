//! Operand resolution and type checking.
//!
//! A symbol resolves to a value either from the frame store (variable) or
//! from the instruction itself (constant). The `-S` instruction family takes
//! its operands from the data stack instead; [`pop_operand`] and
//! [`pop_pair`] apply the same type rules there.

use ecow::EcoString;

use crate::frames::FrameStore;
use crate::program::VarRef;
use crate::values::{TypeSet, Value};
use crate::vm::{FatalError, Stack};

/// An operand that denotes a value.
#[derive(Debug, Clone, Copy)]
pub enum Symbol<'a> {
    Variable(&'a VarRef),
    Constant(&'a Value),
}

/// Fails with a type error unless `value`'s type is in `allowed`.
pub fn check(allowed: TypeSet, value: Value) -> Result<Value, FatalError> {
    let found = value.ty();
    if allowed.admits(found) {
        Ok(value)
    } else {
        Err(FatalError::OperandType {
            expected: allowed,
            found,
        })
    }
}

/// Binary arithmetic and comparison never mix types.
pub fn require_same_type(a: &Value, b: &Value) -> Result<(), FatalError> {
    if a.ty() == b.ty() {
        Ok(())
    } else {
        Err(FatalError::TypeMismatch {
            left: a.ty(),
            right: b.ty(),
        })
    }
}

/// Resolve `symbol` to a value whose type is in `allowed`.
///
/// Variables must exist and hold a value; the store's errors are passed
/// through unchanged.
pub fn resolve(
    store: &FrameStore,
    allowed: TypeSet,
    symbol: Symbol<'_>,
) -> Result<Value, FatalError> {
    let value = match symbol {
        Symbol::Variable(var) => store.read(var)?.clone(),
        Symbol::Constant(value) => value.clone(),
    };
    check(allowed, value)
}

pub fn resolve_pair(
    store: &FrameStore,
    allowed_a: TypeSet,
    allowed_b: TypeSet,
    a: Symbol<'_>,
    b: Symbol<'_>,
) -> Result<(Value, Value), FatalError> {
    let a = resolve(store, allowed_a, a)?;
    let b = resolve(store, allowed_b, b)?;
    Ok((a, b))
}

pub fn into_int(value: Value) -> Result<i64, FatalError> {
    match value {
        Value::Int(n) => Ok(n),
        other => Err(FatalError::OperandType {
            expected: TypeSet::INT,
            found: other.ty(),
        }),
    }
}

pub fn into_bool(value: Value) -> Result<bool, FatalError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(FatalError::OperandType {
            expected: TypeSet::BOOL,
            found: other.ty(),
        }),
    }
}

pub fn into_str(value: Value) -> Result<EcoString, FatalError> {
    match value {
        Value::Str(text) => Ok(text),
        other => Err(FatalError::OperandType {
            expected: TypeSet::STRING,
            found: other.ty(),
        }),
    }
}

/// Pop one operand off the data stack.
pub fn pop_operand(stack: &mut Stack<Value>, allowed: TypeSet) -> Result<Value, FatalError> {
    let value = stack.pop().ok_or(FatalError::EmptyDataStack)?;
    check(allowed, value)
}

/// Pop two operands; the top of the stack is the second one.
pub fn pop_pair(
    stack: &mut Stack<Value>,
    allowed_a: TypeSet,
    allowed_b: TypeSet,
) -> Result<(Value, Value), FatalError> {
    let b = stack.pop().ok_or(FatalError::EmptyDataStack)?;
    let a = stack.pop().ok_or(FatalError::EmptyDataStack)?;
    Ok((check(allowed_a, a)?, check(allowed_b, b)?))
}
