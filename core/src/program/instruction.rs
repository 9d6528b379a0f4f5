use core::fmt;
use core::ops::Range;

use ecow::EcoString;
use smallvec::SmallVec;

use crate::frames::Scope;
use crate::program::Opcode;
use crate::values::{Value, ValueType};

/// Byte range in the source text an instruction was decoded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span(start..end)
    }
}

/// A variable reference: the frame it lives in and its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub scope: Scope,
    pub name: EcoString,
}

impl VarRef {
    pub fn new(scope: Scope, name: impl Into<EcoString>) -> Self {
        Self {
            scope,
            name: name.into(),
        }
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.scope, self.name)
    }
}

/// A single instruction argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Variable(VarRef),
    Constant(Value),
    LabelRef(EcoString),
    TypeRef(ValueType),
}

impl Operand {
    pub fn var(scope: Scope, name: impl Into<EcoString>) -> Self {
        Operand::Variable(VarRef::new(scope, name))
    }

    pub fn label(name: impl Into<EcoString>) -> Self {
        Operand::LabelRef(name.into())
    }

    pub fn as_var(&self) -> Option<&VarRef> {
        match self {
            Operand::Variable(var) => Some(var),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            Operand::LabelRef(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Variable(var) => write!(f, "{}", var),
            Operand::Constant(value) => write!(f, "{}", value.literal()),
            Operand::LabelRef(name) => f.write_str(name),
            Operand::TypeRef(ty) => write!(f, "{}", ty),
        }
    }
}

/// One decoded instruction.
///
/// `order` is the 1-based position inside the owning [`Program`](super::Program).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: SmallVec<[Operand; 3]>,
    pub order: usize,
    pub span: Option<Span>,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: impl IntoIterator<Item = Operand>) -> Self {
        Self {
            opcode,
            operands: operands.into_iter().collect(),
            order: 0,
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn operand(&self, index: usize) -> Option<&Operand> {
        self.operands.get(index)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.name())?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}
