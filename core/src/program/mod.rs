//! Programs: ordered, immutable instruction sequences.

mod instruction;
mod opcode;

pub use instruction::{Instruction, Operand, Span, VarRef};
pub use opcode::{Opcode, OperandKind};

use hashbrown::HashSet;
use thiserror::Error;

/// Rejected instruction ordering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("instruction order must be a positive number, found {0}")]
    NotPositive(i64),
    #[error("instruction order {0} is used more than once")]
    Duplicate(i64),
}

/// An ordered instruction sequence with dense 1-based `order` numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Build a program from instructions already in execution order.
    pub fn new(instructions: impl IntoIterator<Item = Instruction>) -> Self {
        let mut instructions: Vec<Instruction> = instructions.into_iter().collect();
        renumber(&mut instructions);
        Self { instructions }
    }

    /// Build a program from explicitly numbered instructions.
    ///
    /// Numbers must be unique and at least 1 but need not be contiguous; the
    /// instructions are sorted by them and renumbered from 1.
    pub fn from_ordered(
        numbered: impl IntoIterator<Item = (i64, Instruction)>,
    ) -> Result<Self, OrderError> {
        let mut numbered: Vec<(i64, Instruction)> = numbered.into_iter().collect();
        let mut seen = HashSet::with_capacity(numbered.len());
        for (order, _) in &numbered {
            if *order < 1 {
                return Err(OrderError::NotPositive(*order));
            }
            if !seen.insert(*order) {
                return Err(OrderError::Duplicate(*order));
            }
        }
        numbered.sort_by_key(|(order, _)| *order);
        Ok(Self::new(numbered.into_iter().map(|(_, ins)| ins)))
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }
}

fn renumber(instructions: &mut [Instruction]) {
    for (index, ins) in instructions.iter_mut().enumerate() {
        ins.order = index + 1;
    }
}
