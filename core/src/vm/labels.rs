use ecow::EcoString;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use tracing::debug;

use crate::program::{Opcode, Program};
use crate::vm::FatalError;

/// Label name to instruction index, built once before execution starts.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    targets: HashMap<EcoString, usize>,
}

impl LabelTable {
    /// Scan every `LABEL` in `program`.
    ///
    /// A name defined twice is rejected here, wherever the two definitions
    /// sit and whether or not either is ever reached.
    pub fn build(program: &Program) -> Result<Self, FatalError> {
        let mut targets = HashMap::new();
        for (index, ins) in program.iter().enumerate() {
            if ins.opcode != Opcode::Label {
                continue;
            }
            let Some(name) = ins.operand(0).and_then(|op| op.as_label()) else {
                continue;
            };
            match targets.entry(EcoString::from(name)) {
                Entry::Occupied(_) => return Err(FatalError::DuplicateLabel(name.to_string())),
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
            }
        }
        debug!(labels = targets.len(), "built label table");
        Ok(Self { targets })
    }

    /// Index of the `LABEL` instruction named `name`.
    pub fn lookup(&self, name: &str) -> Result<usize, FatalError> {
        self.targets
            .get(name)
            .copied()
            .ok_or_else(|| FatalError::UndefinedLabel(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{Instruction, Operand};

    fn label(name: &str) -> Instruction {
        Instruction::new(Opcode::Label, [Operand::label(name)])
    }

    fn nop() -> Instruction {
        Instruction::new(Opcode::CreateFrame, Vec::new())
    }

    #[test]
    fn test_maps_every_label_to_its_index() {
        let program = Program::new([nop(), label("a"), nop(), nop(), label("b")]);
        let table = LabelTable::build(&program).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("a").unwrap(), 1);
        assert_eq!(table.lookup("b").unwrap(), 4);
    }

    #[test]
    fn test_duplicate_label_fails_at_build_time() {
        for program in [
            Program::new([label("x"), label("x")]),
            Program::new([label("x"), nop(), nop(), label("x")]),
            Program::new([nop(), label("y"), label("x"), label("x")]),
        ] {
            let err = LabelTable::build(&program).unwrap_err();
            assert!(matches!(err, FatalError::DuplicateLabel(ref name) if name == "x"));
            assert_eq!(err.exit_code(), 52);
        }
    }

    #[test]
    fn test_unknown_label() {
        let table = LabelTable::build(&Program::new([label("a")])).unwrap();
        let err = table.lookup("b").unwrap_err();
        assert!(matches!(err, FatalError::UndefinedLabel(_)));
        assert_eq!(err.exit_code(), 52);
    }
}
