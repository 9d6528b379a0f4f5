//! The closed IPPcode22 instruction set.
//!
//! Every opcode has a fixed operand signature. The decoder checks operand
//! kinds against it and the execution loop re-checks the arity before
//! dispatching.

use core::fmt;

/// Kind of operand an opcode expects in a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// A variable reference (`GF@x`).
    Var,
    /// A variable reference or a typed constant.
    Symb,
    /// A label name.
    Label,
    /// A type name (`int`, `string`, `bool`, `nil`).
    Type,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperandKind::Var => "variable",
            OperandKind::Symb => "symbol",
            OperandKind::Label => "label",
            OperandKind::Type => "type",
        })
    }
}

macro_rules! opcodes {
    ($($variant:ident => $name:literal [$($kind:ident),*];)*) => {
        /// IPPcode22 opcode, including the stack (`-S`) extension.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Opcode {
            $($variant,)*
        }

        impl Opcode {
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant,)*];

            /// Upper-case mnemonic.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Opcode::$variant => $name,)*
                }
            }

            /// Operand kinds, in order.
            pub const fn signature(self) -> &'static [OperandKind] {
                match self {
                    $(Opcode::$variant => &[$(OperandKind::$kind),*],)*
                }
            }
        }
    };
}

opcodes! {
    // Frames and calls
    Move => "MOVE" [Var, Symb];
    CreateFrame => "CREATEFRAME" [];
    PushFrame => "PUSHFRAME" [];
    PopFrame => "POPFRAME" [];
    DefVar => "DEFVAR" [Var];
    Call => "CALL" [Label];
    Return => "RETURN" [];

    // Data stack
    PushS => "PUSHS" [Symb];
    PopS => "POPS" [Var];
    ClearS => "CLEARS" [];

    // Arithmetic, relational, boolean, conversion
    Add => "ADD" [Var, Symb, Symb];
    Sub => "SUB" [Var, Symb, Symb];
    Mul => "MUL" [Var, Symb, Symb];
    IDiv => "IDIV" [Var, Symb, Symb];
    Lt => "LT" [Var, Symb, Symb];
    Gt => "GT" [Var, Symb, Symb];
    Eq => "EQ" [Var, Symb, Symb];
    And => "AND" [Var, Symb, Symb];
    Or => "OR" [Var, Symb, Symb];
    Not => "NOT" [Var, Symb];
    Int2Char => "INT2CHAR" [Var, Symb];
    Stri2Int => "STRI2INT" [Var, Symb, Symb];

    // Stack variants
    AddS => "ADDS" [];
    SubS => "SUBS" [];
    MulS => "MULS" [];
    IDivS => "IDIVS" [];
    LtS => "LTS" [];
    GtS => "GTS" [];
    EqS => "EQS" [];
    AndS => "ANDS" [];
    OrS => "ORS" [];
    NotS => "NOTS" [];
    Int2CharS => "INT2CHARS" [];
    Stri2IntS => "STRI2INTS" [];

    // Input/output
    Read => "READ" [Var, Type];
    Write => "WRITE" [Symb];

    // Strings
    Concat => "CONCAT" [Var, Symb, Symb];
    StrLen => "STRLEN" [Var, Symb];
    GetChar => "GETCHAR" [Var, Symb, Symb];
    SetChar => "SETCHAR" [Var, Symb, Symb];

    // Types
    Type => "TYPE" [Var, Symb];

    // Control flow
    Label => "LABEL" [Label];
    Jump => "JUMP" [Label];
    JumpIfEq => "JUMPIFEQ" [Label, Symb, Symb];
    JumpIfNeq => "JUMPIFNEQ" [Label, Symb, Symb];
    JumpIfEqS => "JUMPIFEQS" [Label];
    JumpIfNeqS => "JUMPIFNEQS" [Label];
    Exit => "EXIT" [Symb];

    // Debugging
    DPrint => "DPRINT" [Symb];
    Break => "BREAK" [];
}

impl Opcode {
    /// Look up an opcode by mnemonic, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Opcode> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }

    pub const fn arity(self) -> usize {
        self.signature().len()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
