use core::cmp::Ordering;
use core::fmt;

use bitflags::bitflags;
use ecow::EcoString;

/// Runtime type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    String,
    Bool,
    Nil,
}

impl ValueType {
    /// Name used by IPPcode22 for this type (`int`, `string`, `bool`, `nil`).
    pub const fn name(self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::String => "string",
            ValueType::Bool => "bool",
            ValueType::Nil => "nil",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ValueType::Int),
            "string" => Some(ValueType::String),
            "bool" => Some(ValueType::Bool),
            "nil" => Some(ValueType::Nil),
            _ => None,
        }
    }

    /// The single-member [`TypeSet`] for this type.
    pub const fn as_set(self) -> TypeSet {
        match self {
            ValueType::Int => TypeSet::INT,
            ValueType::String => TypeSet::STRING,
            ValueType::Bool => TypeSet::BOOL,
            ValueType::Nil => TypeSet::NIL,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of value types an operand is allowed to resolve to.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct TypeSet: u8 {
        const INT = 1;
        const STRING = 1 << 1;
        const BOOL = 1 << 2;
        const NIL = 1 << 3;

        /// Types with an ordering (`LT`/`GT` operands).
        const ORDERED = Self::INT.bits() | Self::STRING.bits() | Self::BOOL.bits();
        const ANY = Self::ORDERED.bits() | Self::NIL.bits();
    }
}

impl TypeSet {
    pub fn admits(self, ty: ValueType) -> bool {
        self.contains(ty.as_set())
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for ty in [ValueType::Int, ValueType::String, ValueType::Bool, ValueType::Nil] {
            if self.admits(ty) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(ty.name())?;
                first = false;
            }
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

/// An immutable, typed runtime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(EcoString),
    Bool(bool),
    Nil,
}

impl Value {
    pub fn str(text: impl Into<EcoString>) -> Self {
        Value::Str(text.into())
    }

    pub fn ty(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Str(_) => ValueType::String,
            Value::Bool(_) => ValueType::Bool,
            Value::Nil => ValueType::Nil,
        }
    }

    /// Ordering between two values of the same ordered type.
    ///
    /// Ints compare numerically, strings by character, bools with
    /// `false < true`. Returns `None` for mixed types and for nil.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.as_str().cmp(b.as_str())),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality as `EQ` and the conditional jumps see it.
    ///
    /// Same-typed values compare normally. When the types differ and one
    /// side is nil the answer is `false`. Any other mix is `None`.
    pub fn loose_eq(&self, other: &Value) -> Option<bool> {
        if self.ty() == other.ty() {
            Some(self == other)
        } else if matches!(self, Value::Nil) || matches!(other, Value::Nil) {
            Some(false)
        } else {
            None
        }
    }

    /// Typed literal form (`int@5`, `string@a\032b`), used in state dumps.
    pub fn literal(&self) -> Literal<'_> {
        Literal(self)
    }
}

/// Output form: what `WRITE` prints.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Str(value) => f.write_str(value),
            Value::Bool(true) => f.write_str("true"),
            Value::Bool(false) => f.write_str("false"),
            Value::Nil => Ok(()),
        }
    }
}

pub struct Literal<'a>(&'a Value);

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Nil => f.write_str("nil@nil"),
            Value::Str(text) => {
                f.write_str("string@")?;
                for ch in text.chars() {
                    if ch.is_whitespace() || ch.is_control() || ch == '#' || ch == '\\' {
                        write!(f, "\\{:03}", ch as u32)?;
                    } else {
                        write!(f, "{}", ch)?;
                    }
                }
                Ok(())
            }
            other => write!(f, "{}@{}", other.ty(), other),
        }
    }
}
