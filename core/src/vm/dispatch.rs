//! Per-opcode handlers.
//!
//! Instructions that store a result check that the destination variable
//! exists before any source operand is resolved.

use std::io::Write;

use ecow::EcoString;

use crate::program::{Instruction, Opcode, Operand, OperandKind, VarRef};
use crate::values::{TypeSet, Value, ValueType};
use crate::vm::operators::{self, ArithOp, BoolOp, RelOp};
use crate::vm::resolver::{self, Symbol, into_bool, into_int, into_str};
use crate::vm::{ControlSignal, FatalError, InputSource, Interpreter};

/// Typed access to an instruction's operands by position.
struct Args<'a>(&'a Instruction);

impl<'a> Args<'a> {
    fn get(&self, position: usize) -> Result<&'a Operand, FatalError> {
        self.0.operand(position).ok_or(FatalError::Arity {
            opcode: self.0.opcode,
            expected: self.0.opcode.arity(),
            found: self.0.operands.len(),
        })
    }

    fn var(&self, position: usize) -> Result<&'a VarRef, FatalError> {
        match self.get(position)? {
            Operand::Variable(var) => Ok(var),
            other => Err(wrong_kind(position, OperandKind::Var, other)),
        }
    }

    fn symb(&self, position: usize) -> Result<Symbol<'a>, FatalError> {
        match self.get(position)? {
            Operand::Variable(var) => Ok(Symbol::Variable(var)),
            Operand::Constant(value) => Ok(Symbol::Constant(value)),
            other => Err(wrong_kind(position, OperandKind::Symb, other)),
        }
    }

    fn label(&self, position: usize) -> Result<&'a str, FatalError> {
        match self.get(position)? {
            Operand::LabelRef(name) => Ok(name.as_str()),
            other => Err(wrong_kind(position, OperandKind::Label, other)),
        }
    }

    fn type_ref(&self, position: usize) -> Result<ValueType, FatalError> {
        match self.get(position)? {
            Operand::TypeRef(ty) => Ok(*ty),
            other => Err(wrong_kind(position, OperandKind::Type, other)),
        }
    }
}

fn wrong_kind(position: usize, expected: OperandKind, found: &Operand) -> FatalError {
    FatalError::WrongOperandKind {
        position: position + 1,
        expected,
        found: match found {
            Operand::Variable(_) => "variable",
            Operand::Constant(_) => "constant",
            Operand::LabelRef(_) => "label",
            Operand::TypeRef(_) => "type",
        },
    }
}

fn char_string(ch: char) -> EcoString {
    let mut text = EcoString::new();
    text.push(ch);
    text
}

impl<R, W, E> Interpreter<'_, R, W, E>
where
    R: InputSource,
    W: Write,
    E: Write,
{
    pub(super) fn step(&mut self, ins: &Instruction) -> Result<ControlSignal, FatalError> {
        let args = Args(ins);
        match ins.opcode {
            Opcode::Move => {
                let dst = self.destination(&args)?;
                let value = self.resolve(TypeSet::ANY, args.symb(1)?)?;
                self.assign(dst, value)
            }
            Opcode::CreateFrame => {
                self.store.create_temporary();
                Ok(ControlSignal::Continue)
            }
            Opcode::PushFrame => {
                self.store.promote_temporary()?;
                Ok(ControlSignal::Continue)
            }
            Opcode::PopFrame => {
                self.store.demote_local()?;
                Ok(ControlSignal::Continue)
            }
            Opcode::DefVar => {
                self.store.define(args.var(0)?)?;
                Ok(ControlSignal::Continue)
            }
            Opcode::Call => Ok(ControlSignal::Call(self.labels.lookup(args.label(0)?)?)),
            Opcode::Return => Ok(ControlSignal::Return),

            Opcode::PushS => {
                let value = self.resolve(TypeSet::ANY, args.symb(0)?)?;
                Ok(self.push(value))
            }
            Opcode::PopS => {
                let dst = self.destination(&args)?;
                let value = resolver::pop_operand(&mut self.data, TypeSet::ANY)?;
                self.assign(dst, value)
            }
            Opcode::ClearS => {
                self.data.clear();
                Ok(ControlSignal::Continue)
            }

            Opcode::Add => self.arithmetic(&args, ArithOp::Add),
            Opcode::Sub => self.arithmetic(&args, ArithOp::Sub),
            Opcode::Mul => self.arithmetic(&args, ArithOp::Mul),
            Opcode::IDiv => self.arithmetic(&args, ArithOp::IDiv),
            Opcode::Lt => self.relational(&args, RelOp::Lt),
            Opcode::Gt => self.relational(&args, RelOp::Gt),
            Opcode::Eq => self.relational(&args, RelOp::Eq),
            Opcode::And => self.logic(&args, BoolOp::And),
            Opcode::Or => self.logic(&args, BoolOp::Or),
            Opcode::Not => {
                let dst = self.destination(&args)?;
                let value = into_bool(self.resolve(TypeSet::BOOL, args.symb(1)?)?)?;
                self.assign(dst, Value::Bool(!value))
            }
            Opcode::Int2Char => {
                let dst = self.destination(&args)?;
                let code = into_int(self.resolve(TypeSet::INT, args.symb(1)?)?)?;
                self.assign(dst, Value::Str(operators::int_to_char(code)?))
            }
            Opcode::Stri2Int => {
                let dst = self.destination(&args)?;
                let (text, index) =
                    self.resolve_pair(TypeSet::STRING, TypeSet::INT, args.symb(1)?, args.symb(2)?)?;
                let code = operators::string_to_int(&into_str(text)?, into_int(index)?)?;
                self.assign(dst, Value::Int(code))
            }

            Opcode::AddS => self.arithmetic_s(ArithOp::Add),
            Opcode::SubS => self.arithmetic_s(ArithOp::Sub),
            Opcode::MulS => self.arithmetic_s(ArithOp::Mul),
            Opcode::IDivS => self.arithmetic_s(ArithOp::IDiv),
            Opcode::LtS => self.relational_s(RelOp::Lt),
            Opcode::GtS => self.relational_s(RelOp::Gt),
            Opcode::EqS => self.relational_s(RelOp::Eq),
            Opcode::AndS => self.logic_s(BoolOp::And),
            Opcode::OrS => self.logic_s(BoolOp::Or),
            Opcode::NotS => {
                let value = into_bool(resolver::pop_operand(&mut self.data, TypeSet::BOOL)?)?;
                Ok(self.push(Value::Bool(!value)))
            }
            Opcode::Int2CharS => {
                let code = into_int(resolver::pop_operand(&mut self.data, TypeSet::INT)?)?;
                let text = operators::int_to_char(code)?;
                Ok(self.push(Value::Str(text)))
            }
            Opcode::Stri2IntS => {
                let (text, index) =
                    resolver::pop_pair(&mut self.data, TypeSet::STRING, TypeSet::INT)?;
                let code = operators::string_to_int(&into_str(text)?, into_int(index)?)?;
                Ok(self.push(Value::Int(code)))
            }

            Opcode::Read => {
                let dst = self.destination(&args)?;
                let ty = args.type_ref(1)?;
                let line = self.input.read_line().map_err(FatalError::Input)?;
                let value = match line {
                    Some(line) => operators::parse_input(ty, &line),
                    None => Value::Nil,
                };
                self.assign(dst, value)
            }
            Opcode::Write => {
                let value = self.resolve(TypeSet::ANY, args.symb(0)?)?;
                write!(self.output, "{}", value)?;
                Ok(ControlSignal::Continue)
            }

            Opcode::Concat => {
                let dst = self.destination(&args)?;
                let (left, right) = self.resolve_pair(
                    TypeSet::STRING,
                    TypeSet::STRING,
                    args.symb(1)?,
                    args.symb(2)?,
                )?;
                let joined = operators::concat(&into_str(left)?, &into_str(right)?);
                self.assign(dst, Value::Str(joined))
            }
            Opcode::StrLen => {
                let dst = self.destination(&args)?;
                let text = into_str(self.resolve(TypeSet::STRING, args.symb(1)?)?)?;
                self.assign(dst, Value::Int(operators::str_len(&text)))
            }
            Opcode::GetChar => {
                let dst = self.destination(&args)?;
                let (text, index) =
                    self.resolve_pair(TypeSet::STRING, TypeSet::INT, args.symb(1)?, args.symb(2)?)?;
                let ch = operators::char_at(&into_str(text)?, into_int(index)?)?;
                self.assign(dst, Value::Str(char_string(ch)))
            }
            Opcode::SetChar => {
                let dst = self.destination(&args)?;
                let current = into_str(self.store.read(dst)?.clone())?;
                let (index, with) =
                    self.resolve_pair(TypeSet::INT, TypeSet::STRING, args.symb(1)?, args.symb(2)?)?;
                let updated = operators::set_char(&current, into_int(index)?, &into_str(with)?)?;
                self.assign(dst, Value::Str(updated))
            }

            Opcode::Type => {
                let dst = self.destination(&args)?;
                // An unset variable has no type and reports the empty string.
                let name = match args.symb(1)? {
                    Symbol::Variable(var) => self
                        .store
                        .slot(var)?
                        .as_ref()
                        .map_or("", |value| value.ty().name()),
                    Symbol::Constant(value) => value.ty().name(),
                };
                self.assign(dst, Value::str(name))
            }

            Opcode::Label => Ok(ControlSignal::Continue),
            Opcode::Jump => Ok(ControlSignal::Jump(self.labels.lookup(args.label(0)?)?)),
            Opcode::JumpIfEq => self.conditional_jump(&args, true),
            Opcode::JumpIfNeq => self.conditional_jump(&args, false),
            Opcode::JumpIfEqS => self.conditional_jump_s(&args, true),
            Opcode::JumpIfNeqS => self.conditional_jump_s(&args, false),
            Opcode::Exit => {
                let code = into_int(self.resolve(TypeSet::INT, args.symb(0)?)?)?;
                Ok(ControlSignal::Halt(operators::exit_code(code)?))
            }

            Opcode::DPrint => {
                let value = self.resolve(TypeSet::ANY, args.symb(0)?)?;
                write!(self.diagnostics, "{}", value)?;
                Ok(ControlSignal::Continue)
            }
            Opcode::Break => {
                self.dump_state()?;
                Ok(ControlSignal::Continue)
            }
        }
    }

    /// The first operand as a variable that must already exist.
    fn destination<'a>(&self, args: &Args<'a>) -> Result<&'a VarRef, FatalError> {
        let var = args.var(0)?;
        self.store.slot(var)?;
        Ok(var)
    }

    fn resolve(&self, allowed: TypeSet, symbol: Symbol<'_>) -> Result<Value, FatalError> {
        resolver::resolve(&self.store, allowed, symbol)
    }

    fn resolve_pair(
        &self,
        allowed_a: TypeSet,
        allowed_b: TypeSet,
        a: Symbol<'_>,
        b: Symbol<'_>,
    ) -> Result<(Value, Value), FatalError> {
        resolver::resolve_pair(&self.store, allowed_a, allowed_b, a, b)
    }

    fn assign(&mut self, var: &VarRef, value: Value) -> Result<ControlSignal, FatalError> {
        self.store.write(var, value)?;
        Ok(ControlSignal::Continue)
    }

    fn push(&mut self, value: Value) -> ControlSignal {
        self.data.push(value);
        ControlSignal::Continue
    }

    fn arithmetic(&mut self, args: &Args<'_>, op: ArithOp) -> Result<ControlSignal, FatalError> {
        let dst = self.destination(args)?;
        let (a, b) = self.resolve_pair(TypeSet::INT, TypeSet::INT, args.symb(1)?, args.symb(2)?)?;
        let result = operators::arithmetic(op, into_int(a)?, into_int(b)?)?;
        self.assign(dst, Value::Int(result))
    }

    fn arithmetic_s(&mut self, op: ArithOp) -> Result<ControlSignal, FatalError> {
        let (a, b) = resolver::pop_pair(&mut self.data, TypeSet::INT, TypeSet::INT)?;
        let result = operators::arithmetic(op, into_int(a)?, into_int(b)?)?;
        Ok(self.push(Value::Int(result)))
    }

    fn relational(&mut self, args: &Args<'_>, op: RelOp) -> Result<ControlSignal, FatalError> {
        let allowed = relational_operands(op);
        let dst = self.destination(args)?;
        let (a, b) = self.resolve_pair(allowed, allowed, args.symb(1)?, args.symb(2)?)?;
        let result = operators::relational(op, &a, &b)?;
        self.assign(dst, Value::Bool(result))
    }

    fn relational_s(&mut self, op: RelOp) -> Result<ControlSignal, FatalError> {
        let allowed = relational_operands(op);
        let (a, b) = resolver::pop_pair(&mut self.data, allowed, allowed)?;
        let result = operators::relational(op, &a, &b)?;
        Ok(self.push(Value::Bool(result)))
    }

    fn logic(&mut self, args: &Args<'_>, op: BoolOp) -> Result<ControlSignal, FatalError> {
        let dst = self.destination(args)?;
        let (a, b) = self.resolve_pair(TypeSet::BOOL, TypeSet::BOOL, args.symb(1)?, args.symb(2)?)?;
        let result = operators::logic(op, into_bool(a)?, into_bool(b)?);
        self.assign(dst, Value::Bool(result))
    }

    fn logic_s(&mut self, op: BoolOp) -> Result<ControlSignal, FatalError> {
        let (a, b) = resolver::pop_pair(&mut self.data, TypeSet::BOOL, TypeSet::BOOL)?;
        let result = operators::logic(op, into_bool(a)?, into_bool(b)?);
        Ok(self.push(Value::Bool(result)))
    }

    /// `JUMPIFEQ` when `when_equal`, `JUMPIFNEQ` otherwise. The label is
    /// looked up even if the jump is not taken.
    fn conditional_jump(
        &mut self,
        args: &Args<'_>,
        when_equal: bool,
    ) -> Result<ControlSignal, FatalError> {
        let target = self.labels.lookup(args.label(0)?)?;
        let (a, b) = self.resolve_pair(TypeSet::ANY, TypeSet::ANY, args.symb(1)?, args.symb(2)?)?;
        Ok(jump_if(operators::equals(&a, &b)? == when_equal, target))
    }

    fn conditional_jump_s(
        &mut self,
        args: &Args<'_>,
        when_equal: bool,
    ) -> Result<ControlSignal, FatalError> {
        let target = self.labels.lookup(args.label(0)?)?;
        let (a, b) = resolver::pop_pair(&mut self.data, TypeSet::ANY, TypeSet::ANY)?;
        Ok(jump_if(operators::equals(&a, &b)? == when_equal, target))
    }
}

fn relational_operands(op: RelOp) -> TypeSet {
    match op {
        RelOp::Eq => TypeSet::ANY,
        RelOp::Lt | RelOp::Gt => TypeSet::ORDERED,
    }
}

fn jump_if(condition: bool, target: usize) -> ControlSignal {
    if condition {
        ControlSignal::Jump(target)
    } else {
        ControlSignal::Continue
    }
}
