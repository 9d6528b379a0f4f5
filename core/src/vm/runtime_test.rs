//! Unit tests for the execution loop and the opcode handlers.

use super::*;
use crate::frames::Scope;
use crate::program::{Instruction, Opcode, Operand, VarRef};
use crate::values::ValueType;
use pretty_assertions::assert_eq;

fn gf(name: &str) -> Operand {
    Operand::var(Scope::Global, name)
}

fn lf(name: &str) -> Operand {
    Operand::var(Scope::Local, name)
}

fn tf(name: &str) -> Operand {
    Operand::var(Scope::Temporary, name)
}

fn int(n: i64) -> Operand {
    Operand::Constant(Value::Int(n))
}

fn string(text: &str) -> Operand {
    Operand::Constant(Value::str(text))
}

fn boolean(b: bool) -> Operand {
    Operand::Constant(Value::Bool(b))
}

fn nil() -> Operand {
    Operand::Constant(Value::Nil)
}

fn label(name: &str) -> Operand {
    Operand::label(name)
}

fn ins<const N: usize>(opcode: Opcode, operands: [Operand; N]) -> Instruction {
    Instruction::new(opcode, operands)
}

fn defvar(name: &str) -> Instruction {
    ins(Opcode::DefVar, [gf(name)])
}

/// Result of running a program to completion or failure.
struct Run {
    result: Result<Outcome, FatalError>,
    stdout: String,
    stderr: String,
    failed_at: Option<usize>,
    globals: Vec<(String, Option<Value>)>,
}

impl Run {
    fn exit_code(&self) -> i32 {
        match &self.result {
            Ok(outcome) => outcome.exit_code,
            Err(err) => err.exit_code(),
        }
    }

    fn global(&self, name: &str) -> Option<Value> {
        self.globals
            .iter()
            .find(|(var, _)| var == name)
            .and_then(|(_, slot)| slot.clone())
    }
}

fn run_with(program: Vec<Instruction>, input: &str, options: ExecutionOptions) -> Run {
    crate::test_utils::init_test_logging();
    let program = Program::new(program);
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut interpreter =
        match Interpreter::new(&program, options, input.as_bytes(), &mut stdout, &mut stderr) {
            Ok(interpreter) => interpreter,
            Err(err) => {
                return Run {
                    result: Err(err),
                    stdout: String::new(),
                    stderr: String::new(),
                    failed_at: None,
                    globals: Vec::new(),
                };
            }
        };
    let result = interpreter.run();
    let failed_at = result
        .as_ref()
        .err()
        .and_then(|_| interpreter.current())
        .map(|ins| ins.order);
    let globals = interpreter
        .store()
        .frame(Scope::Global)
        .map(|frame| {
            frame
                .sorted()
                .into_iter()
                .map(|(name, slot)| (name.to_string(), slot.clone()))
                .collect()
        })
        .unwrap_or_default();
    drop(interpreter);
    Run {
        result,
        stdout: String::from_utf8(stdout).unwrap(),
        stderr: String::from_utf8(stderr).unwrap(),
        failed_at,
        globals,
    }
}

fn run(program: Vec<Instruction>) -> Run {
    run_with(program, "", ExecutionOptions::default())
}

// ============================================================================
// Frames and variables
// ============================================================================

#[test]
fn test_temporary_frame_becomes_local() {
    let result = run(vec![
        ins(Opcode::CreateFrame, []),
        ins(Opcode::DefVar, [tf("x")]),
        ins(Opcode::Move, [tf("x"), int(7)]),
        ins(Opcode::PushFrame, []),
        ins(Opcode::Write, [lf("x")]),
    ]);
    assert_eq!(result.stdout, "7");
    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.result.unwrap().executed, 5);
}

#[test]
fn test_redefinition() {
    let result = run(vec![defvar("x"), defvar("x")]);
    assert!(matches!(result.result, Err(FatalError::Redefinition(_))));
    assert_eq!(result.exit_code(), 52);
    assert_eq!(result.failed_at, Some(2));
}

#[test]
fn test_unset_and_undefined_reads() {
    let unset = run(vec![defvar("x"), ins(Opcode::Write, [gf("x")])]);
    assert_eq!(unset.exit_code(), 56);

    let undefined = run(vec![ins(Opcode::Write, [gf("x")])]);
    assert_eq!(undefined.exit_code(), 54);
}

#[test]
fn test_destination_checked_before_sources() {
    // The source is unset (56) but the missing destination wins (54).
    let result = run(vec![defvar("src"), ins(Opcode::Move, [gf("dst"), gf("src")])]);
    assert!(matches!(result.result, Err(FatalError::UndefinedVariable(_))));
}

#[test]
fn test_destination_must_be_variable() {
    let result = run(vec![ins(Opcode::Move, [int(1), int(2)])]);
    assert!(matches!(
        result.result,
        Err(FatalError::WrongOperandKind { position: 1, .. })
    ));
    assert_eq!(result.exit_code(), 53);
}

#[test]
fn test_frame_errors() {
    assert_eq!(run(vec![ins(Opcode::PushFrame, [])]).exit_code(), 55);
    assert_eq!(run(vec![ins(Opcode::PopFrame, [])]).exit_code(), 55);
    assert_eq!(run(vec![ins(Opcode::DefVar, [lf("x")])]).exit_code(), 55);
    assert_eq!(run(vec![ins(Opcode::Return, [])]).exit_code(), 55);
}

#[test]
fn test_popframe_local_becomes_temporary() {
    let result = run(vec![
        ins(Opcode::CreateFrame, []),
        ins(Opcode::PushFrame, []),
        ins(Opcode::DefVar, [lf("x")]),
        ins(Opcode::Move, [lf("x"), string("kept")]),
        ins(Opcode::PopFrame, []),
        ins(Opcode::Write, [tf("x")]),
        ins(Opcode::Write, [lf("x")]),
    ]);
    assert_eq!(result.stdout, "kept");
    assert!(matches!(result.result, Err(FatalError::MissingFrame(Scope::Local))));
}

// ============================================================================
// Data stack
// ============================================================================

#[test]
fn test_pushs_pops_preserves_value_and_type() {
    for value in [Value::Int(-4), Value::str("a b"), Value::Bool(true), Value::Nil] {
        let result = run(vec![
            defvar("x"),
            ins(Opcode::PushS, [int(99)]),
            ins(Opcode::PushS, [Operand::Constant(value.clone())]),
            ins(Opcode::PopS, [gf("x")]),
        ]);
        assert_eq!(result.exit_code(), 0);
        assert_eq!(result.global("x"), Some(value));
    }
}

#[test]
fn test_pops_on_empty_stack() {
    let result = run(vec![defvar("x"), ins(Opcode::PopS, [gf("x")])]);
    assert!(matches!(result.result, Err(FatalError::EmptyDataStack)));
    assert_eq!(result.exit_code(), 56);
}

#[test]
fn test_clears() {
    let result = run(vec![
        defvar("x"),
        ins(Opcode::PushS, [int(1)]),
        ins(Opcode::ClearS, []),
        ins(Opcode::PopS, [gf("x")]),
    ]);
    assert_eq!(result.exit_code(), 56);
}

#[test]
fn test_stack_arithmetic_operand_order() {
    let result = run(vec![
        defvar("x"),
        ins(Opcode::PushS, [int(10)]),
        ins(Opcode::PushS, [int(3)]),
        ins(Opcode::SubS, []),
        ins(Opcode::PushS, [int(2)]),
        ins(Opcode::IDivS, []),
        ins(Opcode::PopS, [gf("x")]),
    ]);
    assert_eq!(result.global("x"), Some(Value::Int(3)));
}

#[test]
fn test_stack_string_and_logic() {
    let result = run(vec![
        defvar("code"),
        defvar("flag"),
        defvar("ch"),
        ins(Opcode::PushS, [string("žluť")]),
        ins(Opcode::PushS, [int(0)]),
        ins(Opcode::Stri2IntS, []),
        ins(Opcode::PopS, [gf("code")]),
        ins(Opcode::PushS, [boolean(true)]),
        ins(Opcode::PushS, [boolean(false)]),
        ins(Opcode::OrS, []),
        ins(Opcode::NotS, []),
        ins(Opcode::PopS, [gf("flag")]),
        ins(Opcode::PushS, [int(65)]),
        ins(Opcode::Int2CharS, []),
        ins(Opcode::PopS, [gf("ch")]),
    ]);
    assert_eq!(result.global("code"), Some(Value::Int(0x17E)));
    assert_eq!(result.global("flag"), Some(Value::Bool(false)));
    assert_eq!(result.global("ch"), Some(Value::str("A")));
}

// ============================================================================
// Arithmetic, relational, boolean
// ============================================================================

#[test]
fn test_idiv_by_zero_any_dividend() {
    for dividend in [0, 7, -7] {
        let result = run(vec![defvar("x"), ins(Opcode::IDiv, [gf("x"), int(dividend), int(0)])]);
        assert_eq!(result.exit_code(), 57);
    }
}

#[test]
fn test_add_rejects_string() {
    let result = run(vec![
        defvar("x"),
        defvar("y"),
        ins(Opcode::Move, [gf("y"), string("a")]),
        ins(Opcode::Add, [gf("x"), gf("y"), int(3)]),
    ]);
    assert_eq!(result.exit_code(), 53);
}

#[test]
fn test_eq_and_lt_with_nil() {
    let eq = run(vec![defvar("x"), ins(Opcode::Eq, [gf("x"), nil(), int(5)])]);
    assert_eq!(eq.exit_code(), 0);
    assert_eq!(eq.global("x"), Some(Value::Bool(false)));

    for other in [nil(), int(5), string("a")] {
        let lt = run(vec![defvar("x"), ins(Opcode::Lt, [gf("x"), nil(), other])]);
        assert_eq!(lt.exit_code(), 53);
    }
}

#[test]
fn test_relational_results() {
    let result = run(vec![
        defvar("lt"),
        defvar("gt"),
        defvar("and"),
        ins(Opcode::Lt, [gf("lt"), string("abc"), string("abd")]),
        ins(Opcode::Gt, [gf("gt"), boolean(true), boolean(false)]),
        ins(Opcode::And, [gf("and"), gf("lt"), gf("gt")]),
    ]);
    assert_eq!(result.global("and"), Some(Value::Bool(true)));
}

// ============================================================================
// Strings and types
// ============================================================================

#[test]
fn test_string_instructions() {
    let result = run(vec![
        defvar("s"),
        defvar("len"),
        defvar("ch"),
        ins(Opcode::Concat, [gf("s"), string("kolo"), string("běžka")]),
        ins(Opcode::StrLen, [gf("len"), gf("s")]),
        ins(Opcode::GetChar, [gf("ch"), gf("s"), int(5)]),
        ins(Opcode::SetChar, [gf("s"), int(0), string("pes")]),
    ]);
    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.global("len"), Some(Value::Int(9)));
    assert_eq!(result.global("ch"), Some(Value::str("ě")));
    assert_eq!(result.global("s"), Some(Value::str("poloběžka")));
}

#[test]
fn test_setchar_requires_string_in_destination() {
    let unset = run(vec![defvar("s"), ins(Opcode::SetChar, [gf("s"), int(0), string("x")])]);
    assert_eq!(unset.exit_code(), 56);

    let not_string = run(vec![
        defvar("s"),
        ins(Opcode::Move, [gf("s"), int(1)]),
        ins(Opcode::SetChar, [gf("s"), int(0), string("x")]),
    ]);
    assert_eq!(not_string.exit_code(), 53);

    let empty = run(vec![
        defvar("s"),
        ins(Opcode::Move, [gf("s"), string("abc")]),
        ins(Opcode::SetChar, [gf("s"), int(0), string("")]),
    ]);
    assert_eq!(empty.exit_code(), 58);
}

#[test]
fn test_getchar_out_of_range() {
    let result = run(vec![defvar("c"), ins(Opcode::GetChar, [gf("c"), string("ab"), int(2)])]);
    assert_eq!(result.exit_code(), 58);
}

#[test]
fn test_type_names() {
    let result = run(vec![
        defvar("t_int"),
        defvar("t_nil"),
        defvar("t_var"),
        ins(Opcode::Type, [gf("t_int"), int(3)]),
        ins(Opcode::Type, [gf("t_nil"), nil()]),
        ins(Opcode::Type, [gf("t_var"), gf("t_int")]),
    ]);
    assert_eq!(result.global("t_int"), Some(Value::str("int")));
    assert_eq!(result.global("t_nil"), Some(Value::str("nil")));
    assert_eq!(result.global("t_var"), Some(Value::str("string")));
}

/// `TYPE` of a declared but unset variable yields the empty string instead
/// of failing with 56 like every other read.
#[test]
fn test_type_of_unset_variable_is_empty_string() {
    let result = run(vec![
        defvar("t"),
        defvar("unset"),
        ins(Opcode::Type, [gf("t"), gf("unset")]),
    ]);
    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.global("t"), Some(Value::str("")));
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_duplicate_label_rejected_before_execution() {
    let result = run(vec![
        ins(Opcode::Write, [string("never")]),
        ins(Opcode::Label, [label("a")]),
        ins(Opcode::Label, [label("a")]),
    ]);
    assert!(matches!(result.result, Err(FatalError::DuplicateLabel(_))));
    assert_eq!(result.stdout, "");
}

#[test]
fn test_call_and_return() {
    let result = run(vec![
        ins(Opcode::Call, [label("sub")]),
        ins(Opcode::Write, [string("back")]),
        ins(Opcode::Exit, [int(0)]),
        ins(Opcode::Label, [label("sub")]),
        ins(Opcode::Write, [string("in\u{20}")]),
        ins(Opcode::Return, []),
    ]);
    assert_eq!(result.stdout, "in back");
    assert_eq!(result.exit_code(), 0);
}

#[test]
fn test_undefined_label() {
    let result = run(vec![ins(Opcode::Jump, [label("nowhere")])]);
    assert!(matches!(result.result, Err(FatalError::UndefinedLabel(_))));
    assert_eq!(result.exit_code(), 52);
}

#[test]
fn test_conditional_jump_checks_label_even_when_not_taken() {
    let result = run(vec![ins(Opcode::JumpIfEq, [label("nowhere"), int(1), int(2)])]);
    assert_eq!(result.exit_code(), 52);
}

#[test]
fn test_nil_mismatch_asymmetry() {
    let program = |opcode| {
        vec![
            ins(opcode, [label("taken"), nil(), int(5)]),
            ins(Opcode::Write, [string("fell through")]),
            ins(Opcode::Exit, [int(0)]),
            ins(Opcode::Label, [label("taken")]),
            ins(Opcode::Write, [string("jumped")]),
        ]
    };
    assert_eq!(run(program(Opcode::JumpIfEq)).stdout, "fell through");
    assert_eq!(run(program(Opcode::JumpIfNeq)).stdout, "jumped");
}

#[test]
fn test_jumpifneqs_nil_mismatch_jumps() {
    for (first, second) in [(nil(), int(5)), (string("x"), nil())] {
        let result = run(vec![
            ins(Opcode::PushS, [first]),
            ins(Opcode::PushS, [second]),
            ins(Opcode::JumpIfNeqS, [label("taken")]),
            ins(Opcode::Write, [string("fell through")]),
            ins(Opcode::Exit, [int(0)]),
            ins(Opcode::Label, [label("taken")]),
            ins(Opcode::Write, [string("jumped")]),
        ]);
        assert_eq!(result.stdout, "jumped");
    }
}

#[test]
fn test_jump_type_mismatch() {
    let result = run(vec![
        ins(Opcode::Label, [label("l")]),
        ins(Opcode::JumpIfEq, [label("l"), int(1), boolean(true)]),
    ]);
    assert_eq!(result.exit_code(), 53);
}

#[test]
fn test_loop_counts_down() {
    let result = run(vec![
        defvar("i"),
        ins(Opcode::Move, [gf("i"), int(3)]),
        ins(Opcode::Label, [label("loop")]),
        ins(Opcode::Write, [gf("i")]),
        ins(Opcode::Sub, [gf("i"), gf("i"), int(1)]),
        ins(Opcode::JumpIfNeq, [label("loop"), gf("i"), int(0)]),
    ]);
    assert_eq!(result.stdout, "321");
}

#[test]
fn test_exit_codes() {
    assert_eq!(run(vec![ins(Opcode::Exit, [int(0)])]).exit_code(), 0);
    assert_eq!(run(vec![ins(Opcode::Exit, [int(49)])]).exit_code(), 49);
    assert_eq!(run(vec![ins(Opcode::Exit, [int(50)])]).exit_code(), 57);
    assert_eq!(run(vec![ins(Opcode::Exit, [string("1")])]).exit_code(), 53);
}

#[test]
fn test_exit_stops_execution() {
    let result = run(vec![
        ins(Opcode::Write, [string("a")]),
        ins(Opcode::Exit, [int(3)]),
        ins(Opcode::Write, [string("b")]),
    ]);
    assert_eq!(result.stdout, "a");
    assert_eq!(result.result.unwrap(), Outcome { exit_code: 3, executed: 2 });
}

#[test]
fn test_output_before_failure_is_kept() {
    let result = run(vec![
        ins(Opcode::Write, [string("partial")]),
        ins(Opcode::PopFrame, []),
    ]);
    assert_eq!(result.stdout, "partial");
    assert_eq!(result.exit_code(), 55);
}

#[test]
fn test_arity_rechecked_at_dispatch() {
    let result = run(vec![ins(Opcode::Write, [])]);
    assert!(matches!(
        result.result,
        Err(FatalError::Arity {
            opcode: Opcode::Write,
            expected: 1,
            found: 0
        })
    ));
    assert_eq!(result.exit_code(), 32);
}

// ============================================================================
// Input and diagnostics
// ============================================================================

#[test]
fn test_read_types() {
    let read = |name: &str, ty| ins(Opcode::Read, [gf(name), Operand::TypeRef(ty)]);
    let result = run_with(
        vec![
            defvar("a"),
            defvar("b"),
            defvar("c"),
            defvar("d"),
            defvar("e"),
            read("a", ValueType::Int),
            read("b", ValueType::Int),
            read("c", ValueType::Bool),
            read("d", ValueType::String),
            read("e", ValueType::String),
        ],
        "42\nnope\nTrue\nhello world\n",
        ExecutionOptions::default(),
    );
    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.global("a"), Some(Value::Int(42)));
    assert_eq!(result.global("b"), Some(Value::Nil));
    assert_eq!(result.global("c"), Some(Value::Bool(true)));
    assert_eq!(result.global("d"), Some(Value::str("hello world")));
    assert_eq!(result.global("e"), Some(Value::Nil));
}

#[test]
fn test_read_requires_type_operand() {
    let result = run(vec![defvar("a"), ins(Opcode::Read, [gf("a"), int(1)])]);
    assert!(matches!(
        result.result,
        Err(FatalError::WrongOperandKind { position: 2, .. })
    ));
}

#[test]
fn test_dprint_goes_to_diagnostics() {
    let result = run(vec![
        ins(Opcode::DPrint, [string("debug")]),
        ins(Opcode::Write, [int(1)]),
    ]);
    assert_eq!(result.stdout, "1");
    assert_eq!(result.stderr, "debug");
}

#[test]
fn test_break_dumps_state() {
    let result = run(vec![
        defvar("x"),
        ins(Opcode::PushS, [int(5)]),
        ins(Opcode::Break, []),
    ]);
    assert_eq!(result.stdout, "");
    assert!(result.stderr.starts_with("-- at instruction 3, 2 executed --\n"));
    assert!(result.stderr.contains("GF: x=<unset>\n"));
    assert!(result.stderr.contains("data stack (1): int@5\n"));
}

#[test]
fn test_dump_state_after_every_instruction() {
    let result = run_with(
        vec![defvar("x"), ins(Opcode::Move, [gf("x"), int(1)])],
        "",
        ExecutionOptions { dump_state: true },
    );
    assert_eq!(result.stderr.matches("-- at instruction").count(), 2);
    assert!(result.stderr.contains("GF: x=int@1\n"));
}

#[test]
fn test_interpreter_accessors() {
    let program = Program::new(vec![
        defvar("x"),
        ins(Opcode::PushS, [int(1)]),
        ins(Opcode::CreateFrame, []),
        ins(Opcode::PushFrame, []),
    ]);
    let mut interpreter = Interpreter::new(
        &program,
        ExecutionOptions::default(),
        "".as_bytes(),
        Vec::new(),
        Vec::new(),
    )
    .unwrap();
    interpreter.run().unwrap();
    assert_eq!(interpreter.executed(), 4);
    assert_eq!(interpreter.data_stack().len(), 1);
    assert_eq!(interpreter.call_depth(), 0);
    assert_eq!(interpreter.store().depth(), 1);
    assert!(interpreter.store().is_defined(&VarRef::new(Scope::Global, "x")).unwrap());
    let (_, stdout, _) = interpreter.into_io();
    assert!(stdout.is_empty());
}
