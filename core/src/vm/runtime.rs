use std::io::Write;

use tracing::{debug, trace};

use crate::api::ExecutionOptions;
use crate::frames::FrameStore;
use crate::program::{Instruction, Program};
use crate::values::Value;
use crate::vm::dump::{self, Snapshot};
use crate::vm::{ControlSignal, FatalError, InputSource, LabelTable, Stack};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// 0 when execution ran off the end, otherwise the `EXIT` operand.
    pub exit_code: i32,
    /// Number of instructions executed.
    pub executed: u64,
}

/// The interpreter: owns all mutable execution state for one run of a
/// [`Program`].
///
/// `R` supplies `READ` lines, `W` receives `WRITE` output and `E` is the
/// diagnostic stream for `DPRINT`, `BREAK` and the state dump.
pub struct Interpreter<'p, R, W, E> {
    pub(super) program: &'p Program,
    pub(super) labels: LabelTable,
    pub(super) store: FrameStore,
    pub(super) data: Stack<Value>,
    pub(super) calls: Stack<usize>,
    pub(super) counter: usize,
    pub(super) executed: u64,
    pub(super) options: ExecutionOptions,
    pub(super) input: R,
    pub(super) output: W,
    pub(super) diagnostics: E,
}

impl<'p, R, W, E> Interpreter<'p, R, W, E>
where
    R: InputSource,
    W: Write,
    E: Write,
{
    /// Prepare a run. Fails if the program defines a label twice.
    pub fn new(
        program: &'p Program,
        options: ExecutionOptions,
        input: R,
        output: W,
        diagnostics: E,
    ) -> Result<Self, FatalError> {
        let labels = LabelTable::build(program)?;
        Ok(Self {
            program,
            labels,
            store: FrameStore::new(),
            data: Stack::new(),
            calls: Stack::new(),
            counter: 0,
            executed: 0,
            options,
            input,
            output,
            diagnostics,
        })
    }

    /// Execute until the program ends, `EXIT` runs, or an error occurs.
    ///
    /// Output written before a failure is kept and flushed either way.
    pub fn run(&mut self) -> Result<Outcome, FatalError> {
        debug!(
            instructions = self.program.len(),
            labels = self.labels.len(),
            "starting run"
        );
        let result = self.execute();
        let flushed = self.flush();
        let exit_code = result?;
        flushed?;
        debug!(exit_code, executed = self.executed, "run finished");
        Ok(Outcome {
            exit_code,
            executed: self.executed,
        })
    }

    fn execute(&mut self) -> Result<i32, FatalError> {
        let program = self.program;
        while let Some(ins) = program.get(self.counter) {
            trace!(order = ins.order, opcode = %ins.opcode, "executing");
            check_arity(ins)?;
            let signal = self.step(ins)?;
            self.executed += 1;
            if self.options.dump_state {
                self.dump_state()?;
            }
            match signal {
                ControlSignal::Continue => self.counter += 1,
                ControlSignal::Jump(target) => self.counter = target,
                ControlSignal::Call(target) => {
                    self.calls.push(self.counter);
                    self.counter = target;
                }
                ControlSignal::Return => {
                    let saved = self.calls.pop().ok_or(FatalError::EmptyCallStack)?;
                    self.counter = saved + 1;
                }
                ControlSignal::Halt(code) => return Ok(code),
            }
        }
        Ok(0)
    }

    fn flush(&mut self) -> Result<(), FatalError> {
        let output = self.output.flush();
        let diagnostics = self.diagnostics.flush();
        output.and(diagnostics).map_err(FatalError::Output)
    }

    pub(super) fn dump_state(&mut self) -> Result<(), FatalError> {
        let snapshot = Snapshot {
            counter: self.counter,
            executed: self.executed,
            store: &self.store,
            data: &self.data,
            calls: &self.calls,
        };
        dump::write_state(&mut self.diagnostics, &snapshot).map_err(FatalError::Output)
    }

    /// The instruction at the program counter. After a failed run this is
    /// the instruction that failed.
    pub fn current(&self) -> Option<&'p Instruction> {
        self.program.get(self.counter)
    }

    pub fn executed(&self) -> u64 {
        self.executed
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn data_stack(&self) -> &Stack<Value> {
        &self.data
    }

    pub fn call_depth(&self) -> usize {
        self.calls.len()
    }

    /// Give back the I/O handles.
    pub fn into_io(self) -> (R, W, E) {
        (self.input, self.output, self.diagnostics)
    }
}

fn check_arity(ins: &Instruction) -> Result<(), FatalError> {
    let expected = ins.opcode.arity();
    if ins.operands.len() == expected {
        Ok(())
    } else {
        Err(FatalError::Arity {
            opcode: ins.opcode,
            expected,
            found: ins.operands.len(),
        })
    }
}

#[cfg(test)]
#[path = "runtime_test.rs"]
mod runtime_test;
